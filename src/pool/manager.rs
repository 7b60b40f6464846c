//! Coordinator task and handles for the self-sizing buffer pool.
//!
//! One task owns the free list outright; callers talk to it over a bounded
//! command channel and get replies on oneshot channels. The coordinator
//! re-arms its eviction countdown on every serviced command, so the sweep
//! only fires after a full idle timeout with no pool activity at all.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, Instant};
use tracing::{debug, info};

use crate::error::Result;
use crate::pool::buffer::Buffer;
use crate::pool::config::PoolConfig;
use crate::pool::stats::{PoolMetrics, PoolStats, SweepReport};

/// Commands accepted by the coordinator.
#[derive(Debug)]
enum Command {
    /// Hand a buffer to the caller.
    Acquire(oneshot::Sender<Buffer>),
    /// Park a buffer on the free list.
    Release(Buffer),
    /// Stop the coordinator and drop all idle buffers.
    Shutdown(oneshot::Sender<()>),
}

/// A buffer parked on the free list, with its park time.
#[derive(Debug)]
struct IdleEntry {
    buf: Buffer,
    /// When the buffer was parked. Refreshed only on release.
    since: Instant,
    /// Whether the buffer came back from a caller rather than bootstrap.
    recycled: bool,
}

/// Coordinator that owns the free list.
///
/// Created together with its [`BufferPool`] handle by [`PoolManager::new`].
/// Call [`run`](Self::run) on its own task, or let [`BufferPool::spawn`]
/// do both steps at once.
pub struct PoolManager {
    config: PoolConfig,
    /// Command queue from handles (bounded for backpressure).
    rx: mpsc::Receiver<Command>,
    /// LIFO free list: releases push the front, acquires pop it.
    free: VecDeque<IdleEntry>,
    metrics: Arc<PoolMetrics>,
}

impl PoolManager {
    /// Create a coordinator and its cloneable handle.
    pub fn new(config: PoolConfig) -> Result<(Self, BufferPool)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.channel_capacity);
        let metrics = Arc::new(PoolMetrics::new());

        let handle = BufferPool {
            tx,
            config: Arc::new(config.clone()),
            metrics: Arc::clone(&metrics),
        };
        let manager = Self {
            config,
            rx,
            free: VecDeque::new(),
            metrics,
        };
        Ok((manager, handle))
    }

    /// Run the coordinator until shutdown, or until every handle is gone.
    pub async fn run(mut self) {
        info!(
            "Starting buffer pool coordinator (idle timeout {:?})",
            self.config.idle_timeout
        );

        loop {
            // An empty pool always keeps one buffer ready to hand out.
            if self.free.is_empty() {
                self.bootstrap();
            }
            self.metrics.set_idle(self.free.len());

            // The sleep is rebuilt every iteration, so any serviced command
            // pushes the next sweep a full idle timeout into the future.
            tokio::select! {
                cmd = self.rx.recv() => match cmd {
                    Some(Command::Acquire(reply)) => self.serve_acquire(reply),
                    Some(Command::Release(buf)) => self.serve_release(buf),
                    Some(Command::Shutdown(ack)) => {
                        self.finish(ack).await;
                        return;
                    }
                    None => {
                        debug!("All pool handles dropped, stopping coordinator");
                        return;
                    }
                },
                _ = time::sleep(self.config.idle_timeout) => self.sweep(),
            }
        }
    }

    /// Park one fresh buffer so the next acquire always finds one.
    fn bootstrap(&mut self) {
        self.free.push_front(IdleEntry {
            buf: Buffer::with_capacity(self.config.buffer_capacity),
            since: Instant::now(),
            recycled: false,
        });
    }

    /// Hand the most recently parked buffer to an acquirer.
    fn serve_acquire(&mut self, reply: oneshot::Sender<Buffer>) {
        let entry = match self.free.pop_front() {
            Some(entry) => entry,
            // bootstrap() ran this iteration, so the list is never empty here
            None => return,
        };
        let IdleEntry {
            buf,
            since,
            recycled,
        } = entry;

        match reply.send(buf) {
            Ok(()) => {
                if recycled {
                    self.metrics.inc(&self.metrics.hits);
                } else {
                    self.metrics.inc(&self.metrics.misses);
                }
            }
            Err(buf) => {
                // Acquirer gave up waiting; park the buffer again without
                // refreshing its idle clock.
                self.free.push_front(IdleEntry {
                    buf,
                    since,
                    recycled,
                });
            }
        }
    }

    /// Park a returned buffer at the front of the free list.
    fn serve_release(&mut self, mut buf: Buffer) {
        debug_assert!(
            self.free.iter().all(|e| e.buf.tag() != buf.tag()),
            "buffer {} is already on the free list",
            buf.tag()
        );

        if let Some(cap) = self.config.max_idle {
            if self.free.len() >= cap {
                self.metrics.inc(&self.metrics.drops);
                return;
            }
        }

        buf.clear();
        self.free.push_front(IdleEntry {
            buf,
            since: Instant::now(),
            recycled: true,
        });
        self.metrics.inc(&self.metrics.returns);
    }

    /// Walk the whole free list and evict buffers idle longer than the
    /// timeout. Park times are never refreshed by the sweep itself.
    fn sweep(&mut self) {
        let examined = self.free.len();
        let timeout = self.config.idle_timeout;
        self.free.retain(|entry| entry.since.elapsed() <= timeout);
        let evicted = examined - self.free.len();

        self.metrics.record_sweep(SweepReport { examined, evicted });
        if evicted > 0 {
            debug!("Idle sweep evicted {} of {} buffers", evicted, examined);
        }
    }

    /// Drop idle buffers, refuse queued work, and acknowledge the shutdown.
    async fn finish(&mut self, ack: oneshot::Sender<()>) {
        let dropped = self.free.len();
        self.free.clear();
        self.metrics.set_idle(0);

        // close() refuses new sends, but a sender mid-release can still
        // hold a channel permit, and recv() keeps delivering until every
        // outstanding permit is resolved. Drained commands lose their
        // buffers; pending acquirers see their reply channel close and
        // fall back to direct allocation.
        self.rx.close();
        while let Some(cmd) = self.rx.recv().await {
            match cmd {
                Command::Acquire(reply) => drop(reply),
                Command::Release(_) => self.metrics.inc(&self.metrics.drops),
                Command::Shutdown(extra) => {
                    let _ = extra.send(());
                }
            }
        }

        info!(
            "Buffer pool coordinator stopped ({} idle buffers dropped)",
            dropped
        );
        let _ = ack.send(());
    }
}

/// Cloneable handle to a running pool coordinator.
///
/// All methods are safe to call from any task. Acquire and release never
/// fail: once the coordinator is gone, acquire falls back to direct
/// allocation and release lets the buffer drop.
#[derive(Clone)]
pub struct BufferPool {
    tx: mpsc::Sender<Command>,
    config: Arc<PoolConfig>,
    metrics: Arc<PoolMetrics>,
}

impl BufferPool {
    /// Create a pool with the given config and spawn its coordinator.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(config: PoolConfig) -> Result<Self> {
        let (manager, handle) = PoolManager::new(config)?;
        tokio::spawn(manager.run());
        Ok(handle)
    }

    /// Spawn a pool that differs from the defaults only in its idle timeout.
    pub fn with_timeout(idle_timeout: Duration) -> Result<Self> {
        Self::spawn(PoolConfig::new(idle_timeout))
    }

    /// Take a buffer from the pool, creating one if none is idle.
    ///
    /// Waits only for the coordinator to service the command queue, never
    /// for another caller to release.
    pub async fn acquire(&self) -> Buffer {
        let (reply_tx, reply_rx) = oneshot::channel();
        if self.tx.send(Command::Acquire(reply_tx)).await.is_ok() {
            if let Ok(buf) = reply_rx.await {
                return buf;
            }
        }
        // Coordinator is gone; allocate directly so acquire cannot fail.
        self.metrics.inc(&self.metrics.misses);
        Buffer::with_capacity(self.config.buffer_capacity)
    }

    /// Return a buffer to the pool.
    ///
    /// Its contents are cleared before it is parked.
    pub async fn release(&self, buf: Buffer) {
        if self.tx.send(Command::Release(buf)).await.is_err() {
            // Coordinator is gone; the buffer just drops.
            self.metrics.inc(&self.metrics.drops);
        }
    }

    /// Return a buffer without waiting for queue space.
    ///
    /// Used by [`Lease`] on drop. Returns false when the buffer had to be
    /// discarded because the queue was full or the pool was shut down.
    pub fn try_release(&self, buf: Buffer) -> bool {
        match self.tx.try_send(Command::Release(buf)) {
            Ok(()) => true,
            Err(_) => {
                self.metrics.inc(&self.metrics.drops);
                false
            }
        }
    }

    /// Acquire a buffer wrapped in a guard that releases it on drop.
    pub async fn lease(&self) -> Lease {
        Lease {
            buf: Some(self.acquire().await),
            pool: self.clone(),
        }
    }

    /// Stop the coordinator and drop all idle buffers.
    ///
    /// Waits for the coordinator to acknowledge. Safe to call more than
    /// once; later calls return immediately.
    pub async fn shutdown(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(Command::Shutdown(ack_tx)).await.is_ok() {
            let _ = ack_rx.await;
        }
    }

    /// Whether the coordinator is still accepting commands.
    pub fn is_running(&self) -> bool {
        !self.tx.is_closed()
    }

    /// Point-in-time snapshot of the pool's counters.
    pub fn stats(&self) -> PoolStats {
        self.metrics.snapshot()
    }

    /// Outcome of the most recent eviction sweep, if any has run.
    pub fn last_sweep(&self) -> Option<SweepReport> {
        self.metrics.last_sweep()
    }

    /// Buffers currently parked on the free list.
    pub fn idle(&self) -> usize {
        self.metrics.idle()
    }

    /// The pool's configuration.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }
}

/// RAII guard that releases its buffer back to the pool on drop.
pub struct Lease {
    buf: Option<Buffer>,
    pool: BufferPool,
}

impl Lease {
    /// Keep the buffer and skip the release.
    pub fn detach(mut self) -> Buffer {
        self.buf.take().unwrap()
    }
}

impl std::ops::Deref for Lease {
    type Target = Buffer;

    fn deref(&self) -> &Buffer {
        self.buf.as_ref().unwrap()
    }
}

impl std::ops::DerefMut for Lease {
    fn deref_mut(&mut self) -> &mut Buffer {
        self.buf.as_mut().unwrap()
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        if let Some(buf) = self.buf.take() {
            self.pool.try_release(buf);
        }
    }
}
