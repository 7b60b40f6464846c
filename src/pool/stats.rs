//! Operational counters for the buffer pool.
//!
//! Counters are lock-free and updated by the coordinator task; snapshots
//! are cheap enough to take from any task at any time.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Relaxed ordering for counters (eventual visibility is fine for stats).
const RELAXED: Ordering = Ordering::Relaxed;

/// Counters shared between the coordinator and pool handles.
pub struct PoolMetrics {
    /// Acquires served from the free list.
    pub hits: AtomicU64,
    /// Acquires that had to create a fresh buffer.
    pub misses: AtomicU64,
    /// Buffers returned to the free list.
    pub returns: AtomicU64,
    /// Buffers discarded on release (cap reached or pool shut down).
    pub drops: AtomicU64,
    /// Buffers evicted by the idle sweep.
    pub evicted: AtomicU64,
    /// Sweep passes performed.
    pub sweeps: AtomicU64,

    /// Current free-list length, updated after every serviced command.
    idle: AtomicUsize,

    /// Outcome of the most recent sweep.
    /// RwLock since it changes once per sweep but is read for reporting.
    last_sweep: RwLock<Option<SweepReport>>,
}

/// What a single sweep pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    /// Idle entries examined.
    pub examined: usize,
    /// Entries evicted for exceeding the idle timeout.
    pub evicted: usize,
}

impl PoolMetrics {
    /// Create a metrics instance with all counters at zero.
    pub const fn new() -> Self {
        Self {
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            returns: AtomicU64::new(0),
            drops: AtomicU64::new(0),
            evicted: AtomicU64::new(0),
            sweeps: AtomicU64::new(0),
            idle: AtomicUsize::new(0),
            last_sweep: RwLock::new(None),
        }
    }

    /// Increment a counter.
    #[inline]
    pub fn inc(&self, counter: &AtomicU64) {
        counter.fetch_add(1, RELAXED);
    }

    /// Add to a counter.
    #[inline]
    pub fn add(&self, counter: &AtomicU64, value: u64) {
        counter.fetch_add(value, RELAXED);
    }

    /// Record the free-list length after a serviced command.
    #[inline]
    pub fn set_idle(&self, len: usize) {
        self.idle.store(len, RELAXED);
    }

    /// Current free-list length.
    #[inline]
    pub fn idle(&self) -> usize {
        self.idle.load(RELAXED)
    }

    /// Record the outcome of a sweep pass.
    pub fn record_sweep(&self, report: SweepReport) {
        self.inc(&self.sweeps);
        self.add(&self.evicted, report.evicted as u64);
        let mut guard = self.last_sweep.write();
        *guard = Some(report);
    }

    /// Outcome of the most recent sweep, if any has run.
    pub fn last_sweep(&self) -> Option<SweepReport> {
        *self.last_sweep.read()
    }

    /// Take a point-in-time snapshot of all counters.
    pub fn snapshot(&self) -> PoolStats {
        PoolStats {
            idle: self.idle.load(RELAXED),
            hits: self.hits.load(RELAXED),
            misses: self.misses.load(RELAXED),
            returns: self.returns.load(RELAXED),
            drops: self.drops.load(RELAXED),
            evicted: self.evicted.load(RELAXED),
            sweeps: self.sweeps.load(RELAXED),
        }
    }
}

impl Default for PoolMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time snapshot of pool counters.
#[derive(Debug, Clone, Copy, Default)]
pub struct PoolStats {
    /// Buffers currently sitting on the free list.
    pub idle: usize,
    /// Acquires served from the free list.
    pub hits: u64,
    /// Acquires that created a fresh buffer.
    pub misses: u64,
    /// Buffers returned to the free list.
    pub returns: u64,
    /// Buffers discarded on release.
    pub drops: u64,
    /// Buffers evicted by the idle sweep.
    pub evicted: u64,
    /// Sweep passes performed.
    pub sweeps: u64,
}

impl PoolStats {
    /// Fraction of acquires served by reuse (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
