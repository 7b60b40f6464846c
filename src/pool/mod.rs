//! Self-sizing pool of reusable byte buffers.
//!
//! A single coordinator task owns the free list; handles reach it over a
//! command channel, so no lock guards the pool state. The pool grows on
//! demand and shrinks again through an idle-eviction sweep that runs only
//! when the pool has seen no traffic for a full timeout.

mod buffer;
mod config;
mod manager;
mod stats;

pub use buffer::{Buffer, DEFAULT_BUFFER_CAPACITY};
pub use config::PoolConfig;
pub use manager::{BufferPool, Lease, PoolManager};
pub use stats::{PoolMetrics, PoolStats, SweepReport};
