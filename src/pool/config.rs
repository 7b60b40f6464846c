use std::time::Duration;

use crate::error::{Error, Result};
use crate::pool::buffer::DEFAULT_BUFFER_CAPACITY;

/// Configuration for a buffer pool.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// How long a buffer may sit idle before the sweep evicts it
    /// (default: 30s)
    pub idle_timeout: Duration,

    /// Capacity of buffers the pool creates (default: 8KB)
    pub buffer_capacity: usize,

    /// Depth of the command queue feeding the coordinator
    /// (default: 1024)
    pub channel_capacity: usize,

    /// Upper bound on retained idle buffers; `None` means the free list
    /// grows without limit (default: None)
    pub max_idle: Option<usize>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(30),
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            channel_capacity: 1024,
            max_idle: None,
        }
    }
}

impl PoolConfig {
    /// Create a config with the given idle timeout and defaults elsewhere.
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            idle_timeout,
            ..Default::default()
        }
    }

    /// Check the config for values the pool cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.idle_timeout.is_zero() {
            return Err(Error::InvalidPoolConfig(
                "idle_timeout must be positive".to_string(),
            ));
        }
        if self.channel_capacity == 0 {
            return Err(Error::InvalidPoolConfig(
                "channel_capacity must be at least 1".to_string(),
            ));
        }
        if self.max_idle == Some(0) {
            return Err(Error::InvalidPoolConfig(
                "max_idle must be at least 1 when set".to_string(),
            ));
        }
        Ok(())
    }
}
