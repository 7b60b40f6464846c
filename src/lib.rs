pub mod config;
pub mod error;
pub mod obfint;
pub mod pool;

pub use config::{AppConfig, Loaded};
pub use error::{Error, Result};
pub use obfint::{Coder, ObfInt};
pub use pool::{Buffer, BufferPool, Lease, PoolConfig, PoolManager, PoolStats};
