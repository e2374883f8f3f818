//! Public API for the worker pool

pub use crate::pool::control::ThreadControl;
pub use crate::pool::error::{PoolError, PoolResult};
pub use crate::pool::resource_limiting::ResourceLimitingThreadPool;
pub use crate::pool::traits::{Job, ThreadPool};
