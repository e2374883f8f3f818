//! Worker pool error types

/// Failures reported by [`ThreadPool::execute`](crate::pool::api::ThreadPool::execute)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// Every worker stayed busy for the whole block timeout. Recoverable:
    /// the caller skips this submission and retries later.
    #[error("No worker available in pool '{pool}' (all {max_threads} thread(s) busy)")]
    Exhausted { pool: String, max_threads: usize },

    #[error("Pool '{pool}' has been disposed")]
    Disposed { pool: String },

    #[error("Failed to spawn worker thread: {message}")]
    Spawn { message: String },
}

impl PoolError {
    pub fn is_exhausted(&self) -> bool {
        matches!(self, PoolError::Exhausted { .. })
    }
}

pub type PoolResult<T> = Result<T, PoolError>;
