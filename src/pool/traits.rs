//! Worker pool abstraction consumed by the scheduler

use crate::pool::control::ThreadControl;
use crate::pool::error::PoolResult;
use std::time::Duration;

/// Unit of work handed to a pool
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// A bounded set of worker threads
pub trait ThreadPool: Send + Sync {
    fn name(&self) -> &str;

    /// Run `job` on a worker, returning a handle to observe completion.
    ///
    /// Fails with [`PoolError::Exhausted`](crate::pool::api::PoolError::Exhausted)
    /// when no worker frees up in time; the job is dropped unrun.
    fn execute(&self, job: Job) -> PoolResult<ThreadControl>;

    /// Upper bound on concurrently running jobs
    fn max_threads(&self) -> usize;

    /// Jobs submitted and not yet finished
    fn active_threads(&self) -> usize;

    /// Refuse further jobs and wait up to `timeout` for running ones
    fn dispose(&self, timeout: Duration);
}
