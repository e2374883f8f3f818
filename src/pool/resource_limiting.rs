//! Thread pool that caps concurrently running workers
//!
//! Jobs are queued to long-lived named worker threads. A worker is started
//! only when every existing worker is busy, so the pool never grows past
//! `max_threads`. When every slot is taken, `execute` waits up to the block
//! timeout for one to free up and then reports exhaustion.

use crate::core::config::SchedulerSettings;
use crate::core::error_handling::panic_message;
use crate::pool::control::ThreadControl;
use crate::pool::error::{PoolError, PoolResult};
use crate::pool::traits::{Job, ThreadPool};
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

struct PendingJob {
    job: Job,
    control: ThreadControl,
}

/// `active` counts queued plus running jobs and never exceeds `max_threads`
#[derive(Default)]
struct PoolState {
    active: usize,
    threads: usize,
    disposed: bool,
    pending: VecDeque<PendingJob>,
    jobs: Vec<ThreadControl>,
}

struct PoolInner {
    name: String,
    max_threads: usize,
    block_timeout: Duration,
    state: Mutex<PoolState>,
    slot_freed: Condvar,
    work_ready: Condvar,
}

impl PoolInner {
    fn release_slot(&self) {
        {
            let mut state = self.state.lock();
            state.active = state.active.saturating_sub(1);
        }
        self.slot_freed.notify_one();
    }

    /// Next queued job, or `None` once the pool is disposed and drained
    fn next_job(&self) -> Option<PendingJob> {
        let mut state = self.state.lock();
        loop {
            if let Some(pending) = state.pending.pop_front() {
                return Some(pending);
            }
            if state.disposed {
                return None;
            }
            self.work_ready.wait(&mut state);
        }
    }

    fn work(&self, thread_name: &str) {
        log::trace!("Worker '{}' started", thread_name);
        while let Some(PendingJob { job, control }) = self.next_job() {
            let failure = match catch_unwind(AssertUnwindSafe(job)) {
                Ok(()) => None,
                Err(payload) => {
                    let message = panic_message(payload.as_ref()).to_string();
                    log::error!("Worker '{}' panicked: {}", thread_name, message);
                    Some(message)
                }
            };
            self.release_slot();
            control.finish(failure);
        }
        log::trace!("Worker '{}' stopped", thread_name);
    }

    fn shut_down(&self) -> Option<Vec<ThreadControl>> {
        let jobs = {
            let mut state = self.state.lock();
            if state.disposed {
                return None;
            }
            state.disposed = true;
            std::mem::take(&mut state.jobs)
        };
        self.slot_freed.notify_all();
        self.work_ready.notify_all();
        Some(jobs)
    }
}

impl std::fmt::Debug for PoolInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolInner")
            .field("name", &self.name)
            .field("max_threads", &self.max_threads)
            .field("block_timeout", &self.block_timeout)
            .finish_non_exhaustive()
    }
}

/// Resource-limited worker pool
///
/// # Example
///
/// ```rust
/// use seda::pool::api::{ResourceLimitingThreadPool, ThreadPool};
/// use std::time::Duration;
///
/// let pool = ResourceLimitingThreadPool::new("workers", 2, Duration::from_millis(50));
/// let control = pool.execute(Box::new(|| println!("working"))).unwrap();
///
/// assert!(control.join(Duration::from_secs(1)));
/// pool.dispose(Duration::from_secs(1));
/// ```
#[derive(Debug)]
pub struct ResourceLimitingThreadPool {
    inner: Arc<PoolInner>,
}

impl ResourceLimitingThreadPool {
    /// # Panics
    ///
    /// Panics if `max_threads` is zero.
    pub fn new(name: impl Into<String>, max_threads: usize, block_timeout: Duration) -> Self {
        assert!(max_threads > 0, "A thread pool needs at least one worker");
        let name = name.into();
        log::debug!(
            "Created pool '{}' with up to {} worker(s), block timeout {:?}",
            name,
            max_threads,
            block_timeout
        );
        Self {
            inner: Arc::new(PoolInner {
                name,
                max_threads,
                block_timeout,
                state: Mutex::new(PoolState::default()),
                slot_freed: Condvar::new(),
                work_ready: Condvar::new(),
            }),
        }
    }

    /// Sized by [`SchedulerSettings::worker_count`]: an explicit
    /// `pool_size`, else processors × `threads_per_processor`
    pub fn from_settings(name: impl Into<String>, settings: &SchedulerSettings) -> Self {
        Self::new(
            name,
            settings.worker_count(),
            Duration::from_millis(settings.block_timeout_ms),
        )
    }

    /// Worker threads started since construction
    pub fn spawned_threads(&self) -> usize {
        self.inner.state.lock().threads
    }

    fn acquire_slot(&self) -> PoolResult<MutexGuard<'_, PoolState>> {
        let deadline = Instant::now() + self.inner.block_timeout;
        let mut state = self.inner.state.lock();

        loop {
            if state.disposed {
                return Err(PoolError::Disposed {
                    pool: self.inner.name.clone(),
                });
            }
            if state.active < self.inner.max_threads {
                break;
            }
            if self
                .inner
                .slot_freed
                .wait_until(&mut state, deadline)
                .timed_out()
                && state.active >= self.inner.max_threads
            {
                return Err(PoolError::Exhausted {
                    pool: self.inner.name.clone(),
                    max_threads: self.inner.max_threads,
                });
            }
        }

        state.active += 1;
        Ok(state)
    }

    fn spawn_worker(&self, id: usize) -> std::io::Result<()> {
        let thread_name = format!("{}-worker-{}", self.inner.name, id);
        let inner = Arc::clone(&self.inner);
        thread::Builder::new()
            .name(thread_name.clone())
            .spawn(move || inner.work(&thread_name))
            .map(|_handle| ())
    }
}

impl ThreadPool for ResourceLimitingThreadPool {
    fn name(&self) -> &str {
        &self.inner.name
    }

    fn execute(&self, job: Job) -> PoolResult<ThreadControl> {
        let mut state = self.acquire_slot()?;

        let control = ThreadControl::new();
        state.jobs.retain(|running| !running.is_finished());
        state.jobs.push(control.clone());
        state.pending.push_back(PendingJob {
            job,
            control: control.clone(),
        });

        // Every worker is busy with an earlier job
        if state.active > state.threads {
            if let Err(e) = self.spawn_worker(state.threads) {
                state.pending.pop_back();
                state.jobs.pop();
                state.active -= 1;
                drop(state);
                self.inner.slot_freed.notify_one();
                control.finish(Some(e.to_string()));
                return Err(PoolError::Spawn {
                    message: e.to_string(),
                });
            }
            state.threads += 1;
        }
        drop(state);
        self.inner.work_ready.notify_one();

        Ok(control)
    }

    fn max_threads(&self) -> usize {
        self.inner.max_threads
    }

    fn active_threads(&self) -> usize {
        self.inner.state.lock().active
    }

    fn dispose(&self, timeout: Duration) {
        let Some(jobs) = self.inner.shut_down() else {
            return;
        };

        let deadline = Instant::now() + timeout;
        let mut stragglers = 0;
        for job in jobs {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if !job.join(remaining) {
                stragglers += 1;
            }
        }

        if stragglers > 0 {
            log::warn!(
                "Pool '{}' disposed with {} job(s) still running after {:?}",
                self.inner.name,
                stragglers,
                timeout
            );
        } else {
            log::debug!("Pool '{}' disposed", self.inner.name);
        }
    }
}

impl Drop for ResourceLimitingThreadPool {
    fn drop(&mut self) {
        // Idle workers exit once they see the pool shut down
        self.inner.shut_down();
    }
}
