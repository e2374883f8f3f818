//! ThreadManager: binds pipelines to a worker pool
//!
//! A dedicated scheduler thread runs a sleep-based poll loop. Each cycle it
//! submits one [`PipelineRunner`] per registered pipeline to the pool,
//! sleeps for the configured interval, then reaps finished workers. A
//! pipeline whose previous run is still executing is skipped for that
//! cycle, as is one the pool has no worker for.

use crate::core::config::SchedulerSettings;
use crate::pipeline::api::{EventPipeline, PipelineRunner};
use crate::pipeline::runner::PipelineTask;
use crate::pool::api::{Job, ResourceLimitingThreadPool, ThreadControl, ThreadPool};
use crate::scheduler::config::ThreadManagerConfig;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Identity of a registered pipeline: the address of its `Arc`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineId(usize);

impl PipelineId {
    pub fn of<P>(pipeline: &Arc<P>) -> Self {
        Self(Arc::as_ptr(pipeline) as *const () as usize)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Uninitialized,
    Initialized,
    Disposed,
}

struct Registration {
    id: PipelineId,
    runner: Arc<dyn PipelineTask>,
    busy: Arc<AtomicBool>,
    current: Mutex<Option<ThreadControl>>,
}

/// Clears a pipeline's in-flight flag when its job ends, even by panic
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// State shared with the scheduler thread
struct Shared {
    config: ThreadManagerConfig,
    pool: RwLock<Option<Arc<dyn ThreadPool>>>,
    pipelines: Mutex<Vec<Arc<Registration>>>,
    in_flight: Mutex<Vec<ThreadControl>>,
}

impl Shared {
    fn schedule_cycle(&self) {
        let Some(pool) = self.pool.read().clone() else {
            return;
        };

        let pipelines = self.pipelines.lock();
        for registration in pipelines.iter() {
            if registration.busy.swap(true, Ordering::AcqRel) {
                log::trace!(
                    "Pipeline '{}' still running, skipping this cycle",
                    registration.runner.name()
                );
                continue;
            }

            let guard = BusyGuard(Arc::clone(&registration.busy));
            let runner = Arc::clone(&registration.runner);
            let job: Job = Box::new(move || {
                let _guard = guard;
                runner.run();
            });

            match pool.execute(job) {
                Ok(control) => {
                    *registration.current.lock() = Some(control.clone());
                    self.in_flight.lock().push(control);
                }
                Err(e) if e.is_exhausted() => log::warn!(
                    "Pipeline '{}' not scheduled, retrying next cycle: {}",
                    registration.runner.name(),
                    e
                ),
                Err(e) => log::error!(
                    "Pipeline '{}' could not be scheduled: {}",
                    registration.runner.name(),
                    e
                ),
            }
        }
    }

    fn reap_finished(&self) {
        self.in_flight.lock().retain(|control| !control.is_finished());
    }

    /// Wait for the pipeline's last run, then drain it once on this thread
    fn retire(&self, registration: &Registration) {
        let name = registration.runner.name();
        let current = registration.current.lock().clone();
        if let Some(control) = current {
            if !control.join(self.config.join_timeout) {
                log::warn!(
                    "Pipeline '{}' still running after {:?}, skipping final drain",
                    name,
                    self.config.join_timeout
                );
                return;
            }
        }

        let drained = registration.runner.run();
        log::debug!("Pipeline '{}' deregistered, drained {} event(s)", name, drained);
    }
}

fn run_scheduler(shared: Arc<Shared>, stop: Arc<AtomicBool>, done: ThreadControl) {
    log::debug!(
        "Scheduler started, polling every {:?}",
        shared.config.sleep_time
    );
    while !stop.load(Ordering::Acquire) {
        shared.schedule_cycle();
        thread::park_timeout(shared.config.sleep_time);
        shared.reap_finished();
    }
    log::debug!("Scheduler idle");
    done.finish(None);
}

struct SchedulerThread {
    stop: Arc<AtomicBool>,
    done: ThreadControl,
    handle: thread::JoinHandle<()>,
}

impl SchedulerThread {
    fn spawn(shared: &Arc<Shared>) -> Option<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let done = ThreadControl::new();
        let spawned = {
            let shared = Arc::clone(shared);
            let stop = Arc::clone(&stop);
            let done = done.clone();
            thread::Builder::new()
                .name("seda-scheduler".to_string())
                .spawn(move || run_scheduler(shared, stop, done))
        };

        match spawned {
            Ok(handle) => Some(Self { stop, done, handle }),
            Err(e) => {
                log::error!("Failed to start scheduler thread: {}", e);
                None
            }
        }
    }

    /// Signal the loop to finish and wait up to `timeout` for it
    fn stop(self, timeout: Duration) {
        self.stop.store(true, Ordering::Release);
        self.handle.thread().unpark();
        if self.done.join(timeout) {
            let _ = self.handle.join();
        } else {
            log::warn!("Scheduler thread did not stop within {:?}", timeout);
        }
    }
}

struct ManagerState {
    lifecycle: Lifecycle,
    scheduler: Option<SchedulerThread>,
    owns_pool: bool,
}

/// Scheduler that repeatedly drains registered pipelines on a worker pool
///
/// Lifecycle: created uninitialized, bound to a pool with
/// [`set_thread_pool`](Self::set_thread_pool), started with
/// [`initialize`](Self::initialize), torn down with
/// [`dispose`](Self::dispose). Misuse of the lifecycle panics.
///
/// # Example
///
/// ```rust
/// use seda::pipeline::api::{HandlerResult, SimplePipeline};
/// use seda::queue::api::{DefaultQueue, Sink, Source};
/// use seda::scheduler::api::{ThreadManager, ThreadManagerConfig};
/// use seda::pool::api::ResourceLimitingThreadPool;
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let manager = ThreadManager::new(
///     ThreadManagerConfig::default().with_sleep_time(Duration::from_millis(5)),
/// );
/// manager.set_thread_pool(Arc::new(ResourceLimitingThreadPool::new(
///     "workers",
///     2,
///     Duration::from_millis(50),
/// )));
/// manager.initialize();
///
/// let queue = Arc::new(DefaultQueue::<u32>::unbounded("numbers"));
/// let pipeline = Arc::new(SimplePipeline::new(
///     "sum",
///     vec![queue.clone() as Arc<dyn Source<u32>>],
///     Arc::new(|n: u32| -> HandlerResult {
///         println!("got {}", n);
///         Ok(())
///     }),
/// ));
///
/// manager.register(pipeline.clone());
/// queue.enqueue(7).unwrap();
/// manager.deregister(&pipeline);
/// manager.dispose();
/// ```
pub struct ThreadManager {
    shared: Arc<Shared>,
    state: Mutex<ManagerState>,
}

impl ThreadManager {
    pub fn new(config: ThreadManagerConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                pool: RwLock::new(None),
                pipelines: Mutex::new(Vec::new()),
                in_flight: Mutex::new(Vec::new()),
            }),
            state: Mutex::new(ManagerState {
                lifecycle: Lifecycle::Uninitialized,
                scheduler: None,
                owns_pool: false,
            }),
        }
    }

    /// Build, bind and initialize a manager with its own
    /// [`ResourceLimitingThreadPool`]; the pool is disposed with the manager.
    pub fn from_settings(settings: &SchedulerSettings) -> Self {
        let manager = Self::new(ThreadManagerConfig::from_settings(settings));
        manager.set_thread_pool(Arc::new(ResourceLimitingThreadPool::from_settings(
            "seda", settings,
        )));
        manager.state.lock().owns_pool = true;
        manager.initialize();
        manager
    }

    /// # Panics
    ///
    /// Panics if a pool has already been set.
    pub fn set_thread_pool(&self, pool: Arc<dyn ThreadPool>) {
        let mut slot = self.shared.pool.write();
        assert!(slot.is_none(), "ThreadManager already has a thread pool");
        log::debug!(
            "ThreadManager bound to pool '{}' ({} worker(s))",
            pool.name(),
            pool.max_threads()
        );
        *slot = Some(pool);
    }

    /// Start the scheduling loop
    ///
    /// # Panics
    ///
    /// Panics if no pool is set, or if already initialized or disposed.
    pub fn initialize(&self) {
        let mut state = self.state.lock();
        match state.lifecycle {
            Lifecycle::Initialized => panic!("ThreadManager is already initialized"),
            Lifecycle::Disposed => panic!("ThreadManager has been disposed"),
            Lifecycle::Uninitialized => {}
        }
        assert!(
            self.shared.pool.read().is_some(),
            "ThreadManager cannot be initialized without a thread pool"
        );

        state.scheduler = SchedulerThread::spawn(&self.shared);
        state.lifecycle = Lifecycle::Initialized;
        log::debug!("ThreadManager initialized");
    }

    /// Add a pipeline; registering the same `Arc` twice has no effect.
    ///
    /// # Panics
    ///
    /// Panics unless the manager is initialized.
    pub fn register<P>(&self, pipeline: Arc<P>)
    where
        P: EventPipeline + 'static,
    {
        let mut state = self.state.lock();
        Self::require_initialized(&state);

        let id = PipelineId::of(&pipeline);
        {
            let mut pipelines = self.shared.pipelines.lock();
            if pipelines.iter().any(|r| r.id == id) {
                log::debug!("Pipeline '{}' is already registered", pipeline.name());
                return;
            }
            log::debug!("Registering pipeline '{}'", pipeline.name());
            pipelines.push(Arc::new(Registration {
                id,
                runner: Arc::new(PipelineRunner::new(pipeline)),
                busy: Arc::new(AtomicBool::new(false)),
                current: Mutex::new(None),
            }));
        }

        if state.scheduler.is_none() {
            log::debug!("Restarting idle scheduler");
            state.scheduler = SchedulerThread::spawn(&self.shared);
        }
    }

    /// Remove a pipeline, wait (bounded) for its running job and drain it
    /// once more on the calling thread. Returns false if it was not
    /// registered. Removing the last pipeline idles the scheduler.
    ///
    /// # Panics
    ///
    /// Panics unless the manager is initialized.
    pub fn deregister<P>(&self, pipeline: &Arc<P>) -> bool
    where
        P: EventPipeline + 'static,
    {
        let mut state = self.state.lock();
        Self::require_initialized(&state);

        let id = PipelineId::of(pipeline);
        let (removed, now_empty) = {
            let mut pipelines = self.shared.pipelines.lock();
            let removed = pipelines
                .iter()
                .position(|r| r.id == id)
                .map(|index| pipelines.remove(index));
            (removed, pipelines.is_empty())
        };

        let Some(registration) = removed else {
            return false;
        };
        self.shared.retire(&registration);

        if now_empty {
            self.stop_scheduler(&mut state);
        }
        true
    }

    /// Deregister every pipeline and idle the scheduler
    ///
    /// # Panics
    ///
    /// Panics unless the manager is initialized.
    pub fn deregister_all(&self) {
        let mut state = self.state.lock();
        Self::require_initialized(&state);
        self.deregister_all_locked(&mut state);
    }

    /// Tear down: deregister everything, stop the scheduler, and wait
    /// (bounded) for outstanding workers. Safe to call more than once.
    pub fn dispose(&self) {
        let mut state = self.state.lock();
        match state.lifecycle {
            Lifecycle::Disposed => return,
            Lifecycle::Uninitialized => {
                state.lifecycle = Lifecycle::Disposed;
                return;
            }
            Lifecycle::Initialized => {}
        }

        self.deregister_all_locked(&mut state);

        let outstanding = std::mem::take(&mut *self.shared.in_flight.lock());
        for control in outstanding {
            if !control.join(self.shared.config.join_timeout) {
                log::warn!("Worker still running at dispose, abandoning it");
            }
        }

        if state.owns_pool {
            if let Some(pool) = self.shared.pool.read().as_ref() {
                pool.dispose(self.shared.config.join_timeout);
            }
        }

        state.lifecycle = Lifecycle::Disposed;
        log::debug!("ThreadManager disposed");
    }

    pub fn is_initialized(&self) -> bool {
        self.state.lock().lifecycle == Lifecycle::Initialized
    }

    /// True while the scheduler thread is running
    pub fn is_scheduling(&self) -> bool {
        self.state.lock().scheduler.is_some()
    }

    pub fn pipeline_count(&self) -> usize {
        self.shared.pipelines.lock().len()
    }

    /// Submitted jobs not yet reaped
    pub fn in_flight_count(&self) -> usize {
        self.shared.in_flight.lock().len()
    }

    fn require_initialized(state: &ManagerState) {
        match state.lifecycle {
            Lifecycle::Initialized => {}
            Lifecycle::Uninitialized => panic!("ThreadManager must be initialized before use"),
            Lifecycle::Disposed => panic!("ThreadManager has been disposed"),
        }
    }

    fn deregister_all_locked(&self, state: &mut ManagerState) {
        let registrations = std::mem::take(&mut *self.shared.pipelines.lock());
        for registration in &registrations {
            self.shared.retire(registration);
        }
        self.stop_scheduler(state);
    }

    fn stop_scheduler(&self, state: &mut ManagerState) {
        if let Some(scheduler) = state.scheduler.take() {
            scheduler.stop(self.shared.config.join_timeout);
        }
    }
}

impl Drop for ThreadManager {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for ThreadManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadManager")
            .field("config", &self.shared.config)
            .field("pipelines", &self.pipeline_count())
            .finish_non_exhaustive()
    }
}
