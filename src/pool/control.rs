//! Completion handle for a job running on a pooled worker

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct Completion {
    finished: bool,
    failure: Option<String>,
}

#[derive(Debug, Default)]
struct ControlState {
    completion: Mutex<Completion>,
    done: Condvar,
}

/// Handle returned for every submitted job
///
/// Clones observe the same job. Joining never blocks longer than the
/// timeout given.
#[derive(Debug, Clone)]
pub struct ThreadControl {
    state: Arc<ControlState>,
}

impl ThreadControl {
    pub(crate) fn new() -> Self {
        Self {
            state: Arc::new(ControlState::default()),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.state.completion.lock().finished
    }

    /// Wait up to `timeout` for the job to finish; true if it did
    pub fn join(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut completion = self.state.completion.lock();
        while !completion.finished {
            if self.state.done.wait_until(&mut completion, deadline).timed_out() {
                return completion.finished;
            }
        }
        true
    }

    /// Panic message if the job panicked
    pub fn failure(&self) -> Option<String> {
        self.state.completion.lock().failure.clone()
    }

    pub(crate) fn finish(&self, failure: Option<String>) {
        {
            let mut completion = self.state.completion.lock();
            completion.finished = true;
            completion.failure = failure;
        }
        self.state.done.notify_all();
    }
}
