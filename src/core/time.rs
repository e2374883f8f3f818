//! Clock abstraction for testable time-dependent logic

#[cfg(test)]
use parking_lot::Mutex;
#[cfg(test)]
use std::sync::Arc;
#[cfg(test)]
use std::time::Duration;
use std::time::Instant;

/// Monotonic time source used for deferred-command scheduling and rate limits
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Production clock backed by `Instant::now`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually advanced clock for deterministic testing
#[derive(Debug, Clone)]
#[cfg(test)]
pub struct MockClock {
    current: Arc<Mutex<Instant>>,
}

#[cfg(test)]
impl MockClock {
    pub fn new() -> Self {
        Self {
            current: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Move the clock forward; clones share the same time
    pub fn advance(&self, duration: Duration) {
        *self.current.lock() += duration;
    }
}

#[cfg(test)]
impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl Clock for MockClock {
    fn now(&self) -> Instant {
        *self.current.lock()
    }
}
