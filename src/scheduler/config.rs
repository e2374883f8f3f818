//! Scheduler configuration

use crate::core::config::SchedulerSettings;
use std::time::Duration;

/// Timing knobs of the scheduling loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadManagerConfig {
    /// Sleep between scheduling cycles
    pub sleep_time: Duration,

    /// Bound on every join performed by deregister and dispose
    pub join_timeout: Duration,
}

impl Default for ThreadManagerConfig {
    fn default() -> Self {
        Self::from_settings(&SchedulerSettings::default())
    }
}

impl ThreadManagerConfig {
    pub fn from_settings(settings: &SchedulerSettings) -> Self {
        Self {
            sleep_time: Duration::from_millis(settings.sleep_time_ms),
            join_timeout: Duration::from_millis(settings.join_timeout_ms),
        }
    }

    pub fn with_sleep_time(mut self, sleep_time: Duration) -> Self {
        self.sleep_time = sleep_time;
        self
    }

    pub fn with_join_timeout(mut self, join_timeout: Duration) -> Self {
        self.join_timeout = join_timeout;
        self
    }
}
