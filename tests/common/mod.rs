//! Shared helpers for integration tests

#![allow(dead_code)]

use seda::core::config::SchedulerSettings;
use std::io::Write;
use std::thread;
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;

pub const WAIT: Duration = Duration::from_secs(5);

/// Poll `condition` until it holds or [`WAIT`] elapses
pub fn wait_for(condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + WAIT;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}

/// Scheduler settings with short poll and join intervals
pub fn fast_scheduler(pool_size: usize) -> SchedulerSettings {
    SchedulerSettings {
        sleep_time_ms: 5,
        join_timeout_ms: 500,
        block_timeout_ms: 20,
        pool_size,
        ..SchedulerSettings::default()
    }
}

pub fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}
