//! Retry utility for operations that fail transiently
//!
//! Producers use this to back off from a full sink instead of dropping
//! events on the first `SinkError::Full`.

use std::time::Duration;

/// Configurable retry policy
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_millis(500),
        }
    }
}

/// Execute an operation, sleeping `policy.delay` between failed attempts
///
/// A policy with `max_attempts == 0` still runs the operation once.
///
/// # Examples
/// ```rust
/// use seda::core::retry::{retry_with_policy, RetryPolicy};
/// use seda::queue::api::{DefaultQueue, Sink};
///
/// let queue = DefaultQueue::bounded("ingest", 8);
/// retry_with_policy("ingest", &RetryPolicy::default(), || queue.enqueue(42)).unwrap();
/// ```
pub fn retry_with_policy<F, T, E>(
    operation_name: &str,
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Result<T, E>,
    E: std::fmt::Display,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation() {
            Ok(result) => return Ok(result),
            Err(error) if attempt < attempts => {
                log::debug!(
                    "Operation '{}' failed on attempt {}/{}, retrying in {:?}: {}",
                    operation_name,
                    attempt,
                    attempts,
                    policy.delay,
                    error
                );
                std::thread::sleep(policy.delay);
                attempt += 1;
            }
            Err(error) => return Err(error),
        }
    }
}
