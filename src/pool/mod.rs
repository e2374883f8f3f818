//! Worker Pool Component
//!
//! The scheduler hands pipeline runs to a [`ThreadPool`](api::ThreadPool)
//! and keeps the returned [`ThreadControl`](api::ThreadControl) to observe
//! completion. Exhaustion is an expected outcome, reported as
//! [`PoolError::Exhausted`](api::PoolError::Exhausted) rather than by
//! blocking the caller indefinitely.

pub mod api;

mod control;
mod error;
mod resource_limiting;
mod traits;
