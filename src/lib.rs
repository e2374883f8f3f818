//! Staged event-driven processing core
//!
//! Independent stages are connected by queues. A [`ThreadManager`] drains
//! every registered pipeline on a bounded worker pool, and a
//! [`CommandManager`] runs commands and broadcasts signals through the same
//! machinery.
//!
//! [`ThreadManager`]: scheduler::api::ThreadManager
//! [`CommandManager`]: command::api::CommandManager

pub mod app;
pub mod command;
pub mod core;
pub mod pipeline;
pub mod pool;
pub mod queue;
pub mod scheduler;
