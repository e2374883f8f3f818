//! Public API for the scheduler

pub use crate::scheduler::config::ThreadManagerConfig;
pub use crate::scheduler::manager::{PipelineId, ThreadManager};
