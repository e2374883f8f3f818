//! Public API for event pipelines

pub use crate::pipeline::runner::PipelineRunner;
pub use crate::pipeline::simple::{ForwardingHandler, SimplePipeline};
pub use crate::pipeline::traits::{EventHandler, EventPipeline, HandlerError, HandlerResult};
