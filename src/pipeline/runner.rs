//! Execution of one drain-and-dispatch pass over a pipeline

use crate::core::error_handling::panic_message;
use crate::pipeline::traits::EventPipeline;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Type-erased view of a runner, as held by the scheduler
pub(crate) trait PipelineTask: Send + Sync {
    fn name(&self) -> &str;

    fn run(&self) -> usize;
}

/// Drains each source of a pipeline once and hands the batch to its handler
///
/// Handler errors and panics are logged here and never escape, so a failing
/// pipeline cannot take down the worker or the scheduler.
pub struct PipelineRunner<P> {
    pipeline: Arc<P>,
}

impl<P: EventPipeline> PipelineRunner<P> {
    pub fn new(pipeline: Arc<P>) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &Arc<P> {
        &self.pipeline
    }

    /// One pass over all sources, in order. Returns the number of events
    /// dispatched.
    pub fn run(&self) -> usize {
        let handler = self.pipeline.event_handler();
        let mut dispatched = 0;

        for source in self.pipeline.sources() {
            let batch = source.dequeue_all();
            let count = batch.len();
            dispatched += count;

            match catch_unwind(AssertUnwindSafe(|| handler.handle_events(batch))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => log::error!(
                    "Pipeline '{}': handler failed on {} event(s) from '{}': {}",
                    self.pipeline.name(),
                    count,
                    source.name(),
                    e
                ),
                Err(payload) => log::error!(
                    "Pipeline '{}': handler panicked on {} event(s) from '{}': {}",
                    self.pipeline.name(),
                    count,
                    source.name(),
                    panic_message(payload.as_ref())
                ),
            }
        }

        if dispatched > 0 {
            log::trace!(
                "Pipeline '{}' dispatched {} event(s)",
                self.pipeline.name(),
                dispatched
            );
        }
        dispatched
    }
}

impl<P: EventPipeline> PipelineTask for PipelineRunner<P> {
    fn name(&self) -> &str {
        self.pipeline.name()
    }

    fn run(&self) -> usize {
        PipelineRunner::run(self)
    }
}
