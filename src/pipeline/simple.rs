//! Ready-made pipeline and handler building blocks

use crate::pipeline::traits::{EventHandler, EventPipeline, HandlerResult};
use crate::queue::api::{Sink, Source};
use std::sync::Arc;

/// Plain binding of sources to a handler
///
/// # Example
///
/// ```rust
/// use seda::pipeline::api::{HandlerResult, PipelineRunner, SimplePipeline};
/// use seda::queue::api::{DefaultQueue, Sink, Source};
/// use std::sync::Arc;
///
/// let queue = Arc::new(DefaultQueue::<String>::unbounded("lines"));
/// let pipeline = SimplePipeline::new(
///     "printer",
///     vec![queue.clone() as Arc<dyn Source<String>>],
///     Arc::new(|line: String| -> HandlerResult {
///         println!("{}", line);
///         Ok(())
///     }),
/// );
///
/// queue.enqueue("hello".to_string()).unwrap();
/// assert_eq!(PipelineRunner::new(Arc::new(pipeline)).run(), 1);
/// ```
pub struct SimplePipeline<T> {
    name: String,
    sources: Vec<Arc<dyn Source<T>>>,
    handler: Arc<dyn EventHandler<T>>,
}

impl<T: Send + 'static> SimplePipeline<T> {
    pub fn new(
        name: impl Into<String>,
        sources: Vec<Arc<dyn Source<T>>>,
        handler: Arc<dyn EventHandler<T>>,
    ) -> Self {
        Self {
            name: name.into(),
            sources,
            handler,
        }
    }

    /// Builder-style addition of another source
    pub fn with_source(mut self, source: Arc<dyn Source<T>>) -> Self {
        self.sources.push(source);
        self
    }
}

impl<T: Send + 'static> EventPipeline for SimplePipeline<T> {
    type Element = T;

    fn name(&self) -> &str {
        &self.name
    }

    fn sources(&self) -> &[Arc<dyn Source<T>>] {
        &self.sources
    }

    fn event_handler(&self) -> &dyn EventHandler<T> {
        self.handler.as_ref()
    }
}

impl<T> std::fmt::Debug for SimplePipeline<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimplePipeline")
            .field("name", &self.name)
            .field("sources", &self.sources.len())
            .finish_non_exhaustive()
    }
}

/// Handler that forwards every batch to the next stage's sink
///
/// Batches are forwarded all-or-nothing; a full or rejecting sink surfaces
/// as a handler failure and the batch is dropped.
pub struct ForwardingHandler<T> {
    next: Arc<dyn Sink<T>>,
}

impl<T> ForwardingHandler<T> {
    pub fn new(next: Arc<dyn Sink<T>>) -> Self {
        Self { next }
    }
}

impl<T: Send> EventHandler<T> for ForwardingHandler<T> {
    fn handle_event(&self, event: T) -> HandlerResult {
        Ok(self.next.enqueue(event)?)
    }

    fn handle_events(&self, events: Vec<T>) -> HandlerResult {
        if events.is_empty() {
            return Ok(());
        }
        Ok(self.next.enqueue_batch(events)?)
    }
}
