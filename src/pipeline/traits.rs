//! Traits for event pipelines

use crate::queue::api::Source;
use std::sync::Arc;

/// Error returned by handlers and commands; contained at the dispatch boundary
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

pub type HandlerResult = Result<(), HandlerError>;

/// Consumer of the events drained from a pipeline's sources
pub trait EventHandler<T>: Send + Sync {
    fn handle_event(&self, event: T) -> HandlerResult;

    /// Handle a drained batch. The default handles events in order and
    /// stops at the first failure; the remaining events of the batch are
    /// dropped.
    fn handle_events(&self, events: Vec<T>) -> HandlerResult {
        for event in events {
            self.handle_event(event)?;
        }
        Ok(())
    }
}

impl<T, F> EventHandler<T> for F
where
    F: Fn(T) -> HandlerResult + Send + Sync,
{
    fn handle_event(&self, event: T) -> HandlerResult {
        self(event)
    }
}

/// One or more sources bound to exactly one handler
///
/// Pipelines are registered with a scheduler as `Arc<P>`; the `Arc`'s
/// address is the pipeline's identity.
pub trait EventPipeline: Send + Sync {
    type Element: Send + 'static;

    /// Name used in log output
    fn name(&self) -> &str;

    fn sources(&self) -> &[Arc<dyn Source<Self::Element>>];

    fn event_handler(&self) -> &dyn EventHandler<Self::Element>;
}
