//! Command, signal and signal-handler traits

use crate::pipeline::api::HandlerResult;
use std::any::Any;
use std::fmt;

/// Unit of work executed by the command pipeline
pub trait Command: Send {
    fn execute(&mut self) -> HandlerResult;
}

impl<F> Command for F
where
    F: FnMut() -> HandlerResult + Send,
{
    fn execute(&mut self) -> HandlerResult {
        self()
    }
}

/// Access to the concrete type behind a trait object
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Notification broadcast to every handler registered for its concrete type
///
/// ```rust
/// use seda::command::api::Signal;
///
/// #[derive(Debug)]
/// struct ConfigReloaded;
///
/// impl Signal for ConfigReloaded {}
/// ```
pub trait Signal: AsAny + Send + Sync + fmt::Debug {}

/// Listener for one signal type
pub trait SignalHandler<S: Signal>: Send + Sync {
    fn handle_signal(&self, signal: &S);
}

impl<S, F> SignalHandler<S> for F
where
    S: Signal,
    F: Fn(&S) + Send + Sync,
{
    fn handle_signal(&self, signal: &S) {
        self(signal)
    }
}
