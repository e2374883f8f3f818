//! CommandManager: a pipeline that executes commands and broadcasts signals

use crate::command::elements::CommandElement;
use crate::command::traits::{Command, Signal, SignalHandler};
use crate::core::error_handling::panic_message;
use crate::core::time::{Clock, SystemClock};
use crate::pipeline::api::{EventHandler, EventPipeline, HandlerResult};
use crate::queue::api::{DefaultQueue, Sink, Source};
use parking_lot::Mutex;
use std::any::TypeId;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

trait ErasedSignalHandler: Send + Sync {
    fn dispatch(&self, signal: &dyn Signal);
}

struct TypedHandler<S, H> {
    handler: Arc<H>,
    _signal: PhantomData<fn(&S)>,
}

impl<S, H> ErasedSignalHandler for TypedHandler<S, H>
where
    S: Signal,
    H: SignalHandler<S>,
{
    fn dispatch(&self, signal: &dyn Signal) {
        if let Some(signal) = signal.as_any().downcast_ref::<S>() {
            self.handler.handle_signal(signal);
        }
    }
}

struct HandlerEntry {
    id: usize,
    handler: Arc<dyn ErasedSignalHandler>,
}

fn handler_id<H>(handler: &Arc<H>) -> usize {
    Arc::as_ptr(handler) as *const () as usize
}

struct Repeat {
    interval: Duration,
    repeats: u32,
}

/// Command waiting for its run time
struct Deferred {
    command: Box<dyn Command>,
    next_run: Instant,
    repeat: Option<Repeat>,
    executions: u32,
}

impl Deferred {
    /// Whether another run is due after the one just made
    fn should_repeat(&self) -> bool {
        match &self.repeat {
            Some(repeat) => repeat.repeats == 0 || self.executions <= repeat.repeats,
            None => false,
        }
    }
}

fn run_command(command: &mut dyn Command) {
    match catch_unwind(AssertUnwindSafe(|| command.execute())) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => log::error!("Command failed: {}", e),
        Err(payload) => log::error!("Command panicked: {}", panic_message(payload.as_ref())),
    }
}

/// Pipeline over a single internal queue of [`CommandElement`]s
///
/// Each handled batch is processed in order: signals go to the handlers
/// registered for their concrete type, plain commands run immediately, and
/// delayed or repeated commands are parked until due. After the batch, every
/// parked command whose time has come runs once. Register the manager with a
/// [`ThreadManager`](crate::scheduler::api::ThreadManager) so that parked
/// commands are checked every cycle.
///
/// # Example
///
/// ```rust
/// use seda::command::api::{CommandElement, CommandManager, Signal};
/// use seda::pipeline::api::{HandlerResult, PipelineRunner};
/// use seda::queue::api::Sink;
/// use std::sync::Arc;
///
/// #[derive(Debug)]
/// struct Ping;
/// impl Signal for Ping {}
///
/// let commands = Arc::new(CommandManager::new());
/// commands.register_signal_handler::<Ping, _>(Arc::new(|_: &Ping| println!("pong")));
///
/// let sink = commands.command_queue();
/// sink.enqueue(CommandElement::signal(Ping)).unwrap();
/// sink.enqueue(CommandElement::command(|| -> HandlerResult { Ok(()) })).unwrap();
///
/// PipelineRunner::new(commands.clone()).run();
/// ```
pub struct CommandManager {
    name: String,
    queue: Arc<DefaultQueue<CommandElement>>,
    sources: Vec<Arc<dyn Source<CommandElement>>>,
    clock: Arc<dyn Clock>,
    signal_handlers: Mutex<HashMap<TypeId, Vec<HandlerEntry>>>,
    deferred: Mutex<Vec<Deferred>>,
}

impl Default for CommandManager {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandManager {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        let queue = Arc::new(DefaultQueue::<CommandElement>::unbounded("commands"));
        Self {
            name: "commands".to_string(),
            sources: vec![queue.clone() as Arc<dyn Source<CommandElement>>],
            queue,
            clock,
            signal_handlers: Mutex::new(HashMap::new()),
            deferred: Mutex::new(Vec::new()),
        }
    }

    /// The sink other components enqueue commands and signals onto
    pub fn command_queue(&self) -> Arc<dyn Sink<CommandElement>> {
        self.queue.clone()
    }

    /// Add a handler for signals of type `S`. Returns false if this handler
    /// was already registered for `S`.
    pub fn register_signal_handler<S, H>(&self, handler: Arc<H>) -> bool
    where
        S: Signal,
        H: SignalHandler<S> + 'static,
    {
        let id = handler_id(&handler);
        let mut handlers = self.signal_handlers.lock();
        let entries = handlers.entry(TypeId::of::<S>()).or_default();
        if entries.iter().any(|entry| entry.id == id) {
            return false;
        }

        entries.push(HandlerEntry {
            id,
            handler: Arc::new(TypedHandler {
                handler,
                _signal: PhantomData::<fn(&S)>,
            }),
        });
        log::debug!(
            "Registered handler for {} ({} total)",
            std::any::type_name::<S>(),
            entries.len()
        );
        true
    }

    /// Remove a handler for `S`. Returns false if it was not registered.
    pub fn deregister_signal_handler<S, H>(&self, handler: &Arc<H>) -> bool
    where
        S: Signal,
        H: SignalHandler<S> + 'static,
    {
        let id = handler_id(handler);
        let type_id = TypeId::of::<S>();
        let mut handlers = self.signal_handlers.lock();
        let Some(entries) = handlers.get_mut(&type_id) else {
            return false;
        };

        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        let removed = entries.len() < before;
        if entries.is_empty() {
            handlers.remove(&type_id);
        }
        removed
    }

    /// Number of handlers registered for `S`
    pub fn signal_handler_count<S: Signal>(&self) -> usize {
        self.signal_handlers
            .lock()
            .get(&TypeId::of::<S>())
            .map_or(0, Vec::len)
    }

    /// Delayed and repeated commands waiting to run
    pub fn deferred_count(&self) -> usize {
        self.deferred.lock().len()
    }

    /// Handle everything still queued, then drop commands that never came due
    pub fn dispose(&self) {
        let remaining = self.queue.dequeue_all();
        if !remaining.is_empty() {
            log::debug!("Handling {} queued command element(s) at dispose", remaining.len());
        }
        self.process(remaining);

        let abandoned = std::mem::take(&mut *self.deferred.lock()).len();
        if abandoned > 0 {
            log::debug!("Dropped {} deferred command(s) at dispose", abandoned);
        }
    }

    fn process(&self, elements: Vec<CommandElement>) {
        for element in elements {
            match element {
                CommandElement::Signal(signal) => self.broadcast(&*signal),
                CommandElement::Command(mut command) => run_command(&mut *command),
                CommandElement::Delayed(delayed) => self.defer(Deferred {
                    command: delayed.command,
                    next_run: self.clock.now() + delayed.delay,
                    repeat: None,
                    executions: 0,
                }),
                CommandElement::Repeated(repeated) => self.defer(Deferred {
                    command: repeated.command,
                    next_run: self.clock.now() + repeated.delay,
                    repeat: Some(Repeat {
                        interval: repeated.interval,
                        repeats: repeated.repeats,
                    }),
                    executions: 0,
                }),
            }
        }

        self.run_due();
    }

    fn broadcast(&self, signal: &dyn Signal) {
        let handlers: Vec<Arc<dyn ErasedSignalHandler>> = {
            let registry = self.signal_handlers.lock();
            match registry.get(&signal.as_any().type_id()) {
                Some(entries) => entries.iter().map(|e| Arc::clone(&e.handler)).collect(),
                None => {
                    log::trace!("No handlers for signal {:?}", signal);
                    return;
                }
            }
        };

        for handler in handlers {
            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| handler.dispatch(signal))) {
                log::error!(
                    "Handler for signal {:?} panicked: {}",
                    signal,
                    panic_message(payload.as_ref())
                );
            }
        }
    }

    fn defer(&self, deferred: Deferred) {
        self.deferred.lock().push(deferred);
    }

    fn run_due(&self) {
        let now = self.clock.now();
        let due: Vec<Deferred> = {
            let mut deferred = self.deferred.lock();
            let (due, waiting): (Vec<Deferred>, Vec<Deferred>) = std::mem::take(&mut *deferred)
                .into_iter()
                .partition(|d| d.next_run <= now);
            *deferred = waiting;
            due
        };

        for mut record in due {
            run_command(&mut *record.command);
            record.executions += 1;

            if record.should_repeat() {
                if let Some(repeat) = &record.repeat {
                    record.next_run = self.clock.now() + repeat.interval;
                }
                self.defer(record);
            }
        }
    }
}

impl EventHandler<CommandElement> for CommandManager {
    fn handle_event(&self, event: CommandElement) -> HandlerResult {
        self.process(vec![event]);
        Ok(())
    }

    fn handle_events(&self, events: Vec<CommandElement>) -> HandlerResult {
        self.process(events);
        Ok(())
    }
}

impl EventPipeline for CommandManager {
    type Element = CommandElement;

    fn name(&self) -> &str {
        &self.name
    }

    fn sources(&self) -> &[Arc<dyn Source<CommandElement>>] {
        &self.sources
    }

    fn event_handler(&self) -> &dyn EventHandler<CommandElement> {
        self
    }
}

impl std::fmt::Debug for CommandManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandManager")
            .field("name", &self.name)
            .field("deferred", &self.deferred_count())
            .finish_non_exhaustive()
    }
}
