//! Elements carried by the command queue

use crate::command::traits::{Command, Signal};
use std::fmt;
use std::time::Duration;

/// Command run once, `delay` after it is handled
pub struct DelayedCommand {
    pub(crate) command: Box<dyn Command>,
    pub(crate) delay: Duration,
}

impl DelayedCommand {
    pub fn new(command: impl Command + 'static, delay: Duration) -> Self {
        Self {
            command: Box::new(command),
            delay,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

/// Command run after `delay`, then every `interval`
///
/// `repeats` counts runs after the first; 0 repeats forever.
pub struct RepeatedCommand {
    pub(crate) command: Box<dyn Command>,
    pub(crate) delay: Duration,
    pub(crate) interval: Duration,
    pub(crate) repeats: u32,
}

impl RepeatedCommand {
    pub fn new(
        command: impl Command + 'static,
        delay: Duration,
        interval: Duration,
        repeats: u32,
    ) -> Self {
        Self {
            command: Box::new(command),
            delay,
            interval,
            repeats,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn repeats(&self) -> u32 {
        self.repeats
    }
}

/// Everything the command pipeline accepts
pub enum CommandElement {
    Signal(Box<dyn Signal>),
    Command(Box<dyn Command>),
    Delayed(DelayedCommand),
    Repeated(RepeatedCommand),
}

impl CommandElement {
    pub fn signal(signal: impl Signal) -> Self {
        Self::Signal(Box::new(signal))
    }

    pub fn command(command: impl Command + 'static) -> Self {
        Self::Command(Box::new(command))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Signal(_) => "signal",
            Self::Command(_) => "command",
            Self::Delayed(_) => "delayed command",
            Self::Repeated(_) => "repeated command",
        }
    }
}

impl From<DelayedCommand> for CommandElement {
    fn from(command: DelayedCommand) -> Self {
        Self::Delayed(command)
    }
}

impl From<RepeatedCommand> for CommandElement {
    fn from(command: RepeatedCommand) -> Self {
        Self::Repeated(command)
    }
}

impl fmt::Debug for CommandElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signal(signal) => f.debug_tuple("Signal").field(signal).finish(),
            Self::Delayed(delayed) => f
                .debug_struct("Delayed")
                .field("delay", &delayed.delay)
                .finish_non_exhaustive(),
            Self::Repeated(repeated) => f
                .debug_struct("Repeated")
                .field("delay", &repeated.delay)
                .field("interval", &repeated.interval)
                .field("repeats", &repeated.repeats)
                .finish_non_exhaustive(),
            Self::Command(_) => f.write_str("Command(..)"),
        }
    }
}
