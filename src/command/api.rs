//! Public API for the command pipeline

pub use crate::command::elements::{CommandElement, DelayedCommand, RepeatedCommand};
pub use crate::command::manager::CommandManager;
pub use crate::command::traits::{AsAny, Command, Signal, SignalHandler};
