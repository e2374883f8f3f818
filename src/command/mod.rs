//! Command Pipeline Component
//!
//! [`CommandManager`](api::CommandManager) is an event pipeline whose single
//! queue carries [`CommandElement`](api::CommandElement)s: signals for
//! registered listeners, commands to run, and commands to run later or
//! repeatedly. Other components only ever see its
//! [`command_queue`](api::CommandManager::command_queue) sink.

pub mod api;

mod elements;
mod manager;
mod traits;

#[cfg(test)]
mod tests;
