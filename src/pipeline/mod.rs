//! Event Pipeline Component
//!
//! A pipeline binds one or more [`Source`](crate::queue::api::Source)s to a
//! single [`EventHandler`](api::EventHandler). The scheduler repeatedly runs
//! a [`PipelineRunner`](api::PipelineRunner) for each registered pipeline,
//! which drains every source with `dequeue_all` and passes each batch to the
//! handler. Handlers may themselves feed other queues, composing stages into
//! a graph:
//!
//! ```text
//! ┌────────┐   ┌──────────────────┐   ┌────────┐   ┌──────────────────┐
//! │ queue A│──▶│ handler (stage 1)│──▶│ queue B│──▶│ handler (stage 2)│
//! └────────┘   └──────────────────┘   └────────┘   └──────────────────┘
//! ```

pub mod api;

pub(crate) mod runner;
mod simple;
mod traits;
