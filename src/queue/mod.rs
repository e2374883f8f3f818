//! Event Queue Component
//!
//! Bounded and unbounded FIFO queues connecting the stages of an event
//! graph, with backpressure, a two-phase ("prepared") enqueue protocol and
//! pluggable admission control.
//!
//! # Overview
//!
//! - **Role split**: the write side ([`Sink`](api::Sink)) and read side
//!   ([`Source`](api::Source)) are separate capabilities, so a stage can be
//!   handed only the half it needs
//! - **Backpressure**: a bounded queue refuses admission with
//!   [`SinkError::Full`](api::SinkError::Full) instead of growing
//! - **All-or-nothing batches**: a batch enqueue either admits every element
//!   or none of them
//! - **Prepared enqueue**: reserve capacity now, then commit or abort later
//! - **Admission predicates**: an optional gate evaluated in the producer's
//!   thread before the capacity check
//!
//! # Architecture
//!
//! ```text
//!  producers                                        consumers
//! ┌─────────┐ enqueue / prepare_enqueue  ┌────────────────────────┐
//! │ Stage A │ ─────────────────────────▶ │ EventQueue<T, B>       │
//! └─────────┘         │                  │  ┌──────────────────┐  │ dequeue_all
//!                     ▼                  │  │ B: Buffer<T>     │  │ ──────────▶ pipeline
//!            ┌──────────────────┐        │  │  Growable | Ring │  │
//!            │ EnqueuePredicate │        │  └──────────────────┘  │
//!            └──────────────────┘        │  reserve, timeout      │
//!                                        └────────────────────────┘
//! ```
//!
//! # Example Usage
//!
//! ```rust
//! use seda::queue::api::{DefaultQueue, QueueInfo, Sink, Source};
//!
//! let queue = DefaultQueue::bounded("parser", 4);
//!
//! queue.enqueue_batch(vec![1, 2, 3]).unwrap();
//! assert!(queue.enqueue_batch(vec![4, 5]).is_err());
//! assert_eq!(queue.size(), 3);
//!
//! let mut prepared = queue.prepare_enqueue(vec![4]).unwrap();
//! assert!(queue.is_full());
//! prepared.abort();
//!
//! assert_eq!(queue.dequeue_all(), vec![1, 2, 3]);
//! ```

pub mod api;

mod buffer;
mod error;
mod event_queue;
mod predicate;
mod prepared;
mod traits;

#[cfg(test)]
mod tests;
