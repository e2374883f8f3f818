//! Public API for the queue system
//!
//! External modules should import from here rather than directly from the
//! internal modules. See the module documentation for usage examples.

// Queue implementations
pub use crate::queue::event_queue::{DefaultQueue, EventQueue, FixedSizeQueue};

// Backing stores
pub use crate::queue::buffer::{Buffer, GrowableBuffer, RingBuffer};

// Two-phase enqueue
pub use crate::queue::prepared::PreparedEnqueue;

// Capabilities and hooks
pub use crate::queue::traits::{
    DequeueInterceptor, EnqueuePredicate, NullDequeueInterceptor, Queue, QueueInfo, Sink, Source,
};

// Stock predicates
pub use crate::queue::predicate::{
    NullEnqueuePredicate, RateLimitingPredicate, ThresholdEnqueuePredicate,
};

// Error handling
pub use crate::queue::error::{QueueResult, SinkError};
