//! Traits for the queue system
//!
//! The write side ([`Sink`]) and read side ([`Source`]) of a queue are kept
//! as separate capabilities so a stage can be handed write-only or read-only
//! access. [`Queue`] combines both.

use crate::queue::error::QueueResult;
use crate::queue::prepared::PreparedEnqueue;
use std::sync::Arc;
use std::time::Duration;

/// Identity and occupancy shared by both sides of a queue
pub trait QueueInfo: Send + Sync {
    /// Name used in log output
    fn name(&self) -> &str;

    /// Number of committed elements currently held
    ///
    /// Informational only; the outcome of an enqueue or dequeue is the
    /// only authoritative answer.
    fn size(&self) -> usize;
}

/// Write-only capability of a queue
pub trait Sink<T>: QueueInfo {
    /// Append one element, failing with [`SinkError::Full`] or
    /// [`SinkError::Rejected`] without side effects.
    ///
    /// [`SinkError::Full`]: crate::queue::api::SinkError::Full
    /// [`SinkError::Rejected`]: crate::queue::api::SinkError::Rejected
    fn enqueue(&self, element: T) -> QueueResult<()>;

    /// Append a batch atomically: either every element is admitted or none is.
    fn enqueue_batch(&self, elements: Vec<T>) -> QueueResult<()>;

    /// Single-element variant that reports failure as `false`
    fn try_enqueue(&self, element: T) -> bool;

    /// Reserve room for `elements` and return a one-shot handle that either
    /// commits them to the queue or releases the reservation.
    fn prepare_enqueue(&self, elements: Vec<T>) -> QueueResult<PreparedEnqueue<'_, T>>;

    /// Configured capacity, `None` when unbounded
    fn max_size(&self) -> Option<usize>;

    /// Number of further elements that could currently be admitted,
    /// `None` when unbounded. Reserved-but-uncommitted slots count as taken.
    fn can_accept(&self) -> Option<usize>;

    fn is_full(&self) -> bool {
        self.can_accept() == Some(0)
    }

    /// Install (or with `None`, remove) the admission predicate
    fn set_enqueue_predicate(&self, predicate: Option<Arc<dyn EnqueuePredicate<T>>>);

    fn enqueue_predicate(&self) -> Option<Arc<dyn EnqueuePredicate<T>>>;
}

/// Read-only capability of a queue
pub trait Source<T>: QueueInfo {
    /// Remove the oldest element, waiting up to [`Source::timeout`] for one
    /// to arrive.
    fn dequeue(&self) -> Option<T>;

    /// Remove up to `count` elements in FIFO order, waiting up to
    /// [`Source::timeout`] for at least one to arrive.
    fn dequeue_up_to(&self, count: usize) -> Vec<T>;

    /// Remove everything available right now; never waits for elements.
    fn dequeue_all(&self) -> Vec<T>;

    /// Bound on how long dequeue calls may block
    fn timeout(&self) -> Duration;

    fn set_timeout(&self, timeout: Duration);

    fn set_dequeue_interceptor(&self, interceptor: Arc<dyn DequeueInterceptor<T>>);

    fn dequeue_interceptor(&self) -> Arc<dyn DequeueInterceptor<T>>;
}

/// A queue exposes both capabilities
pub trait Queue<T>: Sink<T> + Source<T> {}

impl<T, Q> Queue<T> for Q where Q: Sink<T> + Source<T> {}

/// Synchronous admission gate evaluated in the producer's thread
///
/// Predicates run before the capacity check on every enqueue path, so they
/// must be fast and must not block.
pub trait EnqueuePredicate<T>: Send + Sync {
    fn accept(&self, element: &T, sink: &dyn Sink<T>) -> bool;

    fn accept_batch(&self, elements: &[T], sink: &dyn Sink<T>) -> bool {
        elements.iter().all(|element| self.accept(element, sink))
    }

    /// Called when `count` elements this predicate accepted were then
    /// refused by the capacity check, so nothing was admitted
    fn refund(&self, _count: usize) {}
}

/// Hooks run around every dequeue call on a [`Source`]
pub trait DequeueInterceptor<T>: Send + Sync {
    fn before(&self, source: &dyn Source<T>);

    fn after(&self, source: &dyn Source<T>);
}

/// Interceptor that does nothing; installed on every new queue
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDequeueInterceptor;

impl<T> DequeueInterceptor<T> for NullDequeueInterceptor {
    fn before(&self, _source: &dyn Source<T>) {}

    fn after(&self, _source: &dyn Source<T>) {}
}
