//! Two-phase ("prepared") enqueue
//!
//! `prepare_enqueue` reserves room for a batch without publishing it. The
//! returned [`PreparedEnqueue`] is a one-shot handle: exactly one of
//! [`commit`](PreparedEnqueue::commit) or [`abort`](PreparedEnqueue::abort)
//! may be called, and calling either again is a programming error.

/// Queue-side half of the reservation protocol
pub(crate) trait Reservation<T>: Sync {
    /// Append previously reserved elements and release their reservation
    fn commit_reserved(&self, elements: Vec<T>);

    /// Release a reservation without appending anything
    fn release_reserved(&self, count: usize);

    fn reservation_owner(&self) -> &str;
}

/// Reserved batch awaiting commit or abort
///
/// # Example
///
/// ```rust
/// use seda::queue::api::{DefaultQueue, Sink, QueueInfo};
///
/// let queue = DefaultQueue::bounded("orders", 2);
/// let mut prepared = queue.prepare_enqueue(vec![1, 2]).unwrap();
///
/// // Both slots are taken by the reservation
/// assert!(queue.is_full());
/// assert_eq!(queue.size(), 0);
///
/// prepared.commit();
/// assert_eq!(queue.size(), 2);
/// ```
pub struct PreparedEnqueue<'a, T> {
    target: &'a dyn Reservation<T>,
    elements: Option<Vec<T>>,
}

impl<'a, T> PreparedEnqueue<'a, T> {
    pub(crate) fn new(target: &'a dyn Reservation<T>, elements: Vec<T>) -> Self {
        Self {
            target,
            elements: Some(elements),
        }
    }

    /// Number of reserved elements, zero once processed
    pub fn len(&self) -> usize {
        self.elements.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True until `commit` or `abort` has been called
    pub fn is_pending(&self) -> bool {
        self.elements.is_some()
    }

    /// Publish the reserved elements to the queue
    ///
    /// # Panics
    ///
    /// Panics if this enqueue has already been committed or aborted.
    pub fn commit(&mut self) {
        let Some(elements) = self.elements.take() else {
            panic!(
                "PreparedEnqueue on '{}' has already been processed",
                self.target.reservation_owner()
            );
        };
        self.target.commit_reserved(elements);
    }

    /// Release the reservation; nothing is appended
    ///
    /// # Panics
    ///
    /// Panics if this enqueue has already been committed or aborted.
    pub fn abort(&mut self) {
        let Some(elements) = self.elements.take() else {
            panic!(
                "PreparedEnqueue on '{}' has already been processed",
                self.target.reservation_owner()
            );
        };
        self.target.release_reserved(elements.len());
    }
}

impl<T> Drop for PreparedEnqueue<'_, T> {
    fn drop(&mut self) {
        if let Some(elements) = self.elements.take() {
            log::warn!(
                "PreparedEnqueue on '{}' dropped without commit or abort; releasing {} reserved slot(s)",
                self.target.reservation_owner(),
                elements.len()
            );
            self.target.release_reserved(elements.len());
        }
    }
}

impl<T> std::fmt::Debug for PreparedEnqueue<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedEnqueue")
            .field("queue", &self.target.reservation_owner())
            .field("reserved", &self.len())
            .field("pending", &self.is_pending())
            .finish()
    }
}
