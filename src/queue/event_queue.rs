//! EventQueue: FIFO queue with transactional admission
//!
//! A single implementation drives both queue flavours; the backing
//! [`Buffer`] decides whether storage grows ([`GrowableBuffer`]) or is a
//! fixed ring ([`RingBuffer`]). All bookkeeping (committed elements plus the
//! reserve held by outstanding prepared enqueues) is kept under one
//! per-queue mutex.

use crate::core::config::QueueSettings;
use crate::queue::buffer::{Buffer, GrowableBuffer, RingBuffer};
use crate::queue::error::{QueueResult, SinkError};
use crate::queue::prepared::{PreparedEnqueue, Reservation};
use crate::queue::traits::{
    DequeueInterceptor, EnqueuePredicate, NullDequeueInterceptor, QueueInfo, Sink, Source,
};
use parking_lot::{Condvar, Mutex, MutexGuard, RwLock};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Variable-size queue, unbounded unless constructed with a limit
pub type DefaultQueue<T> = EventQueue<T, GrowableBuffer<T>>;

/// Fixed-capacity queue backed by a ring buffer
pub type FixedSizeQueue<T> = EventQueue<T, RingBuffer<T>>;

struct QueueState<B> {
    buffer: B,
    /// Slots promised to prepared enqueues that are not yet committed
    reserve: usize,
}

/// Thread-safe FIFO queue implementing both [`Sink`] and [`Source`]
///
/// Invariant: for a bounded queue, `size() + reserve <= capacity` at every
/// instant the lock is released.
///
/// # Example
///
/// ```rust
/// use seda::queue::api::{FixedSizeQueue, Sink, Source};
///
/// let queue = FixedSizeQueue::new("stage-1", 3);
/// queue.enqueue_batch(vec!['A', 'B', 'C']).unwrap();
/// assert!(queue.enqueue('D').unwrap_err().is_full());
///
/// assert_eq!(queue.dequeue(), Some('A'));
/// queue.enqueue('D').unwrap();
/// assert_eq!(queue.dequeue_all(), vec!['B', 'C', 'D']);
/// ```
pub struct EventQueue<T, B> {
    name: String,
    state: Mutex<QueueState<B>>,
    available: Condvar,
    timeout: RwLock<Duration>,
    predicate: RwLock<Option<Arc<dyn EnqueuePredicate<T>>>>,
    interceptor: RwLock<Arc<dyn DequeueInterceptor<T>>>,
}

impl<T: Send, B: Buffer<T>> EventQueue<T, B> {
    /// Create a queue over an explicit buffer
    pub fn with_buffer(name: impl Into<String>, buffer: B) -> Self {
        Self {
            name: name.into(),
            state: Mutex::new(QueueState { buffer, reserve: 0 }),
            available: Condvar::new(),
            timeout: RwLock::new(Duration::ZERO),
            predicate: RwLock::new(None),
            interceptor: RwLock::new(Arc::new(NullDequeueInterceptor)),
        }
    }

    /// Builder-style variant of [`Source::set_timeout`]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        *self.timeout.write() = timeout;
        self
    }

    /// Builder-style variant of [`Sink::set_enqueue_predicate`]
    pub fn with_predicate(self, predicate: Arc<dyn EnqueuePredicate<T>>) -> Self {
        *self.predicate.write() = Some(predicate);
        self
    }

    /// Slots currently held by uncommitted prepared enqueues
    pub fn reserved(&self) -> usize {
        self.state.lock().reserve
    }

    /// Returns the predicate that accepted, so a later capacity refusal can
    /// be handed back to it
    fn admit(&self, elements: &[T]) -> QueueResult<Option<Arc<dyn EnqueuePredicate<T>>>> {
        let Some(predicate) = self.enqueue_predicate() else {
            return Ok(None);
        };
        let accepted = match elements {
            [element] => predicate.accept(element, self),
            _ => predicate.accept_batch(elements, self),
        };
        if accepted {
            Ok(Some(predicate))
        } else {
            log::trace!(
                "Queue '{}': predicate rejected {} element(s)",
                self.name,
                elements.len()
            );
            Err(SinkError::Rejected {
                count: elements.len(),
            })
        }
    }

    /// Hand a capacity refusal back to the predicate that accepted the
    /// elements; runs after the queue lock is released
    fn settle(
        admission: QueueResult<()>,
        admitted_by: Option<Arc<dyn EnqueuePredicate<T>>>,
        count: usize,
    ) -> QueueResult<()> {
        if admission.is_err() {
            if let Some(predicate) = admitted_by {
                predicate.refund(count);
            }
        }
        admission
    }

    fn check_capacity(&self, state: &QueueState<B>, requested: usize) -> QueueResult<()> {
        if let Some(capacity) = state.buffer.limit() {
            let taken = state.buffer.len() + state.reserve;
            if requested + taken > capacity {
                log::trace!(
                    "Queue '{}': cannot admit {} element(s), {}/{} slot(s) taken",
                    self.name,
                    requested,
                    taken,
                    capacity
                );
                return Err(SinkError::Full {
                    requested,
                    available: capacity.saturating_sub(taken),
                    capacity,
                });
            }
        }
        Ok(())
    }

    /// Acquire the lock for a dequeue, bounded by the configured timeout.
    /// A zero timeout blocks on the lock, which is only ever held briefly.
    fn lock_for_dequeue(&self, deadline: Option<Instant>) -> Option<MutexGuard<'_, QueueState<B>>> {
        match deadline {
            None => Some(self.state.lock()),
            Some(deadline) => self.state.try_lock_until(deadline),
        }
    }

    fn wait_for_elements(&self, state: &mut MutexGuard<'_, QueueState<B>>, deadline: Option<Instant>) {
        let Some(deadline) = deadline else {
            return;
        };
        while state.buffer.is_empty() {
            if self.available.wait_until(state, deadline).timed_out() {
                break;
            }
        }
    }

    fn deadline(&self) -> Option<Instant> {
        let timeout = self.timeout();
        if timeout.is_zero() {
            None
        } else {
            Some(Instant::now() + timeout)
        }
    }

    fn intercepted<R>(&self, dequeue: impl FnOnce() -> R) -> R {
        let interceptor = self.dequeue_interceptor();
        interceptor.before(self);
        let result = dequeue();
        interceptor.after(self);
        result
    }

    fn drain(state: &mut QueueState<B>, count: usize) -> Vec<T> {
        let count = count.min(state.buffer.len());
        let mut elements = Vec::with_capacity(count);
        for _ in 0..count {
            match state.buffer.pop_front() {
                Some(element) => elements.push(element),
                None => break,
            }
        }
        elements
    }
}

impl<T: Send> EventQueue<T, GrowableBuffer<T>> {
    pub fn unbounded(name: impl Into<String>) -> Self {
        Self::with_buffer(name, GrowableBuffer::unbounded())
    }

    /// A capacity of zero means unbounded.
    pub fn bounded(name: impl Into<String>, capacity: usize) -> Self {
        Self::with_buffer(name, GrowableBuffer::bounded(capacity))
    }

    /// Build from configuration, where a negative capacity means unbounded
    pub fn from_settings(name: impl Into<String>, settings: &QueueSettings) -> Self {
        let buffer = match settings.capacity() {
            Some(capacity) => GrowableBuffer::bounded(capacity),
            None => GrowableBuffer::unbounded(),
        };
        Self::with_buffer(name, buffer).with_timeout(settings.dequeue_timeout())
    }
}

impl<T: Send> EventQueue<T, RingBuffer<T>> {
    /// # Panics
    ///
    /// Panics if `capacity` is zero; a fixed-size queue must be bounded.
    pub fn new(name: impl Into<String>, capacity: usize) -> Self {
        Self::with_buffer(name, RingBuffer::with_capacity(capacity))
    }
}

impl<T: Send, B: Buffer<T>> QueueInfo for EventQueue<T, B> {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> usize {
        self.state.lock().buffer.len()
    }
}

impl<T: Send, B: Buffer<T>> Sink<T> for EventQueue<T, B> {
    fn enqueue(&self, element: T) -> QueueResult<()> {
        let admitted_by = self.admit(std::slice::from_ref(&element))?;
        let admission = {
            let mut state = self.state.lock();
            self.check_capacity(&state, 1)
                .map(|()| state.buffer.push_back(element))
        };
        Self::settle(admission, admitted_by, 1)?;
        self.available.notify_one();
        Ok(())
    }

    fn enqueue_batch(&self, elements: Vec<T>) -> QueueResult<()> {
        if elements.is_empty() {
            return Ok(());
        }
        let count = elements.len();
        let admitted_by = self.admit(&elements)?;
        let admission = {
            let mut state = self.state.lock();
            self.check_capacity(&state, count).map(|()| {
                for element in elements {
                    state.buffer.push_back(element);
                }
            })
        };
        Self::settle(admission, admitted_by, count)?;
        self.available.notify_all();
        Ok(())
    }

    fn try_enqueue(&self, element: T) -> bool {
        self.enqueue(element).is_ok()
    }

    fn prepare_enqueue(&self, elements: Vec<T>) -> QueueResult<PreparedEnqueue<'_, T>> {
        let count = elements.len();
        let admitted_by = self.admit(&elements)?;
        let admission = {
            let mut state = self.state.lock();
            self.check_capacity(&state, count)
                .map(|()| state.reserve += count)
        };
        Self::settle(admission, admitted_by, count)?;
        Ok(PreparedEnqueue::new(self, elements))
    }

    fn max_size(&self) -> Option<usize> {
        self.state.lock().buffer.limit()
    }

    fn can_accept(&self) -> Option<usize> {
        let state = self.state.lock();
        state
            .buffer
            .limit()
            .map(|capacity| capacity.saturating_sub(state.buffer.len() + state.reserve))
    }

    fn set_enqueue_predicate(&self, predicate: Option<Arc<dyn EnqueuePredicate<T>>>) {
        *self.predicate.write() = predicate;
    }

    fn enqueue_predicate(&self) -> Option<Arc<dyn EnqueuePredicate<T>>> {
        self.predicate.read().clone()
    }
}

impl<T: Send, B: Buffer<T>> Source<T> for EventQueue<T, B> {
    fn dequeue(&self) -> Option<T> {
        self.intercepted(|| {
            let deadline = self.deadline();
            let mut state = self.lock_for_dequeue(deadline)?;
            self.wait_for_elements(&mut state, deadline);
            state.buffer.pop_front()
        })
    }

    fn dequeue_up_to(&self, count: usize) -> Vec<T> {
        if count == 0 {
            return Vec::new();
        }
        self.intercepted(|| {
            let deadline = self.deadline();
            match self.lock_for_dequeue(deadline) {
                Some(mut state) => {
                    self.wait_for_elements(&mut state, deadline);
                    Self::drain(&mut state, count)
                }
                None => Vec::new(),
            }
        })
    }

    fn dequeue_all(&self) -> Vec<T> {
        self.intercepted(|| match self.lock_for_dequeue(self.deadline()) {
            Some(mut state) => {
                let count = state.buffer.len();
                Self::drain(&mut state, count)
            }
            None => Vec::new(),
        })
    }

    fn timeout(&self) -> Duration {
        *self.timeout.read()
    }

    fn set_timeout(&self, timeout: Duration) {
        *self.timeout.write() = timeout;
    }

    fn set_dequeue_interceptor(&self, interceptor: Arc<dyn DequeueInterceptor<T>>) {
        *self.interceptor.write() = interceptor;
    }

    fn dequeue_interceptor(&self) -> Arc<dyn DequeueInterceptor<T>> {
        self.interceptor.read().clone()
    }
}

impl<T: Send, B: Buffer<T>> Reservation<T> for EventQueue<T, B> {
    fn commit_reserved(&self, elements: Vec<T>) {
        {
            let mut state = self.state.lock();
            debug_assert!(state.reserve >= elements.len(), "reserve underflow");
            state.reserve = state.reserve.saturating_sub(elements.len());
            for element in elements {
                state.buffer.push_back(element);
            }
        }
        self.available.notify_all();
    }

    fn release_reserved(&self, count: usize) {
        let mut state = self.state.lock();
        debug_assert!(state.reserve >= count, "reserve underflow");
        state.reserve = state.reserve.saturating_sub(count);
    }

    fn reservation_owner(&self) -> &str {
        &self.name
    }
}

impl<T, B> std::fmt::Debug for EventQueue<T, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventQueue")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
