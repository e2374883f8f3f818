//! Backing stores for [`EventQueue`](crate::queue::api::EventQueue)
//!
//! The queue owns all locking and admission bookkeeping; a buffer is a plain
//! FIFO that is only ever touched while the queue's lock is held.

use std::collections::VecDeque;

/// FIFO storage used underneath a queue
pub trait Buffer<T>: Send {
    /// Number of elements stored
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of elements, `None` when unbounded
    fn limit(&self) -> Option<usize>;

    /// Append at the tail. Callers check [`Buffer::limit`] first.
    fn push_back(&mut self, element: T);

    fn pop_front(&mut self) -> Option<T>;
}

/// Resizable buffer backed by a `VecDeque`, optionally bounded
#[derive(Debug)]
pub struct GrowableBuffer<T> {
    elements: VecDeque<T>,
    limit: Option<usize>,
}

impl<T> GrowableBuffer<T> {
    pub fn unbounded() -> Self {
        Self {
            elements: VecDeque::new(),
            limit: None,
        }
    }

    /// A limit of zero is treated as unbounded.
    pub fn bounded(limit: usize) -> Self {
        if limit == 0 {
            return Self::unbounded();
        }
        Self {
            elements: VecDeque::with_capacity(limit),
            limit: Some(limit),
        }
    }
}

impl<T: Send> Buffer<T> for GrowableBuffer<T> {
    fn len(&self) -> usize {
        self.elements.len()
    }

    fn limit(&self) -> Option<usize> {
        self.limit
    }

    fn push_back(&mut self, element: T) {
        self.elements.push_back(element);
    }

    fn pop_front(&mut self) -> Option<T> {
        self.elements.pop_front()
    }
}

/// Fixed-capacity circular buffer
///
/// The slot array holds `capacity + 1` entries so that `start == end` always
/// means empty and a full buffer leaves exactly one slot unused. The length
/// is derived from the two indices alone.
#[derive(Debug)]
pub struct RingBuffer<T> {
    slots: Box<[Option<T>]>,
    start: usize,
    end: usize,
}

impl<T> RingBuffer<T> {
    /// # Panics
    ///
    /// Panics if `capacity` is zero; a ring buffer cannot be unbounded.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "Cannot create an unbounded ring buffer");
        let slots = (0..=capacity).map(|_| None).collect::<Vec<_>>();
        Self {
            slots: slots.into_boxed_slice(),
            start: 0,
            end: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len() - 1
    }

    fn advance(&self, index: usize) -> usize {
        let next = index + 1;
        if next >= self.slots.len() {
            0
        } else {
            next
        }
    }
}

impl<T: Send> Buffer<T> for RingBuffer<T> {
    fn len(&self) -> usize {
        if self.end < self.start {
            self.slots.len() - self.start + self.end
        } else {
            self.end - self.start
        }
    }

    fn limit(&self) -> Option<usize> {
        Some(self.capacity())
    }

    fn push_back(&mut self, element: T) {
        debug_assert!(self.len() < self.capacity(), "ring buffer overflow");
        self.slots[self.end] = Some(element);
        self.end = self.advance(self.end);
    }

    fn pop_front(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        let element = self.slots[self.start].take();
        self.start = self.advance(self.start);
        element
    }
}
