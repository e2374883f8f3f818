//! Stock enqueue predicates
//!
//! Predicates run in the producer's thread ahead of the capacity check, so
//! each of these does a constant amount of work and never blocks.

use crate::core::time::{Clock, SystemClock};
use crate::queue::traits::{EnqueuePredicate, Sink};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Accepts everything; equivalent to installing no predicate
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEnqueuePredicate;

impl<T> EnqueuePredicate<T> for NullEnqueuePredicate {
    fn accept(&self, _element: &T, _sink: &dyn Sink<T>) -> bool {
        true
    }

    fn accept_batch(&self, _elements: &[T], _sink: &dyn Sink<T>) -> bool {
        true
    }
}

/// Rejects admission once the sink would hold more than `threshold` elements
///
/// Useful on unbounded queues to shed load well before memory becomes the
/// limit, or on bounded queues to keep headroom for prepared enqueues.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdEnqueuePredicate {
    threshold: usize,
}

impl ThresholdEnqueuePredicate {
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }
}

impl<T> EnqueuePredicate<T> for ThresholdEnqueuePredicate {
    fn accept(&self, _element: &T, sink: &dyn Sink<T>) -> bool {
        sink.size() < self.threshold
    }

    fn accept_batch(&self, elements: &[T], sink: &dyn Sink<T>) -> bool {
        sink.size() + elements.len() <= self.threshold
    }
}

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Token-bucket admission: at most `rate` elements per `interval` on
/// average, with bursts of up to `depth` elements.
///
/// A batch is admitted only if the bucket holds a token for every element;
/// a rejected batch consumes nothing. Tokens taken for elements the queue
/// then refuses as full are returned to the bucket.
pub struct RateLimitingPredicate {
    rate: u32,
    interval: Duration,
    depth: u32,
    bucket: Mutex<Bucket>,
    clock: Arc<dyn Clock>,
    rejected: AtomicU64,
}

impl RateLimitingPredicate {
    /// Bucket starts full
    ///
    /// # Panics
    ///
    /// Panics if `interval` is zero.
    pub fn new(rate: u32, interval: Duration, depth: u32) -> Self {
        Self::with_clock(rate, interval, depth, Arc::new(SystemClock))
    }

    pub fn with_clock(rate: u32, interval: Duration, depth: u32, clock: Arc<dyn Clock>) -> Self {
        assert!(!interval.is_zero(), "Rate limiting interval must be non-zero");
        let now = clock.now();
        Self {
            rate,
            interval,
            depth,
            bucket: Mutex::new(Bucket {
                tokens: f64::from(depth),
                last_refill: now,
            }),
            clock,
            rejected: AtomicU64::new(0),
        }
    }

    /// Elements refused since construction
    pub fn rejected_count(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    fn take(&self, count: usize) -> bool {
        let now = self.clock.now();
        let mut bucket = self.bucket.lock();

        let elapsed = now.saturating_duration_since(bucket.last_refill);
        let refill = elapsed.as_secs_f64() / self.interval.as_secs_f64() * f64::from(self.rate);
        bucket.tokens = (bucket.tokens + refill).min(f64::from(self.depth));
        bucket.last_refill = now;

        let wanted = count as f64;
        if bucket.tokens >= wanted {
            bucket.tokens -= wanted;
            true
        } else {
            self.rejected.fetch_add(count as u64, Ordering::Relaxed);
            false
        }
    }

    fn give_back(&self, count: usize) {
        let mut bucket = self.bucket.lock();
        bucket.tokens = (bucket.tokens + count as f64).min(f64::from(self.depth));
    }
}

impl<T> EnqueuePredicate<T> for RateLimitingPredicate {
    fn accept(&self, _element: &T, _sink: &dyn Sink<T>) -> bool {
        self.take(1)
    }

    fn accept_batch(&self, elements: &[T], _sink: &dyn Sink<T>) -> bool {
        self.take(elements.len())
    }

    fn refund(&self, count: usize) {
        self.give_back(count);
    }
}

impl std::fmt::Debug for RateLimitingPredicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimitingPredicate")
            .field("rate", &self.rate)
            .field("interval", &self.interval)
            .field("depth", &self.depth)
            .field("rejected", &self.rejected_count())
            .finish()
    }
}
