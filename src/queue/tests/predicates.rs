//! Enqueue predicate tests

#[cfg(test)]
mod tests {
    use crate::core::time::MockClock;
    use crate::queue::api::{
        DefaultQueue, EnqueuePredicate, FixedSizeQueue, NullEnqueuePredicate, QueueInfo,
        RateLimitingPredicate, Sink, SinkError, Source, ThresholdEnqueuePredicate,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    struct RejectAll;

    impl<T> EnqueuePredicate<T> for RejectAll {
        fn accept(&self, _element: &T, _sink: &dyn Sink<T>) -> bool {
            false
        }
    }

    #[test]
    fn test_always_rejecting_predicate_blocks_every_path() {
        let queue = DefaultQueue::unbounded("closed").with_predicate(Arc::new(RejectAll));

        assert_eq!(queue.enqueue(1), Err(SinkError::Rejected { count: 1 }));
        assert!(!queue.try_enqueue(2));
        assert_eq!(
            queue.enqueue_batch(vec![3, 4]),
            Err(SinkError::Rejected { count: 2 })
        );
        assert!(queue.prepare_enqueue(vec![5]).is_err());

        // Should never change size regardless of free capacity
        assert_eq!(queue.size(), 0);
        assert_eq!(queue.reserved(), 0);
    }

    #[test]
    fn test_predicate_runs_before_capacity_check() {
        let queue = FixedSizeQueue::new("order", 1);
        queue.enqueue(0).unwrap();
        queue.set_enqueue_predicate(Some(Arc::new(RejectAll)));

        // Full queue, but the predicate answers first
        let err = queue.enqueue(1).unwrap_err();
        assert!(matches!(err, SinkError::Rejected { .. }));
    }

    #[test]
    fn test_removing_predicate_restores_admission() {
        let queue = DefaultQueue::unbounded("toggle");
        queue.set_enqueue_predicate(Some(Arc::new(RejectAll)));
        assert!(queue.enqueue(1).is_err());

        queue.set_enqueue_predicate(None);
        assert!(queue.enqueue_predicate().is_none());
        queue.enqueue(1).unwrap();
    }

    #[test]
    fn test_predicate_sees_sink_state() {
        struct EvenSizeOnly(AtomicUsize);

        impl EnqueuePredicate<u32> for EvenSizeOnly {
            fn accept(&self, _element: &u32, sink: &dyn Sink<u32>) -> bool {
                self.0.fetch_add(1, Ordering::SeqCst);
                sink.size() % 2 == 0
            }
        }

        let predicate = Arc::new(EvenSizeOnly(AtomicUsize::new(0)));
        let queue = DefaultQueue::unbounded("even").with_predicate(predicate.clone());

        assert!(queue.try_enqueue(1));
        assert!(!queue.try_enqueue(2));
        assert_eq!(predicate.0.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_null_predicate_accepts_everything() {
        let queue = FixedSizeQueue::new("null", 2).with_predicate(Arc::new(NullEnqueuePredicate));

        queue.enqueue_batch(vec![1, 2]).unwrap();
        // Capacity still applies
        assert!(queue.enqueue(3).unwrap_err().is_full());
    }

    #[test]
    fn test_threshold_predicate() {
        let queue =
            DefaultQueue::unbounded("threshold").with_predicate(Arc::new(ThresholdEnqueuePredicate::new(3)));

        queue.enqueue_batch(vec![1, 2]).unwrap();
        assert!(queue.enqueue_batch(vec![3, 4]).is_err());
        queue.enqueue(3).unwrap();
        assert!(!queue.try_enqueue(4));
        assert_eq!(queue.size(), 3);
    }

    #[test]
    fn test_rate_limiting_predicate_refills_over_time() {
        let clock = MockClock::new();
        let predicate = Arc::new(RateLimitingPredicate::with_clock(
            2,
            Duration::from_secs(1),
            2,
            Arc::new(clock.clone()),
        ));
        let queue = DefaultQueue::unbounded("rate").with_predicate(predicate.clone());

        // Bucket starts full with a burst of two
        queue.enqueue_batch(vec![1, 2]).unwrap();
        assert!(!queue.try_enqueue(3));

        clock.advance(Duration::from_millis(500));
        assert!(queue.try_enqueue(3));
        assert!(!queue.try_enqueue(4));

        // Refill never exceeds the burst depth
        clock.advance(Duration::from_secs(10));
        assert!(queue.enqueue_batch(vec![4, 5, 6]).is_err());
        queue.enqueue_batch(vec![4, 5]).unwrap();

        assert_eq!(queue.size(), 5);
        assert_eq!(predicate.rejected_count(), 5);
    }

    #[test]
    fn test_full_queue_does_not_spend_rate_tokens() {
        let clock = MockClock::new();
        let predicate = Arc::new(RateLimitingPredicate::with_clock(
            1,
            Duration::from_secs(60),
            3,
            Arc::new(clock.clone()),
        ));
        let queue = DefaultQueue::bounded("narrow", 1).with_predicate(predicate.clone());

        queue.enqueue(1).unwrap();
        assert!(queue.enqueue(2).unwrap_err().is_full());
        assert!(queue.enqueue(3).unwrap_err().is_full());
        assert!(queue.dequeue().is_some());

        // Only the first element used a token; two of three remain
        queue.enqueue(4).unwrap();
        queue.dequeue();
        queue.enqueue(5).unwrap();
        queue.dequeue();
        assert_eq!(queue.enqueue(6), Err(SinkError::Rejected { count: 1 }));
        assert_eq!(predicate.rejected_count(), 1);
    }

    #[test]
    fn test_refused_batch_returns_every_token() {
        let clock = MockClock::new();
        let predicate = Arc::new(RateLimitingPredicate::with_clock(
            1,
            Duration::from_secs(60),
            4,
            Arc::new(clock.clone()),
        ));
        let queue = FixedSizeQueue::new("batch", 2).with_predicate(predicate.clone());

        assert!(queue.enqueue_batch(vec![1, 2, 3]).unwrap_err().is_full());
        assert!(queue.prepare_enqueue(vec![1, 2, 3]).is_err());

        // Full bucket still covers two batches of two
        queue.enqueue_batch(vec![1, 2]).unwrap();
        assert_eq!(queue.dequeue_all(), vec![1, 2]);
        queue.enqueue_batch(vec![3, 4]).unwrap();
        assert_eq!(queue.size(), 2);
        assert_eq!(predicate.rejected_count(), 0);
    }

    #[test]
    #[should_panic(expected = "non-zero")]
    fn test_rate_limiting_requires_interval() {
        let _predicate = RateLimitingPredicate::new(1, Duration::ZERO, 1);
    }
}
