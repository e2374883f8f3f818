//! Immediate, delayed and repeated command tests

#[cfg(test)]
mod tests {
    use crate::command::api::{CommandElement, CommandManager, DelayedCommand, RepeatedCommand};
    use crate::core::time::MockClock;
    use crate::pipeline::api::{EventHandler, HandlerResult, PipelineRunner};
    use crate::queue::api::{QueueInfo, Sink};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn counting(counter: &Arc<AtomicUsize>) -> impl FnMut() -> HandlerResult + Send + 'static {
        let counter = Arc::clone(counter);
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn manager_with_clock() -> (Arc<CommandManager>, MockClock) {
        let clock = MockClock::new();
        let manager = Arc::new(CommandManager::with_clock(Arc::new(clock.clone())));
        (manager, clock)
    }

    #[test]
    fn test_plain_commands_run_in_order() {
        let (manager, _clock) = manager_with_clock();
        let order = Arc::new(parking_lot::Mutex::new(Vec::new()));

        for i in 0..3 {
            let order = Arc::clone(&order);
            manager
                .command_queue()
                .enqueue(CommandElement::command(move || -> HandlerResult {
                    order.lock().push(i);
                    Ok(())
                }))
                .unwrap();
        }

        assert_eq!(PipelineRunner::new(manager.clone()).run(), 3);
        assert_eq!(*order.lock(), vec![0, 1, 2]);
    }

    #[test]
    fn test_failing_and_panicking_commands_are_swallowed() {
        let (manager, _clock) = manager_with_clock();
        let counter = Arc::new(AtomicUsize::new(0));
        let sink = manager.command_queue();

        sink.enqueue(CommandElement::command(|| -> HandlerResult {
            Err("refused".into())
        }))
        .unwrap();
        sink.enqueue(CommandElement::command(|| -> HandlerResult {
            panic!("command bug")
        }))
        .unwrap();
        sink.enqueue(CommandElement::command(counting(&counter))).unwrap();

        PipelineRunner::new(manager.clone()).run();
        // Should keep going past both failures
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_delayed_command_waits_for_its_time() {
        let (manager, clock) = manager_with_clock();
        let counter = Arc::new(AtomicUsize::new(0));
        let runner = PipelineRunner::new(manager.clone());

        manager
            .command_queue()
            .enqueue(
                DelayedCommand::new(counting(&counter), Duration::from_millis(50)).into(),
            )
            .unwrap();

        runner.run();
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert_eq!(manager.deferred_count(), 1);

        clock.advance(Duration::from_millis(49));
        runner.run();
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        clock.advance(Duration::from_millis(1));
        runner.run();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(manager.deferred_count(), 0);
    }

    #[test]
    fn test_zero_delay_runs_in_same_pass() {
        let (manager, _clock) = manager_with_clock();
        let counter = Arc::new(AtomicUsize::new(0));

        manager
            .handle_event(DelayedCommand::new(counting(&counter), Duration::ZERO).into())
            .unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(manager.deferred_count(), 0);
    }

    #[test]
    fn test_repeated_command_honours_repeat_budget() {
        let (manager, clock) = manager_with_clock();
        let counter = Arc::new(AtomicUsize::new(0));
        let runner = PipelineRunner::new(manager.clone());

        manager
            .command_queue()
            .enqueue(
                RepeatedCommand::new(
                    counting(&counter),
                    Duration::ZERO,
                    Duration::from_millis(100),
                    2,
                )
                .into(),
            )
            .unwrap();

        runner.run();
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        // Not yet due
        clock.advance(Duration::from_millis(60));
        runner.run();
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        clock.advance(Duration::from_millis(40));
        runner.run();
        assert_eq!(counter.load(Ordering::SeqCst), 2);

        clock.advance(Duration::from_millis(100));
        runner.run();
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert_eq!(manager.deferred_count(), 0);

        clock.advance(Duration::from_millis(100));
        runner.run();
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_unlimited_repeats_stay_deferred() {
        let (manager, clock) = manager_with_clock();
        let counter = Arc::new(AtomicUsize::new(0));
        let runner = PipelineRunner::new(manager.clone());

        manager
            .command_queue()
            .enqueue(
                RepeatedCommand::new(
                    counting(&counter),
                    Duration::from_millis(10),
                    Duration::from_millis(10),
                    0,
                )
                .into(),
            )
            .unwrap();

        runner.run();
        for _ in 0..5 {
            clock.advance(Duration::from_millis(10));
            runner.run();
        }

        assert_eq!(counter.load(Ordering::SeqCst), 5);
        assert_eq!(manager.deferred_count(), 1);
    }

    #[test]
    fn test_dispose_handles_queued_elements() {
        let (manager, _clock) = manager_with_clock();
        let counter = Arc::new(AtomicUsize::new(0));
        let sink = manager.command_queue();

        sink.enqueue(CommandElement::command(counting(&counter))).unwrap();
        sink.enqueue(CommandElement::command(counting(&counter))).unwrap();
        sink.enqueue(DelayedCommand::new(counting(&counter), Duration::from_secs(60)).into())
            .unwrap();

        manager.dispose();
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert_eq!(sink.size(), 0);
        // Commands that never came due are dropped
        assert_eq!(manager.deferred_count(), 0);
    }

    #[test]
    fn test_element_kinds() {
        let delayed: CommandElement =
            DelayedCommand::new(|| -> HandlerResult { Ok(()) }, Duration::from_millis(5)).into();
        let repeated = RepeatedCommand::new(
            || -> HandlerResult { Ok(()) },
            Duration::ZERO,
            Duration::from_millis(5),
            3,
        );

        assert_eq!(delayed.kind(), "delayed command");
        assert_eq!(repeated.repeats(), 3);
        assert_eq!(repeated.interval(), Duration::from_millis(5));
        assert_eq!(CommandElement::from(repeated).kind(), "repeated command");
    }
}
