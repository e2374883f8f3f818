//! Signal dispatch and handler registration tests

#[cfg(test)]
mod tests {
    use crate::command::api::{CommandElement, CommandManager, Signal, SignalHandler};
    use crate::pipeline::api::PipelineRunner;
    use crate::queue::api::Sink;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Debug)]
    struct Tick(u32);
    impl Signal for Tick {}

    #[derive(Debug)]
    struct Shutdown;
    impl Signal for Shutdown {}

    #[derive(Default)]
    struct TickLog {
        seen: Mutex<Vec<(&'static str, u32)>>,
    }

    struct Named {
        name: &'static str,
        log: Arc<TickLog>,
    }

    impl SignalHandler<Tick> for Named {
        fn handle_signal(&self, signal: &Tick) {
            self.log.seen.lock().push((self.name, signal.0));
        }
    }

    fn send(manager: &Arc<CommandManager>, signal: impl Signal) {
        manager
            .command_queue()
            .enqueue(CommandElement::signal(signal))
            .unwrap();
        PipelineRunner::new(manager.clone()).run();
    }

    #[test]
    fn test_handlers_invoked_in_registration_order() {
        let manager = Arc::new(CommandManager::new());
        let log = Arc::new(TickLog::default());

        for name in ["first", "second"] {
            let handler = Arc::new(Named {
                name,
                log: log.clone(),
            });
            assert!(manager.register_signal_handler::<Tick, _>(handler));
        }

        send(&manager, Tick(7));
        assert_eq!(*log.seen.lock(), vec![("first", 7), ("second", 7)]);
    }

    #[test]
    fn test_dispatch_is_by_concrete_type() {
        let manager = Arc::new(CommandManager::new());
        let log = Arc::new(TickLog::default());
        manager.register_signal_handler::<Tick, _>(Arc::new(Named {
            name: "tick",
            log: log.clone(),
        }));

        // No listener for this type: silently ignored
        send(&manager, Shutdown);
        assert!(log.seen.lock().is_empty());

        send(&manager, Tick(1));
        assert_eq!(log.seen.lock().len(), 1);
    }

    #[test]
    fn test_registration_is_idempotent() {
        let manager = Arc::new(CommandManager::new());
        let log = Arc::new(TickLog::default());
        let handler = Arc::new(Named {
            name: "once",
            log: log.clone(),
        });

        assert!(manager.register_signal_handler::<Tick, _>(handler.clone()));
        assert!(!manager.register_signal_handler::<Tick, _>(handler.clone()));
        assert_eq!(manager.signal_handler_count::<Tick>(), 1);

        send(&manager, Tick(3));
        assert_eq!(log.seen.lock().len(), 1);
    }

    #[test]
    fn test_deregistering_last_handler_removes_type() {
        let manager = Arc::new(CommandManager::new());
        let log = Arc::new(TickLog::default());
        let handler = Arc::new(Named {
            name: "gone",
            log: log.clone(),
        });

        manager.register_signal_handler::<Tick, _>(handler.clone());
        assert!(manager.deregister_signal_handler::<Tick, _>(&handler));
        assert!(!manager.deregister_signal_handler::<Tick, _>(&handler));
        assert_eq!(manager.signal_handler_count::<Tick>(), 0);

        send(&manager, Tick(4));
        assert!(log.seen.lock().is_empty());
    }

    #[test]
    fn test_closure_handlers_and_panics() {
        let manager = Arc::new(CommandManager::new());
        let seen = Arc::new(Mutex::new(Vec::new()));

        manager.register_signal_handler::<Tick, _>(Arc::new(|_: &Tick| {
            panic!("listener bug");
        }));
        let recorder = {
            let seen = seen.clone();
            Arc::new(move |tick: &Tick| seen.lock().push(tick.0))
        };
        manager.register_signal_handler::<Tick, _>(recorder);

        // A panicking listener does not stop the next one
        send(&manager, Tick(9));
        assert_eq!(*seen.lock(), vec![9]);
    }
}
