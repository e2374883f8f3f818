//! Sample stage graph driven by the binary
//!
//! ```text
//! producer ─▶ ingest (ring buffer) ─▶ square ─▶ results (unbounded) ─▶ total
//!
//! commands: heartbeat (repeated) ─▶ Heartbeat signal ─▶ progress log
//! ```

use crate::command::api::{CommandElement, CommandManager, RepeatedCommand, Signal};
use crate::core::config::SedaConfig;
use crate::core::retry::{retry_with_policy, RetryPolicy};
use crate::pipeline::api::{EventHandler, HandlerError, HandlerResult, SimplePipeline};
use crate::queue::api::{DefaultQueue, FixedSizeQueue, Sink, Source};
use crate::scheduler::api::ThreadManager;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Ingest capacity when the configuration leaves queues unbounded
pub const DEFAULT_INGEST_CAPACITY: usize = 256;

const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(100);
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Outcome of one demo run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DemoSummary {
    /// Events accepted by the ingest stage
    pub produced: usize,
    /// Events the ingest stage refused even after retrying
    pub rejected: usize,
    /// Events that reached the final stage
    pub processed: usize,
    /// Sum of the squares computed by the graph
    pub total: u64,
    pub heartbeats: usize,
    pub elapsed: Duration,
}

impl DemoSummary {
    pub fn is_complete(&self) -> bool {
        self.processed == self.produced
    }
}

/// Broadcast by the heartbeat command
#[derive(Debug)]
pub struct Heartbeat {
    pub beat: usize,
    pub processed: usize,
}

impl Signal for Heartbeat {}

/// First stage: squares each value and hands the batch on
struct Square {
    next: Arc<dyn Sink<u64>>,
}

fn square(n: u64) -> Result<u64, HandlerError> {
    n.checked_mul(n)
        .ok_or_else(|| format!("{} squared does not fit in 64 bits", n).into())
}

impl EventHandler<u64> for Square {
    fn handle_event(&self, event: u64) -> HandlerResult {
        self.next.enqueue(square(event)?)?;
        Ok(())
    }

    /// Forwards every square that fits, then reports the first overflow
    fn handle_events(&self, events: Vec<u64>) -> HandlerResult {
        if events.is_empty() {
            return Ok(());
        }
        let mut squares = Vec::with_capacity(events.len());
        let mut overflow = None;
        for event in events {
            match square(event) {
                Ok(squared) => squares.push(squared),
                Err(e) => {
                    overflow.get_or_insert(e);
                }
            }
        }
        if !squares.is_empty() {
            self.next.enqueue_batch(squares)?;
        }
        overflow.map_or(Ok(()), Err)
    }
}

/// Final stage: accumulates what arrives; the sum saturates at `u64::MAX`
#[derive(Default)]
struct Total {
    count: AtomicUsize,
    sum: Mutex<u64>,
}

impl EventHandler<u64> for Total {
    fn handle_event(&self, event: u64) -> HandlerResult {
        self.count.fetch_add(1, Ordering::SeqCst);
        let mut sum = self.sum.lock();
        *sum = sum.saturating_add(event);
        Ok(())
    }
}

/// Build the graph, push `events` values through it and tear it down
///
/// Waits at most `duration` for the graph to finish after producing; events
/// still queued at that point are delivered by the final drain on
/// deregistration.
pub fn run_demo(config: &SedaConfig, events: usize, duration: Duration) -> DemoSummary {
    let start = Instant::now();
    let capacity = config.queue.capacity().unwrap_or(DEFAULT_INGEST_CAPACITY);

    let ingest = Arc::new(
        FixedSizeQueue::<u64>::new("ingest", capacity).with_timeout(config.queue.dequeue_timeout()),
    );
    let results = Arc::new(DefaultQueue::<u64>::unbounded("results"));
    let total = Arc::new(Total::default());

    let square = Arc::new(SimplePipeline::new(
        "square",
        vec![ingest.clone() as Arc<dyn Source<u64>>],
        Arc::new(Square {
            next: results.clone(),
        }),
    ));
    let summing = Arc::new(SimplePipeline::new(
        "total",
        vec![results.clone() as Arc<dyn Source<u64>>],
        total.clone(),
    ));

    let commands = Arc::new(CommandManager::new());
    let heartbeats = Arc::new(AtomicUsize::new(0));
    commands.register_signal_handler::<Heartbeat, _>(Arc::new(|signal: &Heartbeat| {
        log::info!(
            "Heartbeat {}: {} event(s) processed",
            signal.beat,
            signal.processed
        )
    }));
    let heartbeat = {
        let sink = commands.command_queue();
        let beats = heartbeats.clone();
        let total = total.clone();
        move || -> HandlerResult {
            let beat = beats.fetch_add(1, Ordering::SeqCst) + 1;
            sink.enqueue(CommandElement::signal(Heartbeat {
                beat,
                processed: total.count.load(Ordering::SeqCst),
            }))?;
            Ok(())
        }
    };
    if let Err(e) = commands
        .command_queue()
        .enqueue(RepeatedCommand::new(heartbeat, Duration::ZERO, HEARTBEAT_INTERVAL, 0).into())
    {
        log::warn!("Heartbeat not scheduled: {}", e);
    }

    let manager = ThreadManager::from_settings(&config.scheduler);
    manager.register(square.clone());
    manager.register(summing.clone());
    manager.register(commands.clone());

    let policy = RetryPolicy {
        max_attempts: 5,
        delay: POLL_INTERVAL,
    };
    let mut produced = 0;
    let mut rejected = 0;
    for value in 0..events as u64 {
        match retry_with_policy("ingest", &policy, || ingest.enqueue(value)) {
            Ok(()) => produced += 1,
            Err(e) => {
                log::warn!("Dropping event {}: {}", value, e);
                rejected += 1;
            }
        }
    }
    log::debug!("Produced {} event(s), {} rejected", produced, rejected);

    let deadline = start + duration;
    while total.count.load(Ordering::SeqCst) < produced && Instant::now() < deadline {
        thread::sleep(POLL_INTERVAL);
    }

    // Upstream first so the final drain of each stage feeds the next
    manager.deregister(&square);
    manager.deregister(&summing);
    manager.deregister(&commands);
    commands.dispose();
    manager.dispose();

    let summary = DemoSummary {
        produced,
        rejected,
        processed: total.count.load(Ordering::SeqCst),
        total: *total.sum.lock(),
        heartbeats: heartbeats.load(Ordering::SeqCst),
        elapsed: start.elapsed(),
    };
    summary
}
