//! Batching shipper: submission path, flush loop, and lifecycle.
//!
//! The shipper decouples producer tasks from the remote intake:
//!
//! ```text
//!    Producers (submit)
//!         │
//!         v
//!   ┌───────────────┐
//!   │ BoundedRecord │  (FIFO, capacity = 2 × batch)
//!   │     Queue     │
//!   └───────┬───────┘
//!           │ wake signal
//!           v
//!   ┌───────────────┐
//!   │ Flush worker  │  (single background task)
//!   └───────┬───────┘
//!           │ batches, in order
//!           v
//!   ┌───────────────┐
//!   │     Sink      │
//!   └───────────────┘
//! ```
//!
//! # Load shedding
//!
//! Once the queue holds `ceil(1.5 × max_batch_size)` records, submissions
//! below the configured importance threshold are dropped and counted
//! instead of enqueued. High-severity records keep flowing until the queue
//! is full. Dropped counts are reported through `tracing` on the next
//! flush, never to the producer.
//!
//! # Flush triggering
//!
//! The worker flushes whenever the queue reaches one full batch, or at the
//! latest every `max_flush_interval`. `stop()` forces a final full drain.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::config::Config;
use crate::error::ShipperError;
use crate::queue::BoundedRecordQueue;
use crate::record::Record;
use crate::sink::Sink;

/// Worker lifecycle. The task handle lives exactly as long as `Running`.
enum WorkerState {
    Stopped,
    Running {
        cancel: CancellationToken,
        task: JoinHandle<()>,
    },
}

/// State shared between producers and the flush worker.
struct Shared {
    config: Config,
    queue: BoundedRecordQueue,
    /// Records dropped since the last flush reported them.
    lost: AtomicU64,
    /// "There may be work": a permit of one, re-checked after every wakeup.
    wake: Notify,
    sink: Arc<dyn Sink>,
}

/// Asynchronous batching shipper.
///
/// Cloning is cheap and hands out another producer handle to the same
/// queue and worker. The shipper is created stopped; call [`start`] to
/// spawn the flush worker and [`stop`] to drain and shut it down.
///
/// [`start`]: BatchShipper::start
/// [`stop`]: BatchShipper::stop
#[derive(Clone)]
pub struct BatchShipper {
    shared: Arc<Shared>,
    state: Arc<tokio::sync::Mutex<WorkerState>>,
}

impl BatchShipper {
    /// Creates a stopped shipper for the given sink.
    ///
    /// # Errors
    ///
    /// Returns [`ShipperError::InvalidConfig`] when the configuration is
    /// rejected.
    pub fn new(config: Config, sink: Arc<dyn Sink>) -> Result<Self, ShipperError> {
        config.validate()?;
        let queue = BoundedRecordQueue::with_capacity(config.queue_capacity());
        Ok(BatchShipper {
            shared: Arc::new(Shared {
                config,
                queue,
                lost: AtomicU64::new(0),
                wake: Notify::new(),
                sink,
            }),
            state: Arc::new(tokio::sync::Mutex::new(WorkerState::Stopped)),
        })
    }

    /// Submits a record for shipping.
    ///
    /// Never returns an error: under load the record may be dropped and
    /// counted instead, with the count reported through diagnostics on the
    /// next flush. May wait up to `max_block_time` for queue space when
    /// blocking is configured; otherwise it returns immediately.
    pub async fn submit(&self, record: Record) {
        let shared = &self.shared;

        // Shed low-severity records once the queue overflows its headroom.
        if shared.queue.len() >= shared.config.discard_threshold()
            && record.severity() < shared.config.important_severity
        {
            shared.lost.fetch_add(1, Ordering::Relaxed);
            // The worker may be idle; wake it so it starts draining.
            shared.wake.notify_one();
            return;
        }

        let accepted = match shared.config.max_block_time() {
            Some(budget) => shared.queue.enqueue_within(record, budget).await.is_ok(),
            None => shared.queue.try_enqueue(record).is_ok(),
        };
        if !accepted {
            shared.lost.fetch_add(1, Ordering::Relaxed);
        }

        // A full batch is ready: flush now instead of waiting out the timer.
        if shared.queue.len() >= shared.config.max_batch_size {
            shared.wake.notify_one();
        }
    }

    /// Spawns the flush worker. No effect if it is already running.
    pub async fn start(&self) {
        let mut state = self.state.lock().await;
        if matches!(*state, WorkerState::Running { .. }) {
            return;
        }

        let cancel = CancellationToken::new();
        let shared = Arc::clone(&self.shared);
        let worker_cancel = cancel.clone();
        let task = tokio::spawn(async move {
            run_flush_loop(shared, worker_cancel).await;
        });
        debug!(name = %self.shared.config.name, "flush worker started");

        *state = WorkerState::Running { cancel, task };
    }

    /// Stops the flush worker after a final full drain, then clears the
    /// queue. No effect if it is already stopped.
    ///
    /// Blocks until the worker has terminated; there is no shutdown
    /// timeout. Records the final flush cannot ship are discarded.
    ///
    /// # Errors
    ///
    /// Returns [`ShipperError::WorkerJoin`] when the worker task panicked
    /// or was aborted. The queue is cleared either way.
    pub async fn stop(&self) -> Result<(), ShipperError> {
        let mut state = self.state.lock().await;
        let WorkerState::Running { cancel, task } =
            std::mem::replace(&mut *state, WorkerState::Stopped)
        else {
            return Ok(());
        };

        cancel.cancel();
        self.shared.wake.notify_one();
        let joined = task.await;
        self.shared.queue.clear();
        debug!(name = %self.shared.config.name, "flush worker stopped");
        joined?;
        Ok(())
    }

    /// Whether the flush worker is currently running.
    pub async fn is_running(&self) -> bool {
        matches!(*self.state.lock().await, WorkerState::Running { .. })
    }

    /// Number of records currently queued.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.shared.queue.len()
    }
}

/// Background loop: flush, then sleep until signaled, cancelled, or the
/// flush interval elapses. Cancellation triggers one final full drain.
async fn run_flush_loop(shared: Arc<Shared>, cancel: CancellationToken) {
    let mut pending: Vec<Record> = Vec::new();
    while !cancel.is_cancelled() {
        flush(&shared, &mut pending, false).await;
        tokio::select! {
            () = shared.wake.notified() => {}
            () = cancel.cancelled() => {}
            () = tokio::time::sleep(shared.config.max_flush_interval()) => {}
        }
    }
    flush(&shared, &mut pending, true).await;
}

/// Ships queued records in batches of up to `max_batch_size`.
///
/// Reports and resets the lost-record counter, retries a batch left over
/// from a failed attempt, then drains the queue while at least one full
/// batch remains (or, on a final flush, until it is empty). A sink error
/// keeps the in-flight batch aside for the next cycle and aborts the rest
/// of this one; undrained records stay queued.
async fn flush(shared: &Shared, pending: &mut Vec<Record>, all: bool) {
    let lost = shared.lost.swap(0, Ordering::Relaxed);
    if lost > 0 {
        warn!(name = %shared.config.name, lost, "records lost");
    }

    if !pending.is_empty() {
        if let Err(e) = shared.sink.ship(pending.as_slice()).await {
            error!(
                name = %shared.config.name,
                batch = pending.len(),
                error = %e,
                "failed to ship batch, keeping it for the next cycle"
            );
            return;
        }
        pending.clear();
    }

    if shared.queue.is_empty() {
        return;
    }
    loop {
        let batch = shared.queue.drain_up_to(shared.config.max_batch_size);
        if batch.is_empty() {
            break;
        }
        if let Err(e) = shared.sink.ship(&batch).await {
            error!(
                name = %shared.config.name,
                batch = batch.len(),
                error = %e,
                "failed to ship batch, keeping it for the next cycle"
            );
            *pending = batch;
            return;
        }
        let more_full_batches = shared.queue.len() >= shared.config.max_batch_size;
        if !(more_full_batches || (all && !shared.queue.is_empty())) {
            break;
        }
    }
}
