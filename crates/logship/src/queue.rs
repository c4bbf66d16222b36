//! Bounded FIFO buffer decoupling producers from the flush worker.
//!
//! The queue is the only place records wait. Capacity is fixed at
//! construction; when it is full, callers either give up immediately
//! (`try_enqueue`) or wait for the worker to drain a slice
//! (`enqueue_within`). Records are never reordered: drain order is
//! submission order.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::Notify;

use crate::record::Record;

/// Fixed-capacity FIFO queue of pending records.
///
/// All mutation goes through the internal mutex; critical sections are
/// short and never held across an await. Blocked producers are parked on a
/// [`Notify`] and woken whenever a drain or clear frees space.
#[derive(Debug)]
pub struct BoundedRecordQueue {
    records: Mutex<VecDeque<Record>>,
    capacity: usize,
    space: Notify,
}

#[allow(clippy::expect_used)]
impl BoundedRecordQueue {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        BoundedRecordQueue {
            records: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            space: Notify::new(),
        }
    }

    /// Appends a record without waiting.
    ///
    /// # Errors
    ///
    /// Returns the record back when the queue is full.
    pub fn try_enqueue(&self, record: Record) -> Result<(), Record> {
        let mut records = self.records.lock().expect("lock poisoned");
        if records.len() >= self.capacity {
            return Err(record);
        }
        records.push_back(record);
        Ok(())
    }

    /// Appends a record, waiting up to `max_block` for space.
    ///
    /// Each wakeup retries against the remaining time budget. The wait is
    /// cancel-safe: dropping the future leaves the queue untouched.
    ///
    /// # Errors
    ///
    /// Returns the record back when the budget elapses with the queue
    /// still full.
    pub async fn enqueue_within(
        &self,
        record: Record,
        max_block: Duration,
    ) -> Result<(), Record> {
        let deadline = tokio::time::Instant::now() + max_block;
        let mut record = record;
        loop {
            // Register for a wakeup before re-checking capacity, so a drain
            // landing between the check and the wait is never missed.
            let space = self.space.notified();
            match self.try_enqueue(record) {
                Ok(()) => return Ok(()),
                Err(returned) => record = returned,
            }
            match tokio::time::timeout_at(deadline, space).await {
                Ok(()) => {}
                Err(_elapsed) => return Err(record),
            }
        }
    }

    /// Removes and returns up to `max` of the oldest records.
    pub fn drain_up_to(&self, max: usize) -> Vec<Record> {
        let drained: Vec<Record> = {
            let mut records = self.records.lock().expect("lock poisoned");
            let take = max.min(records.len());
            records.drain(..take).collect()
        };
        if !drained.is_empty() {
            self.space.notify_waiters();
        }
        drained
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().expect("lock poisoned").len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.lock().expect("lock poisoned").is_empty()
    }

    /// Discards all queued records. Used only during forced shutdown.
    pub fn clear(&self) {
        self.records.lock().expect("lock poisoned").clear();
        self.space.notify_waiters();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::record::Severity;
    use std::sync::Arc;

    fn record(payload: &str) -> Record {
        Record::new(Severity::Info, payload)
    }

    #[test]
    fn test_try_enqueue_until_full() {
        let queue = BoundedRecordQueue::with_capacity(2);
        assert!(queue.try_enqueue(record("a")).is_ok());
        assert!(queue.try_enqueue(record("b")).is_ok());

        let rejected = queue.try_enqueue(record("c")).unwrap_err();
        assert_eq!(rejected.payload(), "c");
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_drain_preserves_fifo_order() {
        let queue = BoundedRecordQueue::with_capacity(4);
        for payload in ["a", "b", "c", "d"] {
            queue.try_enqueue(record(payload)).unwrap();
        }

        let first = queue.drain_up_to(3);
        let payloads: Vec<&str> = first.iter().map(Record::payload).collect();
        assert_eq!(payloads, vec!["a", "b", "c"]);

        let rest = queue.drain_up_to(3);
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].payload(), "d");
        assert!(queue.is_empty());
    }

    #[test]
    fn test_drain_from_empty_queue() {
        let queue = BoundedRecordQueue::with_capacity(2);
        assert!(queue.drain_up_to(5).is_empty());
    }

    #[test]
    fn test_clear_discards_everything() {
        let queue = BoundedRecordQueue::with_capacity(2);
        queue.try_enqueue(record("a")).unwrap();
        queue.try_enqueue(record("b")).unwrap();
        queue.clear();
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_enqueue_within_times_out_when_full() {
        let queue = BoundedRecordQueue::with_capacity(1);
        queue.try_enqueue(record("a")).unwrap();

        let rejected = queue
            .enqueue_within(record("b"), Duration::from_millis(20))
            .await
            .unwrap_err();
        assert_eq!(rejected.payload(), "b");
        assert_eq!(queue.len(), 1);
    }

    #[tokio::test]
    async fn test_enqueue_within_succeeds_immediately_with_space() {
        let queue = BoundedRecordQueue::with_capacity(1);
        assert!(queue
            .enqueue_within(record("a"), Duration::from_millis(20))
            .await
            .is_ok());
        assert_eq!(queue.len(), 1);
    }

    #[tokio::test]
    async fn test_enqueue_within_wakes_when_drained() {
        let queue = Arc::new(BoundedRecordQueue::with_capacity(1));
        queue.try_enqueue(record("a")).unwrap();

        let waiter = {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move {
                queue
                    .enqueue_within(record("b"), Duration::from_secs(5))
                    .await
            })
        };

        // Let the waiter park before freeing a slot.
        tokio::time::sleep(Duration::from_millis(20)).await;
        let drained = queue.drain_up_to(1);
        assert_eq!(drained[0].payload(), "a");

        waiter.await.unwrap().unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.drain_up_to(1)[0].payload(), "b");
    }
}
