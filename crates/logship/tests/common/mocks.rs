use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use logship::error::BoxError;
use logship::record::Record;
use logship::sink::Sink;

/// Sink that records every batch it is handed.
pub struct RecordingSink {
    batches: Mutex<Vec<Vec<Record>>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(RecordingSink {
            batches: Mutex::new(Vec::new()),
        })
    }

    /// Every shipped batch, in shipping order.
    pub fn batches(&self) -> Vec<Vec<Record>> {
        self.batches.lock().unwrap().clone()
    }

    /// Shipped payloads flattened across batches, in shipping order.
    pub fn payloads(&self) -> Vec<String> {
        self.batches
            .lock()
            .unwrap()
            .iter()
            .flatten()
            .map(|record| record.payload().to_string())
            .collect()
    }

    pub fn record_count(&self) -> usize {
        self.batches.lock().unwrap().iter().map(Vec::len).sum()
    }
}

#[async_trait]
impl Sink for RecordingSink {
    async fn ship(&self, batch: &[Record]) -> Result<(), BoxError> {
        self.batches.lock().unwrap().push(batch.to_vec());
        Ok(())
    }
}

/// Sink that fails its first `failures` shipping attempts, then records.
pub struct FlakySink {
    failures_left: AtomicUsize,
    pub inner: Arc<RecordingSink>,
}

impl FlakySink {
    pub fn failing(failures: usize) -> Arc<Self> {
        Arc::new(FlakySink {
            failures_left: AtomicUsize::new(failures),
            inner: RecordingSink::new(),
        })
    }

    pub fn attempts_failed(&self) -> bool {
        self.failures_left.load(Ordering::Relaxed) == 0
    }
}

#[async_trait]
impl Sink for FlakySink {
    async fn ship(&self, batch: &[Record]) -> Result<(), BoxError> {
        let remaining = self.failures_left.load(Ordering::Relaxed);
        if remaining > 0 {
            self.failures_left.store(remaining - 1, Ordering::Relaxed);
            return Err("synthetic intake outage".into());
        }
        self.inner.ship(batch).await
    }
}
