//! Delivery contract between the shipper and the remote intake.

use async_trait::async_trait;

use crate::error::BoxError;
use crate::record::Record;

/// A batch-accepting destination for log records.
///
/// Implementations own the transport entirely: serialization, endpoints,
/// authentication, and any per-request size limits. The shipper hands over
/// batches of at most `max_batch_size` records, in submission order, and
/// treats any error as "retry the whole batch on the next cycle".
#[async_trait]
pub trait Sink: Send + Sync {
    /// Ships one batch of records.
    ///
    /// The batch is borrowed: on failure the shipper keeps ownership and
    /// retries the same records later, so implementations must not assume
    /// delivery happened if they return an error.
    async fn ship(&self, batch: &[Record]) -> Result<(), BoxError>;
}
