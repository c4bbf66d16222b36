//! Error types surfaced by the shipper API.
//!
//! Steady-state delivery problems (queue full, sink outages) are never
//! returned from `submit`; they are counted and reported through the
//! diagnostics channel. The errors here cover construction and shutdown.

use thiserror::Error;

/// Boxed error returned by a [`Sink`](crate::sink::Sink) shipping attempt.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by the shipper API.
#[derive(Debug, Error)]
pub enum ShipperError {
    /// Configuration rejected at construction.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The background worker task failed while being joined during
    /// shutdown. The queue has already been cleared when this is returned.
    #[error("flush worker failed during shutdown: {0}")]
    WorkerJoin(#[from] tokio::task::JoinError),
}
