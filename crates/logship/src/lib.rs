//! # logship
//!
//! An asynchronous batching log shipper core: a bounded in-memory queue
//! that decouples producer tasks from a single background worker that
//! batches and forwards records to a remote log-ingestion service.
//!
//! ## Overview
//!
//! Producers call [`shipper::BatchShipper::submit`]; the shipper applies a
//! severity-aware load-shedding policy, enqueues the record, and signals
//! the worker once a full batch is ready. The worker drains the queue in
//! batches and hands them to a caller-supplied [`sink::Sink`], retrying
//! failed batches on the next cycle. [`shipper::BatchShipper::stop`]
//! drains the queue before the worker terminates.
//!
//! The crate is a library component embedded in a host process: it has no
//! transport, no wire format, and no CLI surface of its own. Delivery
//! problems are reported through the `tracing` facade and never surface as
//! producer errors.
//!
//! ## Guarantees
//!
//! - Records are shipped in submission order and never reordered.
//! - Memory is bounded: the queue never exceeds twice the batch size.
//! - Producer latency is isolated from sink health: a full queue sheds
//!   low-severity records instead of blocking (unless a blocking budget is
//!   configured).

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(unused_extern_crates)]
#![deny(unused_allocation)]
#![deny(unused_assignments)]
#![deny(unused_comparisons)]
#![deny(unreachable_pub)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::module_name_repetitions)]

/// Shipper configuration and derived limits
pub mod config;

/// Errors surfaced by the shipper API
pub mod error;

/// Bounded FIFO queue of pending records
pub mod queue;

/// Log record and severity types
pub mod record;

/// Batching shipper and its flush worker
pub mod shipper;

/// Delivery contract for batched records
pub mod sink;
