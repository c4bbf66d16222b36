//! Shipper configuration.
//!
//! Configuration is supplied once at construction, either built in code or
//! deserialized from a host config file (every field has a default, so a
//! partial document works). Durations are expressed in milliseconds.

use std::time::Duration;

use serde::Deserialize;

use crate::error::ShipperError;
use crate::record::Severity;

/// Default number of records per shipped batch.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 512;

/// Default interval between periodic flushes, in milliseconds.
pub const DEFAULT_MAX_FLUSH_INTERVAL_MS: u64 = 5_000;

/// Shipper configuration, fixed at construction.
///
/// # Derived values
///
/// Two internal limits are derived from `max_batch_size` M:
/// - queue capacity = `2 × M`
/// - discard threshold = `ceil(1.5 × M)`
///
/// The discard threshold sits strictly above the flush trigger (M), so a
/// queue that has just signaled a flush still has headroom to absorb a
/// burst while the worker catches up.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Shipper name, used to label diagnostics when a host runs several
    /// shippers side by side.
    pub name: String,

    /// Maximum number of records per batch handed to the sink. Must be
    /// greater than zero.
    pub max_batch_size: usize,

    /// How long `submit` may wait for queue space, in milliseconds.
    /// Zero means never block: a full queue drops the record immediately.
    pub max_block_time_ms: u64,

    /// Upper bound on the worker's sleep between flushes, in milliseconds.
    /// Must be greater than zero. Submission bursts wake the worker early.
    pub max_flush_interval_ms: u64,

    /// Records at or above this severity bypass the load-shedding check.
    pub important_severity: Severity,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            name: "logship".to_string(),
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            max_block_time_ms: 0,
            max_flush_interval_ms: DEFAULT_MAX_FLUSH_INTERVAL_MS,
            important_severity: Severity::Warn,
        }
    }
}

impl Config {
    /// Rejects configurations the shipper cannot run with.
    pub(crate) fn validate(&self) -> Result<(), ShipperError> {
        if self.max_batch_size == 0 {
            return Err(ShipperError::InvalidConfig(
                "max_batch_size must be greater than zero".to_string(),
            ));
        }
        if self.max_flush_interval_ms == 0 {
            return Err(ShipperError::InvalidConfig(
                "max_flush_interval_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Queue capacity, fixed at twice the batch size.
    pub(crate) fn queue_capacity(&self) -> usize {
        2 * self.max_batch_size
    }

    /// Queue length at which low-severity records start being shed.
    pub(crate) fn discard_threshold(&self) -> usize {
        (3 * self.max_batch_size).div_ceil(2)
    }

    /// Blocking budget for `submit`, `None` when blocking is disabled.
    pub(crate) fn max_block_time(&self) -> Option<Duration> {
        (self.max_block_time_ms > 0).then(|| Duration::from_millis(self.max_block_time_ms))
    }

    pub(crate) fn max_flush_interval(&self) -> Duration {
        Duration::from_millis(self.max_flush_interval_ms)
    }
}
