//! Log record and severity types.
//!
//! A [`Record`] is the unit of work flowing through the shipper: an opaque
//! payload stamped with an ordered [`Severity`] and its arrival time.
//! Records are immutable once created and are shipped in arrival order.

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use serde::{Deserialize, Deserializer};

use crate::error::ShipperError;

/// Severity of a log record, ordered from least to most important.
///
/// The ordering drives the load-shedding policy: under pressure, records
/// below the configured importance threshold are dropped first while
/// `Warn` and `Error` records keep flowing.
///
/// Severities parse from strings case-insensitively:
/// ```
/// use logship::record::Severity;
/// use std::str::FromStr;
///
/// assert_eq!(Severity::from_str("warn").unwrap(), Severity::Warn);
/// assert_eq!(Severity::from_str("ERROR").unwrap(), Severity::Error);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Severity {
    /// Very low priority, extremely verbose information.
    Trace,
    /// Lower priority information useful for debugging.
    Debug,
    /// Useful information about normal operations.
    Info,
    /// Hazardous situations that may lead to errors.
    ///
    /// This is the **default** importance threshold: `Warn` and above are
    /// never load-shed.
    #[default]
    Warn,
    /// Very serious errors that prevent normal operation.
    Error,
}

impl AsRef<str> for Severity {
    fn as_ref(&self) -> &str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

impl FromStr for Severity {
    type Err = ShipperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Ok(Severity::Trace),
            "debug" => Ok(Severity::Debug),
            "info" => Ok(Severity::Info),
            "warn" | "warning" => Ok(Severity::Warn),
            "error" => Ok(Severity::Error),
            _ => Err(ShipperError::InvalidConfig(format!(
                "unknown severity: {s}"
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Severity::from_str(&value).map_err(serde::de::Error::custom)
    }
}

/// A single log record queued for shipping.
///
/// The arrival time is captured when the record is created, from the
/// process-local monotonic clock, and is what breaks ties between records
/// submitted back to back.
#[derive(Clone, Debug)]
pub struct Record {
    payload: String,
    severity: Severity,
    arrived_at: Instant,
}

impl Record {
    /// Creates a record, stamping it with the current monotonic time.
    #[must_use]
    pub fn new(severity: Severity, payload: impl Into<String>) -> Self {
        Record {
            payload: payload.into(),
            severity,
            arrived_at: Instant::now(),
        }
    }

    /// The opaque payload handed to the sink.
    #[must_use]
    pub fn payload(&self) -> &str {
        &self.payload
    }

    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Monotonic arrival time, assigned at creation.
    #[must_use]
    pub fn arrived_at(&self) -> Instant {
        self.arrived_at
    }
}
