//! Error types for the beamline core.
//!
//! Two categories surface as errors: configuration errors, which are fatal
//! and reported before any event runs, and sink errors, which are
//! recovered locally by skipping one event's output. Field and step
//! computations are total and have no error type.

use std::error::Error;
use std::fmt;
use std::path::PathBuf;

/// Invalid configuration detected at construction time.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// A lower bound is not strictly below its upper bound.
    InvalidRange {
        /// Which parameter pair (e.g. `"guide.z"`).
        name: &'static str,
        /// Configured lower bound.
        min: f64,
        /// Configured upper bound.
        max: f64,
    },
    /// A quantity that must be strictly positive is zero or negative.
    NonPositive {
        /// Parameter name.
        name: &'static str,
        /// Configured value.
        value: f64,
    },
    /// A quantity that must not be negative is negative.
    Negative {
        /// Parameter name.
        name: &'static str,
        /// Configured value.
        value: f64,
    },
    /// A quantity is NaN or infinite.
    NonFinite {
        /// Parameter name.
        name: &'static str,
        /// Configured value.
        value: f64,
    },
    /// A value lies outside the interval it is allowed in.
    OutOfInterval {
        /// Parameter name.
        name: &'static str,
        /// Configured value.
        value: f64,
        /// The allowed interval in interval notation, e.g. `"(0, 1]"`.
        interval: &'static str,
    },
    /// A length does not fit inside the window it belongs to.
    DoesNotFit {
        /// Parameter name.
        name: &'static str,
        /// Configured length.
        length: f64,
        /// Available window.
        window: f64,
    },
    /// A configuration file could not be read.
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Description of the I/O failure.
        reason: String,
    },
    /// A configuration document could not be parsed.
    Parse {
        /// Description of the parse failure.
        reason: String,
    },
}

impl ConfigError {
    /// Reject NaN and infinities.
    pub fn check_finite(name: &'static str, value: f64) -> Result<f64, Self> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(Self::NonFinite { name, value })
        }
    }

    /// Require a finite, strictly positive value.
    pub fn check_positive(name: &'static str, value: f64) -> Result<f64, Self> {
        Self::check_finite(name, value)?;
        if value > 0.0 {
            Ok(value)
        } else {
            Err(Self::NonPositive { name, value })
        }
    }

    /// Require a finite, non-negative value.
    pub fn check_non_negative(name: &'static str, value: f64) -> Result<f64, Self> {
        Self::check_finite(name, value)?;
        if value >= 0.0 {
            Ok(value)
        } else {
            Err(Self::Negative { name, value })
        }
    }

    /// Require finite bounds with `min < max`.
    pub fn check_range(name: &'static str, min: f64, max: f64) -> Result<(f64, f64), Self> {
        Self::check_finite(name, min)?;
        Self::check_finite(name, max)?;
        if min < max {
            Ok((min, max))
        } else {
            Err(Self::InvalidRange { name, min, max })
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRange { name, min, max } => {
                write!(f, "{name}: lower bound {min} must be below upper bound {max}")
            }
            Self::NonPositive { name, value } => {
                write!(f, "{name} must be > 0, got {value}")
            }
            Self::Negative { name, value } => {
                write!(f, "{name} must be >= 0, got {value}")
            }
            Self::NonFinite { name, value } => {
                write!(f, "{name} must be finite, got {value}")
            }
            Self::OutOfInterval {
                name,
                value,
                interval,
            } => {
                write!(f, "{name} must lie in {interval}, got {value}")
            }
            Self::DoesNotFit {
                name,
                length,
                window,
            } => {
                write!(f, "{name} of {length} does not fit in a window of {window}")
            }
            Self::Io { path, reason } => {
                write!(f, "cannot read {}: {reason}", path.display())
            }
            Self::Parse { reason } => write!(f, "invalid configuration: {reason}"),
        }
    }
}

impl Error for ConfigError {}

/// A persisted-table sink could not be written.
///
/// Recovered locally: the event's rows for that table are dropped and the
/// run continues.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SinkError {
    /// The sink could not be opened for appending.
    Open {
        /// Target path.
        path: PathBuf,
        /// Description of the I/O failure.
        reason: String,
    },
    /// Writing or flushing rows failed after the sink was opened.
    Write {
        /// Target path.
        path: PathBuf,
        /// Description of the I/O failure.
        reason: String,
    },
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open { path, reason } => {
                write!(f, "error opening {}: {reason}", path.display())
            }
            Self::Write { path, reason } => {
                write!(f, "error writing {}: {reason}", path.display())
            }
        }
    }
}

impl Error for SinkError {}
