//! Errors that abort a run.

use std::error::Error;
use std::fmt;

use beamline_core::{ConfigError, SinkError};

/// A run could not be started or did not finish.
#[derive(Debug)]
pub enum RunError {
    /// The configuration was rejected before any event ran.
    Config(ConfigError),
    /// The output directory could not be prepared.
    Output(SinkError),
    /// A worker thread could not be spawned.
    ThreadSpawn {
        /// Description of the spawn failure.
        reason: String,
    },
    /// A worker thread panicked; the run's statistics are incomplete.
    WorkerPanicked {
        /// Name of the thread that panicked.
        worker: String,
    },
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Output(e) => write!(f, "output: {e}"),
            Self::ThreadSpawn { reason } => write!(f, "thread spawn failed: {reason}"),
            Self::WorkerPanicked { worker } => write!(f, "worker {worker} panicked"),
        }
    }
}

impl Error for RunError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Output(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for RunError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<SinkError> for RunError {
    fn from(e: SinkError) -> Self {
        Self::Output(e)
    }
}
