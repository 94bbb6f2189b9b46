//! Persisted output tables and the [`TableSink`] trait.

use std::fmt;

use crate::error::SinkError;

/// One of the two persisted per-event tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Table {
    /// One row per detector hit: event, detector, x/px, y/py, z/pz.
    Trajectory,
    /// One row per tracked-species hit: event, detector, species, energy.
    Particle,
}

impl Table {
    /// Both tables, in flush order.
    pub const ALL: [Table; 2] = [Table::Trajectory, Table::Particle];

    /// Header row written once, before the first event's rows.
    pub fn header(self) -> &'static str {
        match self {
            Self::Trajectory => "EventID,Detector,X,PX,Y,PY,Z,PZ",
            Self::Particle => "EventID,Detector,ParticleName,Energy",
        }
    }

    /// Default file name for the table.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Trajectory => "trajectory_data.csv",
            Self::Particle => "particle_data.csv",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Append-only destination for table rows.
///
/// # Contract
///
/// - Each call is self-contained: open, append, flush, close. Nothing is
///   held open between events, so rows from earlier runs in the same
///   process are never disturbed.
/// - `header` is `Some` only for the first event of a run and is written
///   before `rows`.
/// - Failures are returned, never panicked; callers log and skip.
/// - Shared by every worker thread.
pub trait TableSink: Send + Sync {
    /// Append `rows` (without trailing newlines) to `table`.
    fn append(&self, table: Table, header: Option<&str>, rows: &[String]) -> Result<(), SinkError>;
}

impl<T: TableSink + ?Sized> TableSink for std::sync::Arc<T> {
    fn append(&self, table: Table, header: Option<&str>, rows: &[String]) -> Result<(), SinkError> {
        (**self).append(table, header, rows)
    }
}

/// A sink that discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl TableSink for NullSink {
    fn append(&self, _table: Table, _header: Option<&str>, _rows: &[String]) -> Result<(), SinkError> {
        Ok(())
    }
}
