//! Reusable seam fixtures.
//!
//! - [`FixedOracle`] classifies every point as the same region.
//! - [`FailingSink`] fails every append, or only appends to one table.

use std::sync::atomic::{AtomicUsize, Ordering};

use beamline_core::{DVec3, Region, RegionOracle, SinkError, Table, TableSink};

/// Classifies every position as the wrapped region.
#[derive(Clone, Copy, Debug)]
pub struct FixedOracle(pub Region);

impl RegionOracle for FixedOracle {
    fn classify(&self, _position: DVec3) -> Region {
        self.0
    }
}

/// A sink whose appends fail, as if the output directory were unwritable.
#[derive(Debug, Default)]
pub struct FailingSink {
    only: Option<Table>,
    attempts: AtomicUsize,
}

impl FailingSink {
    /// Fail every append.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail appends to `table` only; the other table accepts and drops rows.
    pub fn only(table: Table) -> Self {
        Self {
            only: Some(table),
            attempts: AtomicUsize::new(0),
        }
    }

    /// Number of append attempts seen, successful or not.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::Relaxed)
    }
}

impl TableSink for FailingSink {
    fn append(&self, table: Table, _header: Option<&str>, _rows: &[String]) -> Result<(), SinkError> {
        self.attempts.fetch_add(1, Ordering::Relaxed);
        match self.only {
            Some(t) if t != table => Ok(()),
            _ => Err(SinkError::Open {
                path: table.file_name().into(),
                reason: "permission denied".into(),
            }),
        }
    }
}
