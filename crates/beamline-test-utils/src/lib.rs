//! Test utilities and mock types for beamline development.
//!
//! Provides mock implementations of the core seams ([`RegionOracle`],
//! [`TableSink`]) and track fixtures for building test scenarios.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
pub mod tracks;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use beamline_core::{DVec3, Region, RegionOracle, SinkError, Table, TableSink};

pub use fixtures::{FailingSink, FixedOracle};

/// Region oracle made of axial slabs.
///
/// Each slab covers `z_min <= z < z_max` at every radius. The first slab
/// that contains the point wins; points in no slab are [`Region::None`].
#[derive(Clone, Debug, Default)]
pub struct SlabOracle {
    slabs: Vec<(f64, f64, Region)>,
}

impl SlabOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a slab. Earlier slabs take precedence over later ones.
    pub fn with(mut self, z_min: f64, z_max: f64, region: Region) -> Self {
        self.slabs.push((z_min, z_max, region));
        self
    }
}

impl RegionOracle for SlabOracle {
    fn classify(&self, position: DVec3) -> Region {
        self.slabs
            .iter()
            .find(|(lo, hi, _)| position.z >= *lo && position.z < *hi)
            .map(|(_, _, region)| *region)
            .unwrap_or(Region::None)
    }
}

/// In-memory [`TableSink`] that records every append.
///
/// Rows land in per-table buffers; headers are kept in the same buffer so
/// the contents read exactly like the file would.
#[derive(Debug, Default)]
pub struct MemorySink {
    trajectory: Mutex<Vec<String>>,
    particle: Mutex<Vec<String>>,
    appends: AtomicUsize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All lines written to `table` so far, header included.
    pub fn lines(&self, table: Table) -> Vec<String> {
        self.buffer(table)
            .lock()
            .map(|g| g.clone())
            .unwrap_or_default()
    }

    /// Lines written to `table`, header excluded.
    pub fn rows(&self, table: Table) -> Vec<String> {
        self.lines(table)
            .into_iter()
            .filter(|l| l != table.header())
            .collect()
    }

    /// How many times the header of `table` was written.
    pub fn header_count(&self, table: Table) -> usize {
        self.lines(table)
            .iter()
            .filter(|l| l.as_str() == table.header())
            .count()
    }

    /// Number of `append` calls received, across both tables.
    pub fn append_count(&self) -> usize {
        self.appends.load(Ordering::Relaxed)
    }

    fn buffer(&self, table: Table) -> &Mutex<Vec<String>> {
        match table {
            Table::Trajectory => &self.trajectory,
            Table::Particle => &self.particle,
        }
    }
}

impl TableSink for MemorySink {
    fn append(&self, table: Table, header: Option<&str>, rows: &[String]) -> Result<(), SinkError> {
        self.appends.fetch_add(1, Ordering::Relaxed);
        let mut buf = self.buffer(table).lock().map_err(|_| SinkError::Write {
            path: table.file_name().into(),
            reason: "buffer lock poisoned".into(),
        })?;
        if let Some(h) = header {
            buf.push(h.to_string());
        }
        buf.extend(rows.iter().cloned());
        Ok(())
    }
}
