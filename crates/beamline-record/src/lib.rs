//! Hit aggregation and run statistics for the beamline core.
//!
//! Two aggregators with different lifetimes:
//!
//! - [`EventAggregator`] is owned by one worker for one event. It buffers
//!   detector hits and particle entries, then flushes them to the
//!   trajectory and particle tables at event end.
//! - [`RunAggregator`] is shared by every worker for the whole run. It
//!   keeps per-(detector, species) counts and energy sums behind a mutex
//!   and produces the [`RunSummary`] at run end.
//!
//! The event aggregator is handed its run aggregator at construction;
//! nothing is discovered through globals.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod event;
pub mod run;
pub mod sink;
pub mod summary;

pub use event::{EventAggregator, EventFlush};
pub use run::{ParticleStats, RunAggregator};
pub use sink::{particle_row, trajectory_row, CsvDirSink};
pub use summary::{format_energy, DetectorTotal, RunSummary, SummaryRow};
