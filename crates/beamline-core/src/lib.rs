//! Core types and traits for the beamline transport core.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by every other crate in the workspace:
//! identifiers, particle species, named regions, track and hit records,
//! the [`FieldModel`], [`RegionOracle`] and [`TableSink`] seams, and error
//! types.
//!
//! All quantities use the unit system in [`units`]: cm, ns, GeV, GeV/c,
//! tesla and MV/m.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod field;
pub mod id;
pub mod region;
pub mod sink;
pub mod species;
pub mod track;
pub mod units;

pub use error::{ConfigError, SinkError};
pub use field::{FieldModel, FieldValue};
pub use id::{EventId, RunId};
pub use region::{Detector, Region, RegionOracle};
pub use sink::{NullSink, Table, TableSink};
pub use species::Species;
pub use track::{HitRecord, TrackState};

/// Three-vector type used for positions and momenta.
pub use glam::DVec3;
