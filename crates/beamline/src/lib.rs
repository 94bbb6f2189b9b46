//! Beamline: the physics core of a muon beamline simulation.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all beamline sub-crates. Add `beamline` as a single dependency for most
//! uses; the `beamline-sim` binary in this crate drives complete runs from a
//! JSON configuration.
//!
//! # Quick start
//!
//! ```rust
//! use beamline::prelude::*;
//!
//! // The guide solenoid is at full strength on axis in mid-window.
//! let guide = GuideField::builder().max_field(5.0).build().unwrap();
//! let f = guide.evaluate(DVec3::new(0.0, 0.0, 400.0), 0.0);
//! assert_eq!(f.b.z, 5.0);
//!
//! // A muon crossing a detector plane is recorded, not killed.
//! let policy = StepPolicy::default();
//! let mu = TrackState::with_kinetic_energy(Species::MuMinus, DVec3::ZERO, DVec3::Z, 2.0);
//! let outcome = policy.apply(&mu, Region::Detector(Detector::Detector2));
//! assert!(!outcome.is_kill());
//! assert!(outcome.hit.is_some());
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `beamline-core` | Species, tracks, regions, field trait, table sink, errors |
//! | [`field`] | `beamline-field` | Guide solenoid, RF cavity, composite field |
//! | [`step`] | `beamline-step` | Per-step kill, hit and momentum-rewrite rules |
//! | [`record`] | `beamline-record` | Event and run aggregators, CSV tables, run summary |
//! | [`engine`] | `beamline-engine` | Reference geometry, beam, kernel and run manager |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and IDs (`beamline-core`).
///
/// Contains [`types::Species`], [`types::TrackState`], the
/// [`types::RegionOracle`] and [`types::FieldModel`] traits, and the
/// [`types::TableSink`] output seam.
pub use beamline_core as types;

/// Electromagnetic field models (`beamline-field`).
///
/// [`field::GuideField`], [`field::CavityField`] and their composition
/// [`field::BeamlineField`].
pub use beamline_field as field;

/// Per-step policy (`beamline-step`).
pub use beamline_step as step;

/// Detector aggregation and output (`beamline-record`).
///
/// [`record::EventAggregator`] buffers one event's records,
/// [`record::RunAggregator`] holds the shared counters, and
/// [`record::CsvDirSink`] writes the two CSV tables.
pub use beamline_record as record;

/// Reference geometry, transport and threading (`beamline-engine`).
///
/// [`engine::RunManager`] runs events over worker threads and returns a
/// [`engine::RunReport`].
pub use beamline_engine as engine;

/// Common imports for typical beamline usage.
///
/// ```rust
/// use beamline::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use beamline_core::{
        Detector, EventId, FieldModel, FieldValue, HitRecord, Region, RegionOracle, RunId,
        Species, Table, TableSink, TrackState, DVec3,
    };

    // Errors
    pub use beamline_core::{ConfigError, SinkError};
    pub use beamline_engine::RunError;

    // Fields
    pub use beamline_field::{BeamlineField, CavityField, GuideField};

    // Step policy
    pub use beamline_step::{Decision, StepOutcome, StepPolicy};

    // Aggregation
    pub use beamline_record::{CsvDirSink, EventAggregator, RunAggregator, RunSummary};

    // Engine
    pub use beamline_engine::{BeamlineConfig, RunManager, RunReport};
}
