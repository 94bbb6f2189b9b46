//! Reference host for the beamline core.
//!
//! The core crates only answer per-step questions and aggregate hits. This
//! crate supplies what a host transport framework would: a concrete
//! region layout ([`BeamlineGeometry`]), a primary source
//! ([`PrimaryBeam`]), a fixed-step integrator ([`ReferenceKernel`]), the
//! run/event/step callbacks ([`BeamlineActions`], [`WorkerActions`]) and a
//! multi-threaded [`RunManager`] that enforces the end-of-run barrier.
//!
//! Everything is configured from one [`BeamlineConfig`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod actions;
pub mod config;
pub mod error;
pub mod geometry;
pub mod gun;
pub mod kernel;
pub mod runner;

pub use actions::{BeamlineActions, WorkerActions};
pub use config::{Beamline, BeamlineConfig, RunConfig};
pub use error::RunError;
pub use geometry::{BeamlineGeometry, GeometryConfig};
pub use gun::{BeamConfig, PrimaryBeam};
pub use kernel::{KernelConfig, ReferenceKernel, TrackExit, TrackSummary};
pub use runner::{RunManager, RunMetrics, RunReport};
