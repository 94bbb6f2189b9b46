//! Benchmark profiles and utilities for the beamline physics core.
//!
//! - [`muon_profile`]: on-axis muon beam through the reference beamline
//! - [`proton_profile`]: the default off-axis proton beam in the full guide field
//! - [`sample_points`]: deterministic positions spread over the beamline

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use beamline_core::{DVec3, Species};
use beamline_engine::BeamlineConfig;

/// On-axis muons: every event crosses all three detectors.
pub fn muon_profile(events: u64, workers: usize) -> BeamlineConfig {
    let mut cfg = BeamlineConfig::default();
    cfg.beam.species = Species::MuMinus;
    cfg.beam.energy = 3.0;
    cfg.beam.angle_deg = 0.0;
    cfg.run.events = events;
    cfg.run.worker_count = Some(workers);
    cfg
}

/// The default proton beam, spiralling in the 7 T guide field.
pub fn proton_profile(events: u64, workers: usize) -> BeamlineConfig {
    let mut cfg = BeamlineConfig::default();
    cfg.run.events = events;
    cfg.run.worker_count = Some(workers);
    cfg
}

/// `n` deterministic points with `r < 60` cm and `-250 <= z < 1050` cm.
///
/// Covers both field windows and their tapers, plus some field-free space.
pub fn sample_points(n: usize, seed: u64) -> Vec<DVec3> {
    (0..n as u64)
        .map(|i| {
            let h = (i ^ seed).wrapping_mul(6364136223846793007);
            let a = (h >> 11) as f64 / (1u64 << 53) as f64;
            let b = (h.wrapping_mul(1442695040888963407) >> 11) as f64 / (1u64 << 53) as f64;
            let c = (h.wrapping_mul(2862933555777941757) >> 11) as f64 / (1u64 << 53) as f64;
            let r = 60.0 * a;
            let phi = std::f64::consts::TAU * b;
            DVec3::new(r * phi.cos(), r * phi.sin(), -250.0 + 1300.0 * c)
        })
        .collect()
}
