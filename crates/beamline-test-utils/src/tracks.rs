//! Track fixtures.

use beamline_core::{DVec3, Detector, HitRecord, Species, TrackState};

/// A track of `species` at the origin, travelling along +z with kinetic
/// energy `ke` (GeV).
pub fn with_energy(species: Species, ke: f64) -> TrackState {
    TrackState::with_kinetic_energy(species, DVec3::ZERO, DVec3::Z, ke)
}

/// A mu+ at `position`, travelling along +z with kinetic energy `ke`.
pub fn muon_at(position: DVec3, ke: f64) -> TrackState {
    TrackState::with_kinetic_energy(Species::MuPlus, position, DVec3::Z, ke)
}

/// A hit of `species` with kinetic energy `ke` in `detector`, taken at a
/// fixed point on the axis.
pub fn hit(detector: Detector, species: Species, ke: f64) -> HitRecord {
    let track = TrackState::with_kinetic_energy(species, DVec3::new(1.0, 2.0, 3.0), DVec3::Z, ke);
    HitRecord::capture(detector, &track)
}
