//! Track state and detector hit records.

use glam::DVec3;

use crate::region::Detector;
use crate::species::Species;

/// Physical state of one track at a step point.
///
/// Owned by the transport kernel. The core reads it every step and, for
/// damping and cavity steps, hands back a rewritten momentum and kinetic
/// energy that the kernel applies.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackState {
    /// Particle species.
    pub species: Species,
    /// Rest mass in GeV.
    pub mass: f64,
    /// Kinetic energy in GeV.
    pub kinetic_energy: f64,
    /// Momentum in GeV/c.
    pub momentum: DVec3,
    /// Position in cm.
    pub position: DVec3,
    /// Global time in ns.
    pub time: f64,
}

impl TrackState {
    /// A track of `species` at `position` with the given momentum.
    ///
    /// The rest mass is taken from the species and the kinetic energy is
    /// derived from the momentum, so the state is on-shell by construction.
    pub fn new(species: Species, position: DVec3, momentum: DVec3) -> Self {
        let mass = species.rest_mass();
        Self {
            species,
            mass,
            kinetic_energy: kinetic_energy(momentum.length(), mass),
            momentum,
            position,
            time: 0.0,
        }
    }

    /// A track with a given kinetic energy travelling along `direction`.
    ///
    /// `direction` need not be normalised; a zero direction yields a
    /// track at rest regardless of `kinetic_energy`.
    pub fn with_kinetic_energy(
        species: Species,
        position: DVec3,
        direction: DVec3,
        kinetic_energy: f64,
    ) -> Self {
        let mass = species.rest_mass();
        let unit = direction.normalize_or_zero();
        let p = momentum_magnitude(kinetic_energy, mass);
        Self {
            species,
            mass,
            kinetic_energy: if unit == DVec3::ZERO { 0.0 } else { kinetic_energy },
            momentum: unit * p,
            position,
            time: 0.0,
        }
    }

    /// Override the rest mass (for species the core has no mass for).
    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    /// Set the global time in ns.
    pub fn at_time(mut self, time: f64) -> Self {
        self.time = time;
        self
    }

    /// Total energy `E_k + m` in GeV.
    pub fn total_energy(&self) -> f64 {
        self.kinetic_energy + self.mass
    }

    /// Speed as a fraction of `c` (`|p| / E`). Zero for a track at rest.
    pub fn beta(&self) -> f64 {
        let e = self.total_energy();
        if e > 0.0 {
            self.momentum.length() / e
        } else {
            0.0
        }
    }

    /// Unit direction of motion, or zero for a track at rest.
    pub fn direction(&self) -> DVec3 {
        self.momentum.normalize_or_zero()
    }
}

/// Relativistic kinetic energy from momentum magnitude and rest mass:
/// `sqrt(p² + m²) − m`.
pub fn kinetic_energy(momentum: f64, mass: f64) -> f64 {
    (momentum * momentum + mass * mass).sqrt() - mass
}

/// Momentum magnitude from kinetic energy and rest mass:
/// `sqrt(T² + 2Tm)`.
pub fn momentum_magnitude(kinetic_energy: f64, mass: f64) -> f64 {
    (kinetic_energy * kinetic_energy + 2.0 * kinetic_energy * mass)
        .max(0.0)
        .sqrt()
}

/// A detector-plane crossing, captured at the step's pre-step point.
///
/// Created by the step policy; immutable once created and owned by the
/// event aggregator of the event it belongs to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitRecord {
    /// Detector whose region contained the pre-step point.
    pub detector: Detector,
    /// Particle species.
    pub species: Species,
    /// Kinetic energy in GeV.
    pub kinetic_energy: f64,
    /// Pre-step position in cm.
    pub position: DVec3,
    /// Pre-step momentum in GeV/c.
    pub momentum: DVec3,
}

impl HitRecord {
    /// Capture a hit from the current track state.
    pub fn capture(detector: Detector, track: &TrackState) -> Self {
        Self {
            detector,
            species: track.species,
            kinetic_energy: track.kinetic_energy,
            position: track.position,
            momentum: track.momentum,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::mass;

    #[test]
    fn new_track_is_on_shell() {
        let t = TrackState::new(Species::Proton, DVec3::ZERO, DVec3::new(0.0, 0.0, 10.0));
        let e = t.total_energy();
        let p = t.momentum.length();
        assert!((e * e - p * p - mass::PROTON * mass::PROTON).abs() < 1e-9);
    }

    #[test]
    fn kinetic_energy_round_trip() {
        let m = mass::MUON;
        for t in [0.001, 0.5, 2.0, 100.0] {
            let p = momentum_magnitude(t, m);
            assert!((kinetic_energy(p, m) - t).abs() < 1e-9);
        }
    }

    #[test]
    fn massless_energy_equals_momentum() {
        assert!((kinetic_energy(3.0, 0.0) - 3.0).abs() < 1e-12);
        assert!((momentum_magnitude(3.0, 0.0) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn with_kinetic_energy_points_along_direction() {
        let t = TrackState::with_kinetic_energy(
            Species::MuMinus,
            DVec3::ZERO,
            DVec3::new(0.0, 3.0, 4.0),
            2.0,
        );
        assert!((t.kinetic_energy - 2.0).abs() < 1e-12);
        let d = t.direction();
        assert!((d - DVec3::new(0.0, 0.6, 0.8)).length() < 1e-12);
        assert!(t.beta() > 0.99 && t.beta() < 1.0);
    }

    #[test]
    fn zero_direction_is_at_rest() {
        let t = TrackState::with_kinetic_energy(Species::Proton, DVec3::ZERO, DVec3::ZERO, 5.0);
        assert_eq!(t.momentum, DVec3::ZERO);
        assert_eq!(t.kinetic_energy, 0.0);
        assert_eq!(t.beta(), 0.0);
    }

    #[test]
    fn hit_captures_pre_step_state() {
        let t = TrackState::new(
            Species::PiPlus,
            DVec3::new(1.0, 2.0, 200.0),
            DVec3::new(0.1, 0.2, 3.0),
        );
        let hit = HitRecord::capture(Detector::Detector2, &t);
        assert_eq!(hit.detector, Detector::Detector2);
        assert_eq!(hit.species, Species::PiPlus);
        assert_eq!(hit.position, t.position);
        assert_eq!(hit.momentum, t.momentum);
        assert_eq!(hit.kinetic_energy, t.kinetic_energy);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn energy_momentum_inverse(t in 0.0f64..500.0, m in 0.0f64..2.0) {
                let p = momentum_magnitude(t, m);
                prop_assert!((kinetic_energy(p, m) - t).abs() < 1e-9 * (1.0 + t));
            }
        }
    }
}
