//! The [`StepPolicy`] and its configuration.

use beamline_core::{ConfigError, DVec3, HitRecord, Region, TrackState};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::outcome::{MomentumRewrite, StepOutcome};

/// Configuration (and builder) for [`StepPolicy`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepPolicyConfig {
    /// Kinetic energy below which neutrons, electrons and photons are
    /// killed, GeV. Default: 8.0.
    pub energy_threshold: f64,
    /// Factor applied to px and py in the damping zone. Default: 0.98.
    pub damping_factor: f64,
    /// Factor applied to pz in the RF cavity. Default: 1.005.
    pub acceleration_factor: f64,
}

impl Default for StepPolicyConfig {
    fn default() -> Self {
        Self {
            energy_threshold: 8.0,
            damping_factor: 0.98,
            acceleration_factor: 1.005,
        }
    }
}

impl StepPolicyConfig {
    /// Set the cull threshold (GeV).
    pub fn energy_threshold(mut self, gev: f64) -> Self {
        self.energy_threshold = gev;
        self
    }

    /// Set the transverse damping factor.
    pub fn damping_factor(mut self, factor: f64) -> Self {
        self.damping_factor = factor;
        self
    }

    /// Set the axial acceleration factor.
    pub fn acceleration_factor(mut self, factor: f64) -> Self {
        self.acceleration_factor = factor;
        self
    }

    /// Validate and build the policy.
    ///
    /// # Errors
    ///
    /// Returns `Err` if:
    /// - `energy_threshold` is negative or not finite
    /// - `damping_factor` is outside `(0, 1]`
    /// - `acceleration_factor` is not > 0
    pub fn build(self) -> Result<StepPolicy, ConfigError> {
        let energy_threshold =
            ConfigError::check_non_negative("policy.energy_threshold", self.energy_threshold)?;
        let damping_factor =
            ConfigError::check_positive("policy.damping_factor", self.damping_factor)?;
        if damping_factor > 1.0 {
            return Err(ConfigError::OutOfInterval {
                name: "policy.damping_factor",
                value: damping_factor,
                interval: "(0, 1]",
            });
        }
        let acceleration_factor =
            ConfigError::check_positive("policy.acceleration_factor", self.acceleration_factor)?;

        Ok(StepPolicy {
            energy_threshold,
            damping_factor,
            acceleration_factor,
        })
    }
}

/// Region-dispatched per-step rules.
///
/// Stateless apart from its immutable configuration, so one instance is
/// shared by every worker thread.
#[derive(Clone, Debug, PartialEq)]
pub struct StepPolicy {
    energy_threshold: f64,
    damping_factor: f64,
    acceleration_factor: f64,
}

impl Default for StepPolicy {
    fn default() -> Self {
        let cfg = StepPolicyConfig::default();
        Self {
            energy_threshold: cfg.energy_threshold,
            damping_factor: cfg.damping_factor,
            acceleration_factor: cfg.acceleration_factor,
        }
    }
}

impl StepPolicy {
    /// Start from the default configuration.
    pub fn builder() -> StepPolicyConfig {
        StepPolicyConfig::default()
    }

    /// Cull threshold in GeV.
    pub fn energy_threshold(&self) -> f64 {
        self.energy_threshold
    }

    /// Transverse damping factor.
    pub fn damping_factor(&self) -> f64 {
        self.damping_factor
    }

    /// Axial acceleration factor.
    pub fn acceleration_factor(&self) -> f64 {
        self.acceleration_factor
    }

    /// Whether `track` falls under the low-energy cull.
    pub fn is_culled(&self, track: &TrackState) -> bool {
        track.species.is_cullable() && track.kinetic_energy < self.energy_threshold
    }

    /// Decide what happens to `track` on a step whose pre-step point lies
    /// in `region`.
    ///
    /// The cull is checked first and short-circuits everything else. The
    /// region rules are mutually exclusive.
    pub fn apply(&self, track: &TrackState, region: Region) -> StepOutcome {
        if self.is_culled(track) {
            trace!(
                species = %track.species,
                energy = track.kinetic_energy,
                "killing track below threshold"
            );
            return StepOutcome::KILL;
        }

        match region {
            Region::Detector(detector) => {
                debug!(
                    %detector,
                    species = %track.species,
                    energy = track.kinetic_energy,
                    "hit"
                );
                StepOutcome::hit(HitRecord::capture(detector, track))
            }
            Region::DampingZone => {
                let p = track.momentum;
                let damped = DVec3::new(
                    p.x * self.damping_factor,
                    p.y * self.damping_factor,
                    p.z,
                );
                StepOutcome::rewrite(self.rewrite(track, damped, "damping"))
            }
            Region::CavityZone => {
                let p = track.momentum;
                let boosted = DVec3::new(p.x, p.y, p.z * self.acceleration_factor);
                StepOutcome::rewrite(self.rewrite(track, boosted, "rf boost"))
            }
            Region::None => StepOutcome::CONTINUE,
        }
    }

    fn rewrite(&self, track: &TrackState, momentum: DVec3, rule: &str) -> MomentumRewrite {
        let rw = MomentumRewrite::from_momentum(momentum, track.mass);
        trace!(
            rule,
            species = %track.species,
            before = ?track.momentum,
            after = ?rw.momentum,
            energy = rw.kinetic_energy,
            "momentum rewrite"
        );
        rw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::Decision;
    use beamline_core::{Detector, Species};
    use beamline_test_utils::tracks;

    fn policy() -> StepPolicy {
        StepPolicy::builder().build().unwrap()
    }

    // ---------------------------------------------------------------
    // Builder tests
    // ---------------------------------------------------------------

    #[test]
    fn defaults() {
        let p = policy();
        assert_eq!(p.energy_threshold(), 8.0);
        assert_eq!(p.damping_factor(), 0.98);
        assert_eq!(p.acceleration_factor(), 1.005);
        assert_eq!(p, StepPolicy::default());
    }

    #[test]
    fn builder_rejects_negative_threshold() {
        let result = StepPolicy::builder().energy_threshold(-1.0).build();
        assert!(matches!(result, Err(ConfigError::Negative { .. })));
    }

    #[test]
    fn builder_rejects_amplifying_damping() {
        let result = StepPolicy::builder().damping_factor(1.2).build();
        assert_eq!(
            result,
            Err(ConfigError::OutOfInterval {
                name: "policy.damping_factor",
                value: 1.2,
                interval: "(0, 1]",
            })
        );
        assert!(StepPolicy::builder().damping_factor(1.0).build().is_ok());
        let result = StepPolicy::builder().damping_factor(0.0).build();
        assert!(result.is_err());
    }

    #[test]
    fn builder_rejects_nan_acceleration() {
        let result = StepPolicy::builder().acceleration_factor(f64::NAN).build();
        assert!(matches!(result, Err(ConfigError::NonFinite { .. })));
    }

    // ---------------------------------------------------------------
    // Cull rule
    // ---------------------------------------------------------------

    #[test]
    fn neutron_below_threshold_is_killed() {
        let t = tracks::with_energy(Species::Neutron, 7.9);
        let out = policy().apply(&t, Region::None);
        assert_eq!(out.decision, Decision::Kill);
        assert!(out.rewrite.is_none());
        assert!(out.hit.is_none());
    }

    #[test]
    fn neutron_above_threshold_survives() {
        let t = tracks::with_energy(Species::Neutron, 8.1);
        assert_eq!(policy().apply(&t, Region::None).decision, Decision::Continue);
    }

    #[test]
    fn threshold_is_strict() {
        let t = tracks::with_energy(Species::Gamma, 8.0);
        assert!(!policy().is_culled(&t));
    }

    #[test]
    fn electrons_and_gammas_are_culled() {
        for s in [Species::Electron, Species::Gamma] {
            let t = tracks::with_energy(s, 1.0);
            assert!(policy().apply(&t, Region::None).is_kill(), "{s} not culled");
        }
    }

    #[test]
    fn muons_are_never_culled() {
        let t = tracks::with_energy(Species::MuMinus, 0.5);
        assert!(!policy().apply(&t, Region::None).is_kill());
    }

    #[test]
    fn cull_preempts_detector_hit() {
        let t = tracks::with_energy(Species::Neutron, 1.0);
        let out = policy().apply(&t, Detector::Detector1.into());
        assert!(out.is_kill());
        assert!(out.hit.is_none());
    }

    #[test]
    fn cull_preempts_damping() {
        let t = tracks::with_energy(Species::Electron, 2.0);
        let out = policy().apply(&t, Region::DampingZone);
        assert!(out.is_kill());
        assert!(out.rewrite.is_none());
    }

    // ---------------------------------------------------------------
    // Region rules
    // ---------------------------------------------------------------

    #[test]
    fn detector_region_records_one_hit() {
        let t = tracks::muon_at(DVec3::new(1.0, -2.0, 200.0), 2.0);
        let out = policy().apply(&t, Detector::Detector2.into());
        assert_eq!(out.decision, Decision::Continue);
        assert!(out.rewrite.is_none());
        let hit = out.hit.unwrap();
        assert_eq!(hit.detector, Detector::Detector2);
        assert_eq!(hit.species, Species::MuPlus);
        assert_eq!(hit.position, t.position);
        assert_eq!(hit.momentum, t.momentum);
        assert_eq!(hit.kinetic_energy, t.kinetic_energy);
    }

    #[test]
    fn damping_scales_transverse_only() {
        let t = TrackState::new(Species::Proton, DVec3::ZERO, DVec3::new(1.0, 1.0, 10.0));
        let out = policy().apply(&t, Region::DampingZone);
        assert_eq!(out.decision, Decision::Continue);
        assert!(out.hit.is_none());
        let rw = out.rewrite.unwrap();
        assert!((rw.momentum - DVec3::new(0.98, 0.98, 10.0)).length() < 1e-12);
        let m = Species::Proton.rest_mass();
        let expected = (0.98f64 * 0.98 * 2.0 + 100.0 + m * m).sqrt() - m;
        assert!((rw.kinetic_energy - expected).abs() < 1e-12);
        assert!(rw.kinetic_energy < t.kinetic_energy);
    }

    #[test]
    fn cavity_scales_axial_only() {
        let t = TrackState::new(Species::PiPlus, DVec3::ZERO, DVec3::new(0.3, -0.2, 5.0));
        let out = policy().apply(&t, Region::CavityZone);
        let rw = out.rewrite.unwrap();
        assert_eq!(rw.momentum.x, 0.3);
        assert_eq!(rw.momentum.y, -0.2);
        assert!((rw.momentum.z - 5.025).abs() < 1e-12);
        assert!(rw.kinetic_energy > t.kinetic_energy);
        assert!(out.hit.is_none());
    }

    #[test]
    fn no_region_has_no_side_effects() {
        let t = tracks::muon_at(DVec3::new(0.0, 0.0, 100.0), 3.0);
        assert_eq!(policy().apply(&t, Region::None), StepOutcome::CONTINUE);
    }

    #[test]
    fn rewrite_uses_track_mass_override() {
        let t = TrackState::new(Species::Other, DVec3::ZERO, DVec3::new(0.0, 0.0, 2.0))
            .with_mass(0.4937);
        let rw = policy().apply(&t, Region::CavityZone).rewrite.unwrap();
        let p = 2.0 * 1.005;
        assert!((rw.kinetic_energy - ((p * p + 0.4937 * 0.4937f64).sqrt() - 0.4937)).abs() < 1e-12);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn rewrites_stay_on_shell(
                px in -5.0f64..5.0,
                py in -5.0f64..5.0,
                pz in 0.1f64..50.0,
                in_cavity in any::<bool>(),
            ) {
                let t = TrackState::new(Species::MuMinus, DVec3::ZERO, DVec3::new(px, py, pz));
                let region = if in_cavity { Region::CavityZone } else { Region::DampingZone };
                let mut after = t;
                policy().apply(&t, region).apply_to(&mut after);
                let e = after.kinetic_energy + after.mass;
                let p2 = after.momentum.length_squared();
                prop_assert!((e * e - p2 - after.mass * after.mass).abs() < 1e-9 * (1.0 + e * e));
            }
        }
    }
}
