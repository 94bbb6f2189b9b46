//! Result of applying the step policy to one step.

use beamline_core::track::kinetic_energy;
use beamline_core::{DVec3, HitRecord, TrackState};

/// Whether the kernel keeps transporting the track.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Keep transporting.
    Continue,
    /// Stop and discard the track.
    Kill,
}

/// A consistent momentum/energy replacement for the current track.
///
/// Kinetic energy is never set independently: it is always derived from
/// the magnitude of `momentum` and the track's rest mass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MomentumRewrite {
    /// New momentum, GeV/c.
    pub momentum: DVec3,
    /// Unit direction of `momentum`; zero when the momentum vanishes.
    pub direction: DVec3,
    /// `sqrt(|p|² + m²) − m`, GeV.
    pub kinetic_energy: f64,
}

impl MomentumRewrite {
    /// Derive direction and kinetic energy for `momentum` at rest mass `mass`.
    pub fn from_momentum(momentum: DVec3, mass: f64) -> Self {
        Self {
            momentum,
            direction: momentum.normalize_or_zero(),
            kinetic_energy: kinetic_energy(momentum.length(), mass),
        }
    }
}

/// Everything the policy decided for one step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepOutcome {
    /// Continue or kill.
    pub decision: Decision,
    /// Momentum rewrite to apply, if any.
    pub rewrite: Option<MomentumRewrite>,
    /// Hit to record, if any.
    pub hit: Option<HitRecord>,
}

impl StepOutcome {
    /// Continue with no side effects.
    pub const CONTINUE: Self = Self {
        decision: Decision::Continue,
        rewrite: None,
        hit: None,
    };

    /// Kill with no side effects.
    pub const KILL: Self = Self {
        decision: Decision::Kill,
        rewrite: None,
        hit: None,
    };

    /// Continue and record `hit`.
    pub fn hit(hit: HitRecord) -> Self {
        Self {
            hit: Some(hit),
            ..Self::CONTINUE
        }
    }

    /// Continue with a momentum rewrite.
    pub fn rewrite(rewrite: MomentumRewrite) -> Self {
        Self {
            rewrite: Some(rewrite),
            ..Self::CONTINUE
        }
    }

    /// Whether the track was killed.
    pub fn is_kill(&self) -> bool {
        self.decision == Decision::Kill
    }

    /// Apply the rewrite (if any) to `track`.
    ///
    /// The track's momentum becomes `direction · |p|`, which equals the
    /// rewritten vector, and its kinetic energy the derived value.
    pub fn apply_to(&self, track: &mut TrackState) {
        if let Some(rw) = self.rewrite {
            track.momentum = rw.direction * rw.momentum.length();
            track.kinetic_energy = rw.kinetic_energy;
        }
    }
}
