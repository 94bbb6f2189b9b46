//! Fixed-step reference transport kernel.
//!
//! Pushes one track through a [`FieldModel`] with explicit Euler steps of
//! constant path length, calling the per-step hook at every pre-step
//! point. There are no secondaries, no scattering and no energy loss: the
//! kernel exists to drive the step policy and the aggregators end to end,
//! not to do physics.

use std::sync::Arc;

use beamline_core::track::kinetic_energy;
use beamline_core::units::{CM_PER_M, C_LIGHT, GEV_PER_TESLA_METRE, TESLA_PER_MV_PER_M};
use beamline_core::{ConfigError, FieldModel, TrackState};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::actions::WorkerActions;
use crate::geometry::BeamlineGeometry;

/// Configuration for [`ReferenceKernel`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Path length per step, cm. Default: 1.
    pub step_length: f64,
    /// Steps after which a track is abandoned. Default: 10000.
    pub max_steps: u32,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            step_length: 1.0,
            max_steps: 10_000,
        }
    }
}

impl KernelConfig {
    /// Set the step length (cm).
    pub fn step_length(mut self, cm: f64) -> Self {
        self.step_length = cm;
        self
    }

    /// Set the step limit.
    pub fn max_steps(mut self, n: u32) -> Self {
        self.max_steps = n;
        self
    }

    /// Check the step parameters without building a kernel.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `step_length` is not finite and positive or
    /// `max_steps` is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check_positive("kernel.step_length", self.step_length)?;
        if self.max_steps == 0 {
            return Err(ConfigError::NonPositive {
                name: "kernel.max_steps",
                value: 0.0,
            });
        }
        Ok(())
    }

    /// Validate and build a kernel over `field` inside `geometry`.
    ///
    /// # Errors
    ///
    /// See [`validate`](Self::validate).
    pub fn build(
        self,
        field: Arc<dyn FieldModel>,
        geometry: Arc<BeamlineGeometry>,
    ) -> Result<ReferenceKernel, ConfigError> {
        self.validate()?;
        Ok(ReferenceKernel {
            field,
            geometry,
            step_length: self.step_length,
            max_steps: self.max_steps,
        })
    }
}

/// Why a track stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackExit {
    /// The step policy killed it.
    Killed,
    /// It left the experimental hall.
    LeftWorld,
    /// Its momentum vanished.
    Stopped,
    /// It hit the step limit.
    StepLimit,
}

/// Outcome of transporting one track.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackSummary {
    /// Steps taken, including the one on which the track was killed.
    pub steps: u32,
    /// Detector hits recorded along the way.
    pub hits: u32,
    /// Why transport ended.
    pub exit: TrackExit,
    /// State after the last step.
    pub final_state: TrackState,
}

impl TrackSummary {
    /// Whether the step policy killed the track.
    pub fn killed(&self) -> bool {
        self.exit == TrackExit::Killed
    }
}

/// Fixed-step Lorentz-force integrator.
#[derive(Clone)]
pub struct ReferenceKernel {
    field: Arc<dyn FieldModel>,
    geometry: Arc<BeamlineGeometry>,
    step_length: f64,
    max_steps: u32,
}

impl ReferenceKernel {
    /// Start from the default configuration.
    pub fn builder() -> KernelConfig {
        KernelConfig::default()
    }

    /// Path length per step, cm.
    pub fn step_length(&self) -> f64 {
        self.step_length
    }

    /// Transport `primary` until it is killed, stops, leaves the hall or
    /// hits the step limit.
    ///
    /// Each step: classify and apply the policy at the pre-step point via
    /// `worker`, stop on a kill, apply any momentum rewrite, then push.
    pub fn transport(&self, primary: TrackState, worker: &mut WorkerActions) -> TrackSummary {
        let mut track = primary;
        let mut steps = 0;
        let mut hits = 0;

        let exit = loop {
            if steps >= self.max_steps {
                break TrackExit::StepLimit;
            }
            if !self.geometry.contains_world(track.position) {
                break TrackExit::LeftWorld;
            }

            let outcome = worker.per_step(&track);
            steps += 1;
            if outcome.hit.is_some() {
                hits += 1;
            }
            if outcome.is_kill() {
                break TrackExit::Killed;
            }
            outcome.apply_to(&mut track);

            if !self.push(&mut track) {
                break TrackExit::Stopped;
            }
        };

        trace!(
            species = %track.species,
            steps,
            hits,
            ?exit,
            energy = track.kinetic_energy,
            "track finished"
        );
        TrackSummary {
            steps,
            hits,
            exit,
            final_state: track,
        }
    }

    /// Advance `track` by one step. Returns `false` for a track at rest.
    ///
    /// `dp = q (E/c · c dt + û × B · ds)` in GeV/c, with fields sampled at
    /// the pre-step point and time.
    fn push(&self, track: &mut TrackState) -> bool {
        let beta = track.beta();
        let dir = track.direction();
        if beta <= 0.0 {
            return false;
        }

        let ds = self.step_length;
        let dt = ds / (beta * C_LIGHT);
        let q = track.species.charge();
        if q != 0.0 {
            let f = self.field.evaluate(track.position, track.time);
            let ds_m = ds / CM_PER_M;
            let c_dt_m = C_LIGHT * dt / CM_PER_M;
            let kick = dir.cross(f.b) * ds_m + f.e * TESLA_PER_MV_PER_M * c_dt_m;
            track.momentum += GEV_PER_TESLA_METRE * q * kick;
            track.kinetic_energy = kinetic_energy(track.momentum.length(), track.mass);
        }

        track.position += dir * ds;
        track.time += dt;
        true
    }
}

impl std::fmt::Debug for ReferenceKernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceKernel")
            .field("step_length", &self.step_length)
            .field("max_steps", &self.max_steps)
            .finish_non_exhaustive()
    }
}
