//! Run configuration: one JSON document for every component.
//!
//! [`BeamlineConfig`] has one section per component; every section and
//! every field inside it is optional and falls back to the reference
//! beamline. [`build()`](BeamlineConfig::build) validates all sections and
//! assembles the shared, immutable [`Beamline`].

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use beamline_core::ConfigError;
use beamline_field::{BeamlineField, CavityFieldConfig, GuideFieldConfig};
use beamline_step::{StepPolicy, StepPolicyConfig};
use serde::{Deserialize, Serialize};

use crate::geometry::{BeamlineGeometry, GeometryConfig};
use crate::gun::{BeamConfig, PrimaryBeam};
use crate::kernel::{KernelConfig, ReferenceKernel};

// ── RunConfig ─────────────────────────────────────────────────────

/// Event count, threading, seeding and output location.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Number of events per run. Default: 100.
    pub events: u64,
    /// Number of worker threads. `None` = one per available core,
    /// clamped to `[1, 64]`.
    pub worker_count: Option<usize>,
    /// Run seed; event `i` draws from `seed ^ i`. Default: 0.
    pub seed: u64,
    /// Directory receiving the CSV tables. Default: current directory.
    pub output_dir: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            events: 100,
            worker_count: None,
            seed: 0,
            output_dir: PathBuf::from("."),
        }
    }
}

impl RunConfig {
    /// Resolve the actual worker count, applying auto-detection if `None`.
    ///
    /// Explicit values are clamped to `[1, 64]`; zero workers would never
    /// drain the event queue.
    pub fn resolved_worker_count(&self) -> usize {
        match self.worker_count {
            Some(n) => n.clamp(1, 64),
            None => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
                .clamp(1, 64),
        }
    }
}

// ── BeamlineConfig ────────────────────────────────────────────────

/// Complete configuration for a beamline simulation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeamlineConfig {
    /// Longitudinal guide field.
    pub guide: GuideFieldConfig,
    /// RF cavity field.
    pub cavity: CavityFieldConfig,
    /// Per-step rules.
    pub policy: StepPolicyConfig,
    /// Region layout.
    pub geometry: GeometryConfig,
    /// Primary particle source.
    pub beam: BeamConfig,
    /// Transport step parameters.
    pub kernel: KernelConfig,
    /// Events, threads, seed, output.
    pub run: RunConfig,
}

impl BeamlineConfig {
    /// Parse a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON or unknown values.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })
    }

    /// Read and parse a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read and
    /// [`ConfigError::Parse`] if it is not a valid configuration.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_json_str(&text)
    }

    /// Check every section, reporting the first problem found.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] any component builder reports.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.build().map(|_| ())
    }

    /// Validate every section and assemble the components.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] any component builder reports.
    pub fn build(&self) -> Result<Beamline, ConfigError> {
        let guide = self.guide.clone().build()?;
        let cavity = self.cavity.clone().build()?;
        let policy = self.policy.clone().build()?;
        let geometry = Arc::new(self.geometry.clone().build()?);
        let beam = self.beam.clone().build()?;
        let field = Arc::new(BeamlineField::new(guide, cavity, geometry.clone()));
        let kernel = self.kernel.clone().build(field.clone(), geometry.clone())?;

        Ok(Beamline {
            field,
            geometry,
            policy,
            beam,
            kernel,
        })
    }
}

/// Validated, immutable components shared by every worker.
#[derive(Clone, Debug)]
pub struct Beamline {
    /// Guide plus cavity field.
    pub field: Arc<BeamlineField>,
    /// Region oracle.
    pub geometry: Arc<BeamlineGeometry>,
    /// Per-step rules.
    pub policy: StepPolicy,
    /// Primary source.
    pub beam: PrimaryBeam,
    /// Transport kernel over `field` inside `geometry`.
    pub kernel: ReferenceKernel,
}
