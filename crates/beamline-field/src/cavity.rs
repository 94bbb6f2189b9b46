//! Standing-wave RF accelerating cavity field.
//!
//! Inside a cylinder `z ∈ [z_min, z_max]`, `r ≤ max_radius`:
//! ```text
//! k      = 2π f / v            (v = propagation speed)
//! ω      = 2π f
//! edge   = linear ramp 0 → 1 over edge_width at both ends
//! radial = exp(-r² / (2 (max_radius / 2)²))
//! Ez     = A cos(k (z - z_min)) cos(ω t + φ) · edge · radial
//! ```
//! All other components are zero, and everything is zero outside the
//! cylinder.

use std::f64::consts::TAU;

use beamline_core::units::C_LIGHT;
use beamline_core::{ConfigError, DVec3, FieldModel, FieldValue};
use serde::{Deserialize, Serialize};

/// Configuration (and builder) for [`CavityField`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CavityFieldConfig {
    /// Peak longitudinal field, MV/m. Default: 1.0.
    pub amplitude: f64,
    /// RF frequency, GHz. Default: 2.856 (S-band).
    pub frequency: f64,
    /// Initial RF phase, radians. Default: 0.
    pub phase: f64,
    /// Axial centre of the cavity, cm. Default: 350.
    pub center_z: f64,
    /// Half of the cavity length, cm. Default: 25.
    pub half_length: f64,
    /// Radius of the field volume, cm. Default: 40.
    pub max_radius: f64,
    /// Length of the entrance/exit ramps, cm. Default: 5.
    pub edge_width: f64,
    /// Wave propagation speed used for the wavelength, cm/ns. Default: c.
    pub propagation_speed: f64,
}

impl Default for CavityFieldConfig {
    fn default() -> Self {
        Self {
            amplitude: 1.0,
            frequency: 2.856,
            phase: 0.0,
            center_z: 350.0,
            half_length: 25.0,
            max_radius: 40.0,
            edge_width: 5.0,
            propagation_speed: C_LIGHT,
        }
    }
}

impl CavityFieldConfig {
    /// Set the peak field (MV/m).
    pub fn amplitude(mut self, mv_per_m: f64) -> Self {
        self.amplitude = mv_per_m;
        self
    }

    /// Set the RF frequency (GHz).
    pub fn frequency(mut self, ghz: f64) -> Self {
        self.frequency = ghz;
        self
    }

    /// Set the initial phase (radians).
    pub fn phase(mut self, radians: f64) -> Self {
        self.phase = radians;
        self
    }

    /// Place the cavity: centre and half length (cm).
    pub fn placement(mut self, center_z: f64, half_length: f64) -> Self {
        self.center_z = center_z;
        self.half_length = half_length;
        self
    }

    /// Set the field radius (cm).
    pub fn max_radius(mut self, cm: f64) -> Self {
        self.max_radius = cm;
        self
    }

    /// Set the edge ramp length (cm).
    pub fn edge_width(mut self, cm: f64) -> Self {
        self.edge_width = cm;
        self
    }

    /// Set the propagation speed (cm/ns).
    pub fn propagation_speed(mut self, cm_per_ns: f64) -> Self {
        self.propagation_speed = cm_per_ns;
        self
    }

    /// Validate and build the field.
    ///
    /// # Errors
    ///
    /// Returns `Err` if:
    /// - any value is NaN or infinite
    /// - `half_length`, `max_radius`, `frequency` or `propagation_speed`
    ///   is not > 0
    /// - `edge_width` is negative or the two ramps overlap
    pub fn build(self) -> Result<CavityField, ConfigError> {
        ConfigError::check_finite("cavity.amplitude", self.amplitude)?;
        ConfigError::check_finite("cavity.phase", self.phase)?;
        ConfigError::check_finite("cavity.center_z", self.center_z)?;
        let half = ConfigError::check_positive("cavity.half_length", self.half_length)?;
        let (z_min, z_max) =
            ConfigError::check_range("cavity.z", self.center_z - half, self.center_z + half)?;
        let max_radius = ConfigError::check_positive("cavity.max_radius", self.max_radius)?;
        let edge_width = ConfigError::check_non_negative("cavity.edge_width", self.edge_width)?;
        if 2.0 * edge_width > z_max - z_min {
            return Err(ConfigError::DoesNotFit {
                name: "cavity.edge_width",
                length: edge_width,
                window: z_max - z_min,
            });
        }
        let frequency = ConfigError::check_positive("cavity.frequency", self.frequency)?;
        let speed =
            ConfigError::check_positive("cavity.propagation_speed", self.propagation_speed)?;

        let wavelength = speed / frequency;
        let sigma = max_radius / 2.0;
        Ok(CavityField {
            amplitude: self.amplitude,
            frequency,
            phase: self.phase,
            z_min,
            z_max,
            max_radius,
            edge_width,
            wavenumber: TAU / wavelength,
            omega: TAU * frequency,
            two_sigma_sq: 2.0 * sigma * sigma,
        })
    }
}

/// Time-dependent longitudinal electric field of an RF cavity.
///
/// Derived quantities (`k`, `ω`, Gaussian width) are computed once at build
/// time; evaluation is a handful of multiplications and two cosines.
#[derive(Clone, Debug, PartialEq)]
pub struct CavityField {
    amplitude: f64,
    frequency: f64,
    phase: f64,
    z_min: f64,
    z_max: f64,
    max_radius: f64,
    edge_width: f64,
    wavenumber: f64,
    omega: f64,
    two_sigma_sq: f64,
}

impl CavityField {
    /// Start from the default configuration.
    pub fn builder() -> CavityFieldConfig {
        CavityFieldConfig::default()
    }

    /// Axial extent `(z_min, z_max)` in cm.
    pub fn window(&self) -> (f64, f64) {
        (self.z_min, self.z_max)
    }

    /// Field radius in cm.
    pub fn max_radius(&self) -> f64 {
        self.max_radius
    }

    /// RF frequency in GHz.
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// RF period in ns.
    pub fn period(&self) -> f64 {
        1.0 / self.frequency
    }

    /// Standing-wave wavelength in cm.
    pub fn wavelength(&self) -> f64 {
        TAU / self.wavenumber
    }

    /// Entrance/exit ramp factor in `[0, 1]`. Assumes `z` is inside the window.
    pub fn edge_factor(&self, z: f64) -> f64 {
        if z < self.z_min + self.edge_width {
            (z - self.z_min) / self.edge_width
        } else if z > self.z_max - self.edge_width {
            (self.z_max - z) / self.edge_width
        } else {
            1.0
        }
    }

    /// Gaussian radial attenuation; exactly 1 on axis.
    pub fn radial_factor(&self, r: f64) -> f64 {
        (-r * r / self.two_sigma_sq).exp()
    }

    fn contains(&self, z: f64, r: f64) -> bool {
        z >= self.z_min && z <= self.z_max && r <= self.max_radius
    }
}

impl FieldModel for CavityField {
    fn evaluate(&self, position: DVec3, t: f64) -> FieldValue {
        let mut value = FieldValue::ZERO;
        let r = position.x.hypot(position.y);
        if !self.contains(position.z, r) {
            return value;
        }

        let spatial = (self.wavenumber * (position.z - self.z_min)).cos();
        let temporal = (self.omega * t + self.phase).cos();
        value.e.z = self.amplitude
            * spatial
            * temporal
            * self.edge_factor(position.z)
            * self.radial_factor(r);
        value
    }

    fn is_time_dependent(&self) -> bool {
        true
    }
}
