//! Longitudinal magnetic guide field.
//!
//! The field points along the beam axis and is shaped by two profiles:
//! ```text
//! axial:  0 at z_min, rising linearly to 1 at z_min + taper,
//!         1 in the flat top, falling linearly to 0 at z_max
//! radial: 1 - r / max_radius for r <= max_radius, 0 beyond
//! Bz = max_field * axial * radial
//! ```
//! There is no electric component and no time dependence.

use beamline_core::{ConfigError, DVec3, FieldModel, FieldValue};
use serde::{Deserialize, Serialize};

/// Configuration (and builder) for [`GuideField`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuideFieldConfig {
    /// Peak field on axis, tesla. Default: 7.0.
    pub max_field: f64,
    /// Upstream edge of the field window, cm. Default: -200.
    pub z_min: f64,
    /// Downstream edge of the field window, cm. Default: 1000.
    pub z_max: f64,
    /// Length of the linear taper at each edge, cm. Default: 50.
    pub taper_length: f64,
    /// Radius beyond which the field is zero, cm. Default: 90.
    pub max_radius: f64,
}

impl Default for GuideFieldConfig {
    fn default() -> Self {
        Self {
            max_field: 7.0,
            z_min: -200.0,
            z_max: 1000.0,
            taper_length: 50.0,
            max_radius: 90.0,
        }
    }
}

impl GuideFieldConfig {
    /// Set the peak field (tesla).
    pub fn max_field(mut self, tesla: f64) -> Self {
        self.max_field = tesla;
        self
    }

    /// Set the axial window (cm).
    pub fn window(mut self, z_min: f64, z_max: f64) -> Self {
        self.z_min = z_min;
        self.z_max = z_max;
        self
    }

    /// Set the edge taper length (cm).
    pub fn taper_length(mut self, cm: f64) -> Self {
        self.taper_length = cm;
        self
    }

    /// Set the radial cutoff (cm).
    pub fn max_radius(mut self, cm: f64) -> Self {
        self.max_radius = cm;
        self
    }

    /// Validate and build the field.
    ///
    /// # Errors
    ///
    /// Returns `Err` if:
    /// - any value is NaN or infinite
    /// - `z_min >= z_max`
    /// - `taper_length` is negative or the two tapers overlap
    /// - `max_radius` is not > 0
    pub fn build(self) -> Result<GuideField, ConfigError> {
        ConfigError::check_finite("guide.max_field", self.max_field)?;
        let (z_min, z_max) = ConfigError::check_range("guide.z", self.z_min, self.z_max)?;
        let taper = ConfigError::check_non_negative("guide.taper_length", self.taper_length)?;
        if 2.0 * taper > z_max - z_min {
            return Err(ConfigError::DoesNotFit {
                name: "guide.taper_length",
                length: taper,
                window: z_max - z_min,
            });
        }
        let max_radius = ConfigError::check_positive("guide.max_radius", self.max_radius)?;

        Ok(GuideField {
            max_field: self.max_field,
            z_min,
            z_max,
            taper,
            max_radius,
        })
    }
}

/// Static solenoid-like guide field along the beam axis.
#[derive(Clone, Debug, PartialEq)]
pub struct GuideField {
    max_field: f64,
    z_min: f64,
    z_max: f64,
    taper: f64,
    max_radius: f64,
}

impl GuideField {
    /// Start from the default configuration.
    pub fn builder() -> GuideFieldConfig {
        GuideFieldConfig::default()
    }

    /// Peak field in tesla.
    pub fn max_field(&self) -> f64 {
        self.max_field
    }

    /// Axial window `(z_min, z_max)` in cm.
    pub fn window(&self) -> (f64, f64) {
        (self.z_min, self.z_max)
    }

    /// Edge taper length in cm.
    pub fn taper_length(&self) -> f64 {
        self.taper
    }

    /// Radial cutoff in cm.
    pub fn max_radius(&self) -> f64 {
        self.max_radius
    }

    /// Axial strength factor in `[0, 1]`; zero outside the window.
    pub fn axial_factor(&self, z: f64) -> f64 {
        if z < self.z_min || z > self.z_max {
            return 0.0;
        }
        if z < self.z_min + self.taper {
            (z - self.z_min) / self.taper
        } else if z > self.z_max - self.taper {
            (self.z_max - z) / self.taper
        } else {
            1.0
        }
    }

    /// Radial strength factor in `[0, 1]`; zero beyond `max_radius`.
    pub fn radial_factor(&self, r: f64) -> f64 {
        if r > self.max_radius {
            0.0
        } else {
            1.0 - r / self.max_radius
        }
    }
}

impl FieldModel for GuideField {
    fn evaluate(&self, position: DVec3, _t: f64) -> FieldValue {
        let axial = self.axial_factor(position.z);
        if axial == 0.0 {
            return FieldValue::ZERO;
        }
        let r = position.x.hypot(position.y);
        if r > self.max_radius {
            return FieldValue::ZERO;
        }
        let bz = self.max_field * axial * self.radial_factor(r);
        FieldValue::magnetic(DVec3::new(0.0, 0.0, bz))
    }
}
