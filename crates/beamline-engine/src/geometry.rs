//! Reference beamline layout and its region oracle.
//!
//! Everything is a cylinder coaxial with the z axis:
//!
//! ```text
//!   z (cm):  -2500      10      200   250   325 350 375   500      2500
//!   hall     |---------------------------------------------------------|
//!   planes            D1       D2                         D3
//!   cloud                            |=====HeliumCloud==|
//!   cavity                                  |==RF==|
//! ```
//!
//! The tungsten target at the origin carries no step rule and is reported
//! as [`Region::None`].

use beamline_core::{ConfigError, DVec3, Detector, Region, RegionOracle};
use serde::{Deserialize, Serialize};

/// Layout parameters for [`BeamlineGeometry`]. All lengths in cm.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    /// Radius of the experimental hall. Default: 100.
    pub hall_radius: f64,
    /// Full length of the hall, centred on the origin. Default: 5000.
    pub hall_length: f64,
    /// Centre z of Detector1, Detector2, Detector3. Default: 10, 200, 500.
    pub detector_z: [f64; 3],
    /// Radius of every detector plane. Default: 80.
    pub detector_radius: f64,
    /// Thickness of every detector plane. Default: 1.
    pub detector_thickness: f64,
    /// Damping zone extent along z. Default: 250 to 350.
    pub cloud_z: (f64, f64),
    /// Damping zone radius. Default: 90.
    pub cloud_radius: f64,
    /// RF cavity extent along z. Default: 325 to 375.
    pub cavity_z: (f64, f64),
    /// Inner radius of the cavity region. Default: 0, so the bore where
    /// the cavity field lives belongs to the cavity.
    pub cavity_inner_radius: f64,
    /// Outer radius of the cavity region. Default: 45.
    pub cavity_outer_radius: f64,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            hall_radius: 100.0,
            hall_length: 5000.0,
            detector_z: [10.0, 200.0, 500.0],
            detector_radius: 80.0,
            detector_thickness: 1.0,
            cloud_z: (250.0, 350.0),
            cloud_radius: 90.0,
            cavity_z: (325.0, 375.0),
            cavity_inner_radius: 0.0,
            cavity_outer_radius: 45.0,
        }
    }
}

impl GeometryConfig {
    /// Validate and build the geometry.
    ///
    /// # Errors
    ///
    /// Returns `Err` if any length is non-finite, a radius or thickness is
    /// not positive, a z range is empty, or the cavity's inner radius is
    /// not below its outer radius.
    pub fn build(self) -> Result<BeamlineGeometry, ConfigError> {
        ConfigError::check_positive("geometry.hall_radius", self.hall_radius)?;
        ConfigError::check_positive("geometry.hall_length", self.hall_length)?;
        for z in self.detector_z {
            ConfigError::check_finite("geometry.detector_z", z)?;
        }
        ConfigError::check_positive("geometry.detector_radius", self.detector_radius)?;
        ConfigError::check_positive("geometry.detector_thickness", self.detector_thickness)?;
        ConfigError::check_range("geometry.cloud_z", self.cloud_z.0, self.cloud_z.1)?;
        ConfigError::check_positive("geometry.cloud_radius", self.cloud_radius)?;
        ConfigError::check_range("geometry.cavity_z", self.cavity_z.0, self.cavity_z.1)?;
        ConfigError::check_non_negative("geometry.cavity_inner_radius", self.cavity_inner_radius)?;
        ConfigError::check_range(
            "geometry.cavity_radius",
            self.cavity_inner_radius,
            self.cavity_outer_radius,
        )?;
        Ok(BeamlineGeometry::assemble(&self))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Slab {
    z: (f64, f64),
    r: (f64, f64),
}

impl Slab {
    fn contains(&self, r: f64, z: f64) -> bool {
        z >= self.z.0 && z <= self.z.1 && r >= self.r.0 && r <= self.r.1
    }
}

/// The reference beamline as a [`RegionOracle`].
///
/// Classification precedence: detector planes, then the RF cavity, then
/// the damping zone. The cloud and the cavity overlap between 325 and 350
/// cm; the cavity wins there.
#[derive(Clone, Debug, PartialEq)]
pub struct BeamlineGeometry {
    hall_radius: f64,
    hall_half_length: f64,
    detectors: [(f64, f64); 3],
    detector_radius: f64,
    cloud: Slab,
    cavity: Slab,
}

impl Default for BeamlineGeometry {
    fn default() -> Self {
        Self::assemble(&GeometryConfig::default())
    }
}

impl BeamlineGeometry {
    fn assemble(cfg: &GeometryConfig) -> Self {
        let half = cfg.detector_thickness / 2.0;
        Self {
            hall_radius: cfg.hall_radius,
            hall_half_length: cfg.hall_length / 2.0,
            detectors: cfg.detector_z.map(|z| (z - half, z + half)),
            detector_radius: cfg.detector_radius,
            cloud: Slab {
                z: cfg.cloud_z,
                r: (0.0, cfg.cloud_radius),
            },
            cavity: Slab {
                z: cfg.cavity_z,
                r: (cfg.cavity_inner_radius, cfg.cavity_outer_radius),
            },
        }
    }

    /// Start from the default layout.
    pub fn builder() -> GeometryConfig {
        GeometryConfig::default()
    }

    /// Whether `position` is inside the experimental hall.
    pub fn contains_world(&self, position: DVec3) -> bool {
        position.z.abs() <= self.hall_half_length && radius(position) <= self.hall_radius
    }

    /// The z extent of `detector`'s plane.
    pub fn detector_span(&self, detector: Detector) -> (f64, f64) {
        self.detectors[detector.index()]
    }
}

fn radius(p: DVec3) -> f64 {
    p.x.hypot(p.y)
}

impl RegionOracle for BeamlineGeometry {
    fn classify(&self, position: DVec3) -> Region {
        let r = radius(position);
        let z = position.z;
        if r <= self.detector_radius {
            for detector in Detector::ALL {
                let (lo, hi) = self.detectors[detector.index()];
                if z >= lo && z <= hi {
                    return Region::Detector(detector);
                }
            }
        }
        if self.cavity.contains(r, z) {
            Region::CavityZone
        } else if self.cloud.contains(r, z) {
            Region::DampingZone
        } else {
            Region::None
        }
    }
}
