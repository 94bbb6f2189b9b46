//! Region-aware composition of the guide and cavity fields.
//!
//! The guide field is the global detector field. The cavity carries its own
//! local field, which replaces the global one for every point the region
//! oracle places inside [`Region::CavityZone`].

use std::sync::Arc;

use beamline_core::{DVec3, FieldModel, FieldValue, Region, RegionOracle};

use crate::cavity::CavityField;
use crate::guide::GuideField;

/// Guide field everywhere, cavity field inside the cavity region.
#[derive(Clone)]
pub struct BeamlineField {
    guide: GuideField,
    cavity: CavityField,
    oracle: Arc<dyn RegionOracle>,
}

impl BeamlineField {
    /// Combine the two models using `oracle` to locate the cavity.
    pub fn new(guide: GuideField, cavity: CavityField, oracle: Arc<dyn RegionOracle>) -> Self {
        Self {
            guide,
            cavity,
            oracle,
        }
    }

    /// The global guide field.
    pub fn guide(&self) -> &GuideField {
        &self.guide
    }

    /// The cavity's local field.
    pub fn cavity(&self) -> &CavityField {
        &self.cavity
    }
}

impl FieldModel for BeamlineField {
    fn evaluate(&self, position: DVec3, t: f64) -> FieldValue {
        match self.oracle.classify(position) {
            Region::CavityZone => self.cavity.evaluate(position, t),
            _ => self.guide.evaluate(position, t),
        }
    }

    fn is_time_dependent(&self) -> bool {
        true
    }
}

impl std::fmt::Debug for BeamlineField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BeamlineField")
            .field("guide", &self.guide)
            .field("cavity", &self.cavity)
            .finish_non_exhaustive()
    }
}
