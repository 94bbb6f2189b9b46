//! Analytic field models for the beamline.
//!
//! Two models implement [`FieldModel`](beamline_core::FieldModel):
//!
//! - [`GuideField`]: static longitudinal magnetic guide field with linear
//!   edge tapers and a linear radial falloff.
//! - [`CavityField`]: time-dependent standing-wave accelerating field in a
//!   cylindrical RF cavity.
//!
//! [`BeamlineField`] combines them the way the beamline is wired: the guide
//! field is global and the cavity field replaces it inside the cavity.
//!
//! Both models are constructed from serde-friendly configs that double as
//! builders; [`build()`](GuideFieldConfig::build) validates the geometry.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod cavity;
pub mod composite;
pub mod guide;

pub use cavity::{CavityField, CavityFieldConfig};
pub use composite::BeamlineField;
pub use guide::{GuideField, GuideFieldConfig};
