//! Per-step state-update policy for the beamline.
//!
//! The transport kernel calls [`StepPolicy::apply`] once per step with the
//! pre-step track state and the region the pre-step point lies in. The
//! policy answers with a [`StepOutcome`]:
//!
//! 1. cull low-energy neutrons, electrons and photons ([`Decision::Kill`]);
//! 2. capture a [`HitRecord`](beamline_core::HitRecord) in detector planes;
//! 3. damp transverse momentum in the damping zone;
//! 4. boost axial momentum in the RF cavity;
//! 5. otherwise do nothing.
//!
//! Momentum rewrites always re-derive kinetic energy from the new momentum,
//! so a rewritten track stays on its mass shell.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod outcome;
pub mod policy;

pub use outcome::{Decision, MomentumRewrite, StepOutcome};
pub use policy::{StepPolicy, StepPolicyConfig};
