//! Unit system and physical constants.
//!
//! Internal units: length in cm, time in ns, energy and mass in GeV,
//! momentum in GeV/c, magnetic field in tesla, electric field in MV/m,
//! frequency in GHz. Persisted tables use the same units, so values are
//! written without conversion.

/// Speed of light in cm/ns.
pub const C_LIGHT: f64 = 29.979_245_8;

/// Momentum kick per unit charge, field and path length: GeV/c per (T·m).
pub const GEV_PER_TESLA_METRE: f64 = 0.299_792_458;

/// Centimetres per metre.
pub const CM_PER_M: f64 = 100.0;

/// Tesla-equivalent of 1 MV/m for a particle moving at `c`.
///
/// `E/c` with E in V/m and c in m/s gives tesla; 1 MV/m / c ≈ 3.3356e-3 T.
pub const TESLA_PER_MV_PER_M: f64 = 1.0e6 / 299_792_458.0;

/// Rest masses in GeV (PDG values).
pub mod mass {
    /// Proton rest mass.
    pub const PROTON: f64 = 0.938_272_088;
    /// Neutron rest mass.
    pub const NEUTRON: f64 = 0.939_565_42;
    /// Electron rest mass.
    pub const ELECTRON: f64 = 0.000_510_998_95;
    /// Muon rest mass.
    pub const MUON: f64 = 0.105_658_375;
    /// Charged pion rest mass.
    pub const PION_CHARGED: f64 = 0.139_570_39;
    /// Neutral pion rest mass.
    pub const PION_NEUTRAL: f64 = 0.134_976_8;
}
