//! Particle species known to the core.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::units::mass;

/// Particle species identifier.
///
/// Anything the transport kernel produces that is not one of the named
/// variants is reported as [`Species::Other`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Species {
    /// Proton.
    #[serde(rename = "proton")]
    Proton,
    /// Neutron.
    #[serde(rename = "neutron")]
    Neutron,
    /// Electron.
    #[serde(rename = "e-")]
    Electron,
    /// Photon.
    #[serde(rename = "gamma")]
    Gamma,
    /// Positive muon.
    #[serde(rename = "mu+")]
    MuPlus,
    /// Negative muon.
    #[serde(rename = "mu-")]
    MuMinus,
    /// Positive pion.
    #[serde(rename = "pi+")]
    PiPlus,
    /// Negative pion.
    #[serde(rename = "pi-")]
    PiMinus,
    /// Neutral pion.
    #[serde(rename = "pi0")]
    PiZero,
    /// Any other species.
    #[serde(rename = "other")]
    Other,
}

impl Species {
    /// Species whose detector hits are persisted and counted, in report order.
    pub const TRACKED: [Species; 5] = [
        Species::MuPlus,
        Species::MuMinus,
        Species::PiPlus,
        Species::PiMinus,
        Species::PiZero,
    ];

    /// Species culled below the energy threshold.
    pub const CULLABLE: [Species; 3] = [Species::Neutron, Species::Electron, Species::Gamma];

    /// Canonical name, as written to the particle table.
    pub fn name(self) -> &'static str {
        match self {
            Self::Proton => "proton",
            Self::Neutron => "neutron",
            Self::Electron => "e-",
            Self::Gamma => "gamma",
            Self::MuPlus => "mu+",
            Self::MuMinus => "mu-",
            Self::PiPlus => "pi+",
            Self::PiMinus => "pi-",
            Self::PiZero => "pi0",
            Self::Other => "other",
        }
    }

    /// Rest mass in GeV. `Other` has no known mass and reports zero.
    pub fn rest_mass(self) -> f64 {
        match self {
            Self::Proton => mass::PROTON,
            Self::Neutron => mass::NEUTRON,
            Self::Electron => mass::ELECTRON,
            Self::Gamma | Self::Other => 0.0,
            Self::MuPlus | Self::MuMinus => mass::MUON,
            Self::PiPlus | Self::PiMinus => mass::PION_CHARGED,
            Self::PiZero => mass::PION_NEUTRAL,
        }
    }

    /// Electric charge in units of the elementary charge.
    pub fn charge(self) -> f64 {
        match self {
            Self::Proton | Self::MuPlus | Self::PiPlus => 1.0,
            Self::Electron | Self::MuMinus | Self::PiMinus => -1.0,
            Self::Neutron | Self::Gamma | Self::PiZero | Self::Other => 0.0,
        }
    }

    /// Whether hits of this species are persisted and counted.
    pub fn is_tracked(self) -> bool {
        Self::TRACKED.contains(&self)
    }

    /// Whether this species is subject to the low-energy cull.
    pub fn is_cullable(self) -> bool {
        Self::CULLABLE.contains(&self)
    }

    /// Position of this species in [`Species::TRACKED`], if tracked.
    pub fn tracked_index(self) -> Option<usize> {
        Self::TRACKED.iter().position(|&s| s == self)
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Species {
    type Err = std::convert::Infallible;

    /// Parse a canonical name. Unknown names map to [`Species::Other`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "proton" => Self::Proton,
            "neutron" => Self::Neutron,
            "e-" => Self::Electron,
            "gamma" => Self::Gamma,
            "mu+" => Self::MuPlus,
            "mu-" => Self::MuMinus,
            "pi+" => Self::PiPlus,
            "pi-" => Self::PiMinus,
            "pi0" => Self::PiZero,
            _ => Self::Other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Species; 10] = [
        Species::Proton,
        Species::Neutron,
        Species::Electron,
        Species::Gamma,
        Species::MuPlus,
        Species::MuMinus,
        Species::PiPlus,
        Species::PiMinus,
        Species::PiZero,
        Species::Other,
    ];

    #[test]
    fn names_parse_back() {
        for s in ALL {
            assert_eq!(s.name().parse::<Species>().unwrap(), s);
        }
    }

    #[test]
    fn unknown_name_is_other() {
        assert_eq!("kaon+".parse::<Species>().unwrap(), Species::Other);
        assert_eq!("".parse::<Species>().unwrap(), Species::Other);
    }

    #[test]
    fn tracked_set_is_muons_and_pions() {
        let tracked: Vec<_> = ALL.iter().filter(|s| s.is_tracked()).collect();
        assert_eq!(tracked.len(), 5);
        assert!(!Species::Proton.is_tracked());
        assert!(!Species::Other.is_tracked());
        assert_eq!(Species::PiZero.tracked_index(), Some(4));
        assert_eq!(Species::Gamma.tracked_index(), None);
    }

    #[test]
    fn cullable_set() {
        assert!(Species::Neutron.is_cullable());
        assert!(Species::Electron.is_cullable());
        assert!(Species::Gamma.is_cullable());
        assert!(!Species::Proton.is_cullable());
        assert!(!Species::MuMinus.is_cullable());
    }

    #[test]
    fn charge_and_mass_signs() {
        assert_eq!(Species::MuPlus.charge(), -Species::MuMinus.charge());
        assert_eq!(Species::PiZero.charge(), 0.0);
        assert!(Species::Proton.rest_mass() > Species::PiPlus.rest_mass());
        assert_eq!(Species::Gamma.rest_mass(), 0.0);
    }

    #[test]
    fn display_matches_name() {
        assert_eq!(Species::MuPlus.to_string(), "mu+");
        assert_eq!(Species::Electron.to_string(), "e-");
    }
}
