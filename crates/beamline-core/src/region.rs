//! Named beamline regions and the region-membership oracle.

use std::fmt;

use glam::DVec3;

/// One of the three detector planes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Detector {
    /// First plane, just downstream of the target.
    Detector1,
    /// Second plane, upstream of the damping region.
    Detector2,
    /// Third plane, downstream of the RF cavity.
    Detector3,
}

impl Detector {
    /// All detectors in report order.
    pub const ALL: [Detector; 3] = [Detector::Detector1, Detector::Detector2, Detector::Detector3];

    /// Name used in persisted tables and the run summary.
    pub fn name(self) -> &'static str {
        match self {
            Self::Detector1 => "Detector1",
            Self::Detector2 => "Detector2",
            Self::Detector3 => "Detector3",
        }
    }

    /// Position of this detector in [`Detector::ALL`].
    pub fn index(self) -> usize {
        match self {
            Self::Detector1 => 0,
            Self::Detector2 => 1,
            Self::Detector3 => 2,
        }
    }

    /// Look up a detector by its table name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.name() == name)
    }
}

impl fmt::Display for Detector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A named, non-overlapping spatial zone with an associated step rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Region {
    /// Outside every named zone. No step rule applies.
    None,
    /// A detector plane. Steps here record hits.
    Detector(Detector),
    /// Gas-damping region. Steps here damp transverse momentum.
    DampingZone,
    /// RF cavity. Steps here boost axial momentum.
    CavityZone,
}

impl Region {
    /// Geometry name of the region, `None` for [`Region::None`].
    pub fn name(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Detector(d) => Some(d.name()),
            Self::DampingZone => Some("HeliumCloud"),
            Self::CavityZone => Some("RFCavity"),
        }
    }

    /// The detector, if this is a detector region.
    pub fn detector(self) -> Option<Detector> {
        match self {
            Self::Detector(d) => Some(d),
            _ => None,
        }
    }
}

impl From<Detector> for Region {
    fn from(d: Detector) -> Self {
        Self::Detector(d)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name().unwrap_or("None"))
    }
}

/// Region membership supplied by the geometry subsystem.
///
/// # Contract
///
/// - `classify()` is a pure function of position; time never matters.
/// - Regions never overlap, so every point maps to exactly one [`Region`].
/// - Called once per transport step from many worker threads concurrently.
pub trait RegionOracle: Send + Sync {
    /// Classify a point (cm) into the region that contains it.
    fn classify(&self, position: DVec3) -> Region;
}

impl<T: RegionOracle + ?Sized> RegionOracle for std::sync::Arc<T> {
    fn classify(&self, position: DVec3) -> Region {
        (**self).classify(position)
    }
}

impl<T: RegionOracle + ?Sized> RegionOracle for &T {
    fn classify(&self, position: DVec3) -> Region {
        (**self).classify(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detector_names_round_trip() {
        for d in Detector::ALL {
            assert_eq!(Detector::from_name(d.name()), Some(d));
        }
        assert_eq!(Detector::from_name("Detector4"), None);
    }

    #[test]
    fn detector_order_matches_index() {
        for (i, d) in Detector::ALL.iter().enumerate() {
            assert_eq!(d.index(), i);
        }
    }

    #[test]
    fn region_names() {
        assert_eq!(Region::None.name(), None);
        assert_eq!(Region::from(Detector::Detector2).name(), Some("Detector2"));
        assert_eq!(Region::DampingZone.name(), Some("HeliumCloud"));
        assert_eq!(Region::CavityZone.to_string(), "RFCavity");
        assert_eq!(Region::None.to_string(), "None");
    }

    #[test]
    fn detector_accessor() {
        assert_eq!(
            Region::Detector(Detector::Detector3).detector(),
            Some(Detector::Detector3)
        );
        assert_eq!(Region::CavityZone.detector(), None);
    }
}
