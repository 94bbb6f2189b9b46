//! Primary particle source.
//!
//! One primary per event. Every event draws from its own
//! `ChaCha8Rng` seeded with `seed ^ event_id`, so the primary for a given
//! event does not depend on which worker runs it or in what order.

use beamline_core::{ConfigError, DVec3, EventId, Species, TrackState};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Configuration (and builder) for [`PrimaryBeam`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeamConfig {
    /// Primary species. Default: proton.
    pub species: Species,
    /// Rest mass override in GeV, for species without a built-in mass.
    pub mass: Option<f64>,
    /// Mean kinetic energy, GeV. Default: 8.
    pub energy: f64,
    /// Gaussian sigma of the kinetic energy, GeV. Default: 0.
    pub energy_spread: f64,
    /// Source position, cm. Default: (0, 0, -50).
    pub origin: DVec3,
    /// Tilt from the z axis in the y-z plane, degrees. Default: 10.
    pub angle_deg: f64,
    /// Gaussian sigma of the transverse spot, cm. Default: 0.
    pub spot_size: f64,
}

impl Default for BeamConfig {
    fn default() -> Self {
        Self {
            species: Species::Proton,
            mass: None,
            energy: 8.0,
            energy_spread: 0.0,
            origin: DVec3::new(0.0, 0.0, -50.0),
            angle_deg: 10.0,
            spot_size: 0.0,
        }
    }
}

impl BeamConfig {
    /// Set the primary species.
    pub fn species(mut self, species: Species) -> Self {
        self.species = species;
        self
    }

    /// Set the mean kinetic energy (GeV).
    pub fn energy(mut self, gev: f64) -> Self {
        self.energy = gev;
        self
    }

    /// Set the energy spread (GeV).
    pub fn energy_spread(mut self, gev: f64) -> Self {
        self.energy_spread = gev;
        self
    }

    /// Set the source position (cm).
    pub fn origin(mut self, origin: DVec3) -> Self {
        self.origin = origin;
        self
    }

    /// Set the tilt from the z axis (degrees).
    pub fn angle_deg(mut self, degrees: f64) -> Self {
        self.angle_deg = degrees;
        self
    }

    /// Set the transverse spot size (cm).
    pub fn spot_size(mut self, cm: f64) -> Self {
        self.spot_size = cm;
        self
    }

    /// Validate and build the beam.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the energy is not positive, a spread is negative,
    /// the mass override is negative, or any value is not finite.
    pub fn build(self) -> Result<PrimaryBeam, ConfigError> {
        let energy = ConfigError::check_positive("beam.energy", self.energy)?;
        let energy_spread = ConfigError::check_non_negative("beam.energy_spread", self.energy_spread)?;
        let spot_size = ConfigError::check_non_negative("beam.spot_size", self.spot_size)?;
        let angle = ConfigError::check_finite("beam.angle_deg", self.angle_deg)?.to_radians();
        for c in self.origin.to_array() {
            ConfigError::check_finite("beam.origin", c)?;
        }
        let mass = match self.mass {
            Some(m) => ConfigError::check_non_negative("beam.mass", m)?,
            None => self.species.rest_mass(),
        };

        Ok(PrimaryBeam {
            species: self.species,
            mass,
            energy,
            energy_spread,
            origin: self.origin,
            direction: DVec3::new(0.0, angle.sin(), angle.cos()),
            spot_size,
        })
    }
}

/// Deterministic per-event primary generator.
#[derive(Clone, Debug, PartialEq)]
pub struct PrimaryBeam {
    species: Species,
    mass: f64,
    energy: f64,
    energy_spread: f64,
    origin: DVec3,
    direction: DVec3,
    spot_size: f64,
}

impl PrimaryBeam {
    /// Start from the default configuration.
    pub fn builder() -> BeamConfig {
        BeamConfig::default()
    }

    /// Primary species.
    pub fn species(&self) -> Species {
        self.species
    }

    /// Unit direction of every primary.
    pub fn direction(&self) -> DVec3 {
        self.direction
    }

    /// The primary for `event` under run seed `seed`.
    ///
    /// Sampled energies are clamped at zero.
    pub fn generate(&self, seed: u64, event: EventId) -> TrackState {
        let mut rng = ChaCha8Rng::seed_from_u64(seed ^ event.0);

        let mut energy = self.energy;
        if self.energy_spread > 0.0 {
            energy = (energy + self.energy_spread * gaussian(&mut rng)).max(0.0);
        }
        let mut position = self.origin;
        if self.spot_size > 0.0 {
            position.x += self.spot_size * gaussian(&mut rng);
            position.y += self.spot_size * gaussian(&mut rng);
        }

        let p = beamline_core::track::momentum_magnitude(energy, self.mass);
        TrackState {
            species: self.species,
            mass: self.mass,
            kinetic_energy: energy,
            momentum: self.direction * p,
            position,
            time: 0.0,
        }
    }
}

/// Standard normal sample by the Box-Muller transform.
fn gaussian(rng: &mut ChaCha8Rng) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(1e-300);
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_beam_matches_source_setup() {
        let beam = PrimaryBeam::builder().build().unwrap();
        let t = beam.generate(1, EventId(0));
        assert_eq!(t.species, Species::Proton);
        assert_eq!(t.kinetic_energy, 8.0);
        assert_eq!(t.position, DVec3::new(0.0, 0.0, -50.0));
        let angle = 10f64.to_radians();
        assert!((t.direction() - DVec3::new(0.0, angle.sin(), angle.cos())).length() < 1e-12);
    }

    #[test]
    fn momentum_is_on_shell() {
        let beam = PrimaryBeam::builder()
            .species(Species::MuPlus)
            .energy(2.0)
            .build()
            .unwrap();
        let t = beam.generate(0, EventId(3));
        let e = t.total_energy();
        let p = t.momentum.length();
        assert!((e * e - p * p - t.mass * t.mass).abs() < 1e-9);
    }

    #[test]
    fn same_seed_and_event_repeat() {
        let beam = PrimaryBeam::builder()
            .energy_spread(0.5)
            .spot_size(1.0)
            .build()
            .unwrap();
        assert_eq!(beam.generate(42, EventId(7)), beam.generate(42, EventId(7)));
        assert_ne!(beam.generate(42, EventId(7)), beam.generate(42, EventId(8)));
    }

    #[test]
    fn no_spread_means_no_randomness() {
        let beam = PrimaryBeam::builder().build().unwrap();
        assert_eq!(beam.generate(1, EventId(1)), beam.generate(99, EventId(5)));
    }

    #[test]
    fn mass_override_for_unknown_species() {
        let cfg = BeamConfig {
            species: Species::Other,
            mass: Some(0.4937),
            ..BeamConfig::default()
        };
        let t = cfg.build().unwrap().generate(0, EventId(0));
        assert_eq!(t.mass, 0.4937);
    }

    #[test]
    fn rejects_bad_config() {
        assert!(PrimaryBeam::builder().energy(0.0).build().is_err());
        assert!(PrimaryBeam::builder().energy_spread(-1.0).build().is_err());
        assert!(PrimaryBeam::builder()
            .origin(DVec3::new(f64::NAN, 0.0, 0.0))
            .build()
            .is_err());
    }

    #[test]
    fn deserializes_partial_json() {
        let cfg: BeamConfig =
            serde_json::from_str(r#"{ "species": "mu-", "energy": 3.5 }"#).unwrap();
        assert_eq!(cfg.species, Species::MuMinus);
        assert_eq!(cfg.energy, 3.5);
        assert_eq!(cfg.angle_deg, 10.0);
    }
}
