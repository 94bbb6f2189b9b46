//! End-of-run particle detection summary.

use std::fmt;

use beamline_core::{Detector, Species};

/// Counts for one (detector, species) pair with at least one particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SummaryRow {
    /// Detector.
    pub detector: Detector,
    /// Tracked species.
    pub species: Species,
    /// Number of particles, always > 0.
    pub count: u64,
    /// Summed kinetic energy, GeV.
    pub total_energy: f64,
}

impl SummaryRow {
    /// Mean kinetic energy, GeV.
    pub fn average_energy(&self) -> f64 {
        self.total_energy / self.count as f64
    }
}

/// Sum over every tracked species in one detector.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectorTotal {
    /// Detector.
    pub detector: Detector,
    /// Number of particles.
    pub count: u64,
    /// Summed kinetic energy, GeV.
    pub total_energy: f64,
}

impl DetectorTotal {
    /// Mean kinetic energy, GeV; zero for an empty detector.
    pub fn average_energy(&self) -> f64 {
        mean(self.total_energy, self.count)
    }
}

/// Deterministic end-of-run report.
///
/// Rows are ordered by detector in declared order, then by species in
/// [`Species::TRACKED`] order. A subtotal exists for every detector that
/// had at least one row. The [`Display`](fmt::Display) impl renders the
/// human-readable table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunSummary {
    rows: Vec<SummaryRow>,
    subtotals: Vec<DetectorTotal>,
    total_count: u64,
    total_energy: f64,
}

impl RunSummary {
    /// Assemble a summary; the grand total is the sum of `subtotals`.
    pub fn new(rows: Vec<SummaryRow>, subtotals: Vec<DetectorTotal>) -> Self {
        let total_count = subtotals.iter().map(|t| t.count).sum();
        let total_energy = subtotals.iter().map(|t| t.total_energy).sum();
        Self {
            rows,
            subtotals,
            total_count,
            total_energy,
        }
    }

    /// Per-(detector, species) rows.
    pub fn rows(&self) -> &[SummaryRow] {
        &self.rows
    }

    /// Per-detector subtotals, for detectors with hits only.
    pub fn subtotals(&self) -> &[DetectorTotal] {
        &self.subtotals
    }

    /// The row for one key, if any particle was recorded there.
    pub fn row(&self, detector: Detector, species: Species) -> Option<&SummaryRow> {
        self.rows
            .iter()
            .find(|r| r.detector == detector && r.species == species)
    }

    /// The subtotal for `detector`, if it had any hits.
    pub fn subtotal(&self, detector: Detector) -> Option<&DetectorTotal> {
        self.subtotals.iter().find(|t| t.detector == detector)
    }

    /// Whether no tracked particle was recorded at all.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Particles across every detector.
    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    /// Energy across every detector, GeV.
    pub fn total_energy(&self) -> f64 {
        self.total_energy
    }

    /// Mean energy across every detector, GeV; zero when empty.
    pub fn average_energy(&self) -> f64 {
        mean(self.total_energy, self.total_count)
    }
}

const RULE_HEAVY: &str = "================================================================";
const RULE_LIGHT: &str = "----------------------------------------------------------------";

fn line(
    f: &mut fmt::Formatter<'_>,
    detector: &str,
    particle: &str,
    count: u64,
    total: f64,
    average: f64,
) -> fmt::Result {
    writeln!(
        f,
        "{:>12} | {:>10} | {:>10} | {:>15} | {:>15}",
        detector,
        particle,
        count,
        format_energy(total),
        format_energy(average)
    )
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{RULE_HEAVY}")?;
        writeln!(f, "{:^64}", "PARTICLE DETECTION SUMMARY")?;
        writeln!(f, "{RULE_HEAVY}")?;
        writeln!(
            f,
            "{:>12} | {:>10} | {:>10} | {:>15} | {:>15}",
            "Detector", "Particle", "Count", "Total Energy", "Average Energy"
        )?;
        writeln!(f, "{RULE_LIGHT}")?;

        for subtotal in &self.subtotals {
            for row in self.rows.iter().filter(|r| r.detector == subtotal.detector) {
                line(
                    f,
                    row.detector.name(),
                    row.species.name(),
                    row.count,
                    row.total_energy,
                    row.average_energy(),
                )?;
            }
            writeln!(f, "{RULE_LIGHT}")?;
            line(
                f,
                subtotal.detector.name(),
                "TOTAL",
                subtotal.count,
                subtotal.total_energy,
                subtotal.average_energy(),
            )?;
            writeln!(f, "{RULE_LIGHT}")?;
        }

        line(
            f,
            "ALL",
            "TOTAL",
            self.total_count,
            self.total_energy,
            self.average_energy(),
        )?;
        write!(f, "{RULE_HEAVY}")
    }
}

fn mean(total: f64, count: u64) -> f64 {
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

/// Render an energy given in GeV with the largest unit that keeps the
/// magnitude at or above one: TeV, GeV, MeV, keV, then eV.
///
/// Six significant digits, trailing zeros trimmed.
pub fn format_energy(gev: f64) -> String {
    const UNITS: [(&str, f64); 5] = [
        ("TeV", 1e3),
        ("GeV", 1.0),
        ("MeV", 1e-3),
        ("keV", 1e-6),
        ("eV", 1e-9),
    ];

    if gev == 0.0 || !gev.is_finite() {
        return format!("{gev} GeV");
    }
    let magnitude = gev.abs();
    let (unit, scale) = UNITS
        .iter()
        .copied()
        .find(|(_, scale)| magnitude >= *scale)
        .unwrap_or(UNITS[UNITS.len() - 1]);
    let value = gev / scale;

    let digits = value.abs().log10().floor() as i32;
    let decimals = (5 - digits).max(0) as usize;
    let mut text = format!("{value:.decimals$}");
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }
    format!("{text} {unit}")
}
