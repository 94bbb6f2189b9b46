//! Run-wide particle statistics shared by every worker.

use std::sync::{Mutex, MutexGuard, PoisonError};

use beamline_core::{Detector, Species};
use tracing::{debug, warn};

use crate::summary::{DetectorTotal, RunSummary, SummaryRow};

const DETECTORS: usize = Detector::ALL.len();
const TRACKED: usize = Species::TRACKED.len();

/// Count and summed kinetic energy for one (detector, species) key.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ParticleStats {
    /// Number of particles recorded.
    pub count: u64,
    /// Summed kinetic energy, GeV.
    pub total_energy: f64,
}

impl ParticleStats {
    /// Mean energy per particle, or zero when nothing was recorded.
    pub fn average_energy(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total_energy / self.count as f64
        }
    }
}

type StatsTable = [[ParticleStats; TRACKED]; DETECTORS];

/// Thread-shared per-(detector, species) counters for one run.
///
/// One instance lives for the whole run and is handed to every
/// [`EventAggregator`](crate::EventAggregator) by `Arc`. Only
/// [`increment`](Self::increment) is called concurrently; the lock is held
/// for the read-modify-write of one entry and nothing else.
///
/// The counters are plain numbers, so a lock poisoned by a panicking
/// worker is recovered rather than propagated.
#[derive(Debug, Default)]
pub struct RunAggregator {
    stats: Mutex<StatsTable>,
}

impl RunAggregator {
    /// An aggregator with every counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset every counter to zero.
    pub fn begin_run(&self) {
        *self.lock() = Default::default();
    }

    /// Count one particle of `species` with kinetic energy `energy` (GeV)
    /// in `detector`.
    ///
    /// Species outside [`Species::TRACKED`] are ignored. So are negative or
    /// non-finite energies, which would break the running totals.
    pub fn increment(&self, detector: Detector, species: Species, energy: f64) {
        let Some(s) = species.tracked_index() else {
            return;
        };
        if !(energy.is_finite() && energy >= 0.0) {
            warn!(%detector, %species, energy, "ignoring invalid particle energy");
            return;
        }
        let d = detector.index();
        let mut stats = self.lock();
        let entry = &mut stats[d][s];
        entry.count += 1;
        entry.total_energy += energy;
    }

    /// Current stats for one key. Untracked species always read as zero.
    pub fn snapshot(&self, detector: Detector, species: Species) -> ParticleStats {
        match species.tracked_index() {
            Some(s) => self.lock()[detector.index()][s],
            None => ParticleStats::default(),
        }
    }

    /// Build the end-of-run summary.
    ///
    /// Must only be called once every worker has finished the run; the host
    /// enforces that barrier. Counters are left untouched so the summary
    /// can be rebuilt until the next [`begin_run`](Self::begin_run).
    pub fn end_run(&self) -> RunSummary {
        let stats = *self.lock();

        let mut rows = Vec::new();
        let mut subtotals = Vec::new();
        for detector in Detector::ALL {
            let mut subtotal = DetectorTotal {
                detector,
                count: 0,
                total_energy: 0.0,
            };
            for species in Species::TRACKED {
                let Some(s) = species.tracked_index() else {
                    continue;
                };
                let entry = stats[detector.index()][s];
                if entry.count == 0 {
                    continue;
                }
                rows.push(SummaryRow {
                    detector,
                    species,
                    count: entry.count,
                    total_energy: entry.total_energy,
                });
                subtotal.count += entry.count;
                subtotal.total_energy += entry.total_energy;
            }
            if subtotal.count > 0 {
                subtotals.push(subtotal);
            }
        }

        let summary = RunSummary::new(rows, subtotals);
        debug!(
            particles = summary.total_count(),
            energy = summary.total_energy(),
            "run summary built"
        );
        summary
    }

    fn lock(&self) -> MutexGuard<'_, StatsTable> {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn starts_empty() {
        let run = RunAggregator::new();
        let summary = run.end_run();
        assert!(summary.is_empty());
        assert_eq!(summary.total_count(), 0);
    }

    #[test]
    fn invalid_energies_are_ignored() {
        let run = RunAggregator::new();
        run.increment(Detector::Detector1, Species::MuPlus, 2.0);
        run.increment(Detector::Detector1, Species::MuPlus, f64::NAN);
        run.increment(Detector::Detector1, Species::MuPlus, f64::INFINITY);
        run.increment(Detector::Detector1, Species::MuPlus, -1.0);
        let stats = run.snapshot(Detector::Detector1, Species::MuPlus);
        assert_eq!(stats.count, 1);
        assert_eq!(stats.total_energy, 2.0);
    }

    #[test]
    fn increment_accumulates() {
        let run = RunAggregator::new();
        run.increment(Detector::Detector1, Species::PiPlus, 1.5);
        run.increment(Detector::Detector1, Species::PiPlus, 2.5);
        let s = run.snapshot(Detector::Detector1, Species::PiPlus);
        assert_eq!(s.count, 2);
        assert_eq!(s.total_energy, 4.0);
        assert_eq!(s.average_energy(), 2.0);
    }

    #[test]
    fn untracked_species_are_ignored() {
        let run = RunAggregator::new();
        run.increment(Detector::Detector2, Species::Proton, 10.0);
        run.increment(Detector::Detector2, Species::Other, 10.0);
        assert!(run.end_run().is_empty());
        assert_eq!(
            run.snapshot(Detector::Detector2, Species::Proton),
            ParticleStats::default()
        );
    }

    #[test]
    fn begin_run_resets() {
        let run = RunAggregator::new();
        run.increment(Detector::Detector3, Species::MuMinus, 1.0);
        run.begin_run();
        assert!(run.end_run().is_empty());
    }

    #[test]
    fn summary_order_is_declared_order() {
        let run = RunAggregator::new();
        run.increment(Detector::Detector3, Species::PiZero, 1.0);
        run.increment(Detector::Detector1, Species::PiMinus, 1.0);
        run.increment(Detector::Detector1, Species::MuPlus, 1.0);
        run.increment(Detector::Detector3, Species::MuMinus, 1.0);

        let summary = run.end_run();
        let keys: Vec<_> = summary
            .rows()
            .iter()
            .map(|r| (r.detector, r.species))
            .collect();
        assert_eq!(
            keys,
            vec![
                (Detector::Detector1, Species::MuPlus),
                (Detector::Detector1, Species::PiMinus),
                (Detector::Detector3, Species::MuMinus),
                (Detector::Detector3, Species::PiZero),
            ]
        );
        let dets: Vec<_> = summary.subtotals().iter().map(|t| t.detector).collect();
        assert_eq!(dets, vec![Detector::Detector1, Detector::Detector3]);
    }

    #[test]
    fn subtotals_and_grand_total() {
        let run = RunAggregator::new();
        run.increment(Detector::Detector1, Species::MuPlus, 2.0);
        run.increment(Detector::Detector1, Species::PiPlus, 4.0);
        run.increment(Detector::Detector2, Species::MuMinus, 6.0);

        let summary = run.end_run();
        let d1 = summary.subtotal(Detector::Detector1).unwrap();
        assert_eq!(d1.count, 2);
        assert_eq!(d1.total_energy, 6.0);
        assert_eq!(d1.average_energy(), 3.0);
        assert!(summary.subtotal(Detector::Detector3).is_none());
        assert_eq!(summary.total_count(), 3);
        assert_eq!(summary.total_energy(), 12.0);
        assert_eq!(summary.average_energy(), 4.0);
    }

    #[test]
    fn concurrent_increments_are_linearizable() {
        const THREADS: usize = 8;
        const PER_THREAD: usize = 1_000;

        let run = Arc::new(RunAggregator::new());
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let run = Arc::clone(&run);
                thread::spawn(move || {
                    for _ in 0..PER_THREAD {
                        run.increment(Detector::Detector2, Species::MuPlus, 0.5);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let s = run.snapshot(Detector::Detector2, Species::MuPlus);
        assert_eq!(s.count, (THREADS * PER_THREAD) as u64);
        // 0.5 sums exactly in binary floating point.
        assert_eq!(s.total_energy, 0.5 * (THREADS * PER_THREAD) as f64);
    }

    #[test]
    fn poisoned_lock_is_recovered() {
        let run = Arc::new(RunAggregator::new());
        run.increment(Detector::Detector1, Species::PiMinus, 1.0);

        let poison = Arc::clone(&run);
        let _ = thread::spawn(move || {
            let _guard = poison.stats.lock().unwrap();
            panic!("worker died holding the lock");
        })
        .join();

        run.increment(Detector::Detector1, Species::PiMinus, 1.0);
        assert_eq!(run.snapshot(Detector::Detector1, Species::PiMinus).count, 2);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn n_increments_give_count_n(n in 1usize..200, energy in 0.0f64..100.0) {
                let run = RunAggregator::new();
                for _ in 0..n {
                    run.increment(Detector::Detector3, Species::PiZero, energy);
                }
                let s = run.snapshot(Detector::Detector3, Species::PiZero);
                prop_assert_eq!(s.count, n as u64);
                prop_assert!((s.total_energy - n as f64 * energy).abs() <= 1e-9 * (1.0 + n as f64 * energy));
            }
        }
    }
}
