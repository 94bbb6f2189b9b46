//! Per-event hit buffers and the end-of-event flush.

use std::fmt;
use std::sync::Arc;

use beamline_core::{Detector, EventId, HitRecord, Species, Table, TableSink};
use indexmap::IndexMap;
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::run::RunAggregator;
use crate::sink::{particle_row, trajectory_row};

type HitBucket = SmallVec<[HitRecord; 4]>;
type ParticleBucket = SmallVec<[(Species, f64); 4]>;

/// What one [`EventAggregator::end_event`] call did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EventFlush {
    /// Rows appended to the trajectory table (zero if the append failed).
    pub trajectory_rows: usize,
    /// Rows appended to the particle table (zero if the append failed).
    pub particle_rows: usize,
    /// Tracked particles forwarded to the run aggregator.
    pub forwarded: usize,
    /// Number of table appends that failed.
    pub sink_failures: usize,
}

/// Scratch store for one event's hits.
///
/// Owned by exactly one worker while it processes an event, so nothing in
/// here is synchronized. Buckets are keyed by detector in first-hit order
/// and keep entries in recording order; the flush writes detectors in
/// declared order.
pub struct EventAggregator {
    hits: IndexMap<Detector, HitBucket>,
    particles: IndexMap<Detector, ParticleBucket>,
    run: Arc<RunAggregator>,
    sink: Arc<dyn TableSink>,
}

impl EventAggregator {
    /// An empty aggregator reporting into `run` and writing to `sink`.
    pub fn new(run: Arc<RunAggregator>, sink: Arc<dyn TableSink>) -> Self {
        Self {
            hits: IndexMap::new(),
            particles: IndexMap::new(),
            run,
            sink,
        }
    }

    /// The run aggregator this event reports into.
    pub fn run(&self) -> &Arc<RunAggregator> {
        &self.run
    }

    /// Drop everything recorded so far. Idempotent.
    pub fn begin_event(&mut self) {
        self.hits.clear();
        self.particles.clear();
    }

    /// Append a hit to `detector`'s bucket. No deduplication.
    pub fn record_hit(&mut self, detector: Detector, hit: HitRecord) {
        self.hits.entry(detector).or_default().push(hit);
    }

    /// Append a particle entry to `detector`'s bucket.
    ///
    /// Every species is accepted; untracked ones are filtered at flush.
    pub fn record_particle(&mut self, detector: Detector, species: Species, energy: f64) {
        self.particles
            .entry(detector)
            .or_default()
            .push((species, energy));
    }

    /// Record a hit produced by the step policy together with its particle
    /// entry.
    pub fn record_step_hit(&mut self, hit: &HitRecord) {
        self.record_hit(hit.detector, *hit);
        self.record_particle(hit.detector, hit.species, hit.kinetic_energy);
    }

    /// Number of hits recorded so far in this event.
    pub fn hit_count(&self) -> usize {
        self.hits.values().map(SmallVec::len).sum()
    }

    /// Number of particle entries recorded so far, tracked or not.
    pub fn particle_count(&self) -> usize {
        self.particles.values().map(SmallVec::len).sum()
    }

    /// Persist this event's buffers and forward tracked particles.
    ///
    /// Both tables get their header row when `event` is the first event.
    /// A failed append is logged and that table's rows for this event are
    /// dropped; tracked particles are forwarded to the run aggregator
    /// regardless.
    pub fn end_event(&mut self, event: EventId) -> EventFlush {
        self.hits.sort_unstable_keys();
        self.particles.sort_unstable_keys();

        let trajectory: Vec<String> = self
            .hits
            .iter()
            .flat_map(|(&detector, bucket)| {
                bucket.iter().map(move |hit| trajectory_row(event, detector, hit))
            })
            .collect();

        let mut particle = Vec::new();
        for (&detector, bucket) in &self.particles {
            for &(species, energy) in bucket.iter().filter(|(s, _)| s.is_tracked()) {
                particle.push(particle_row(event, detector, species, energy));
                self.run.increment(detector, species, energy);
            }
        }

        let mut flush = EventFlush {
            forwarded: particle.len(),
            ..EventFlush::default()
        };
        let header = |table: Table| event.is_first().then(|| table.header());

        if self.write(Table::Trajectory, header(Table::Trajectory), &trajectory, event) {
            flush.trajectory_rows = trajectory.len();
        } else {
            flush.sink_failures += 1;
        }
        if self.write(Table::Particle, header(Table::Particle), &particle, event) {
            flush.particle_rows = particle.len();
        } else {
            flush.sink_failures += 1;
        }

        debug!(
            %event,
            trajectory_rows = flush.trajectory_rows,
            particle_rows = flush.particle_rows,
            forwarded = flush.forwarded,
            "event flushed"
        );
        flush
    }

    fn write(&self, table: Table, header: Option<&str>, rows: &[String], event: EventId) -> bool {
        match self.sink.append(table, header, rows) {
            Ok(()) => true,
            Err(e) => {
                warn!(%event, %table, error = %e, "skipping table output for event");
                false
            }
        }
    }
}

impl fmt::Debug for EventAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventAggregator")
            .field("hits", &self.hit_count())
            .field("particles", &self.particle_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beamline_test_utils::{tracks, FailingSink, MemorySink};

    fn setup() -> (EventAggregator, Arc<RunAggregator>, Arc<MemorySink>) {
        let run = Arc::new(RunAggregator::new());
        let sink = Arc::new(MemorySink::new());
        let agg = EventAggregator::new(Arc::clone(&run), sink.clone());
        (agg, run, sink)
    }

    #[test]
    fn header_only_on_first_event() {
        let (mut agg, _run, sink) = setup();
        for id in 0..3 {
            agg.begin_event();
            agg.record_step_hit(&tracks::hit(Detector::Detector1, Species::MuPlus, 1.0));
            agg.end_event(EventId(id));
        }
        for table in Table::ALL {
            assert_eq!(sink.header_count(table), 1);
            assert_eq!(sink.lines(table)[0], table.header());
            assert_eq!(sink.rows(table).len(), 3);
        }
    }

    #[test]
    fn begin_event_clears_prior_hits() {
        let (mut agg, run, sink) = setup();
        agg.record_step_hit(&tracks::hit(Detector::Detector2, Species::PiPlus, 3.0));
        agg.begin_event();
        let flush = agg.end_event(EventId(4));
        assert_eq!(flush, EventFlush::default());
        assert!(sink.rows(Table::Trajectory).is_empty());
        assert!(sink.rows(Table::Particle).is_empty());
        assert!(run.end_run().is_empty());
    }

    #[test]
    fn begin_event_is_idempotent() {
        let (mut agg, _run, _sink) = setup();
        agg.begin_event();
        agg.begin_event();
        assert_eq!(agg.hit_count(), 0);
        assert_eq!(agg.particle_count(), 0);
    }

    #[test]
    fn untracked_species_reach_trajectory_table_only() {
        let (mut agg, run, sink) = setup();
        agg.begin_event();
        agg.record_step_hit(&tracks::hit(Detector::Detector3, Species::Proton, 20.0));
        agg.record_step_hit(&tracks::hit(Detector::Detector3, Species::PiZero, 1.0));
        let flush = agg.end_event(EventId(1));

        assert_eq!(flush.trajectory_rows, 2);
        assert_eq!(flush.particle_rows, 1);
        assert_eq!(flush.forwarded, 1);
        assert_eq!(sink.rows(Table::Particle), vec!["1,Detector3,pi0,1"]);
        assert_eq!(run.snapshot(Detector::Detector3, Species::Proton).count, 0);
        assert_eq!(run.snapshot(Detector::Detector3, Species::PiZero).count, 1);
    }

    #[test]
    fn detectors_flush_in_declared_order() {
        let (mut agg, _run, sink) = setup();
        agg.begin_event();
        agg.record_particle(Detector::Detector3, Species::MuMinus, 1.0);
        agg.record_particle(Detector::Detector1, Species::MuMinus, 2.0);
        agg.record_particle(Detector::Detector1, Species::MuPlus, 3.0);
        agg.end_event(EventId(2));
        assert_eq!(
            sink.rows(Table::Particle),
            vec!["2,Detector1,mu-,2", "2,Detector1,mu+,3", "2,Detector3,mu-,1"]
        );
    }

    #[test]
    fn rows_carry_the_detector_the_hit_was_recorded_under() {
        let (mut agg, _run, sink) = setup();
        agg.begin_event();
        agg.record_hit(
            Detector::Detector1,
            tracks::hit(Detector::Detector3, Species::MuPlus, 1.0),
        );
        agg.record_hit(
            Detector::Detector2,
            tracks::hit(Detector::Detector1, Species::MuPlus, 1.0),
        );
        agg.record_particle(Detector::Detector1, Species::MuPlus, 1.0);
        agg.end_event(EventId(5));

        let rows = sink.rows(Table::Trajectory);
        assert_eq!(rows.len(), 2);
        assert!(rows[0].starts_with("5,Detector1,"), "{rows:?}");
        assert!(rows[1].starts_with("5,Detector2,"), "{rows:?}");
        assert_eq!(sink.rows(Table::Particle), vec!["5,Detector1,mu+,1"]);
    }

    #[test]
    fn no_deduplication() {
        let (mut agg, _run, _sink) = setup();
        let hit = tracks::hit(Detector::Detector1, Species::MuPlus, 1.0);
        agg.record_hit(Detector::Detector1, hit);
        agg.record_hit(Detector::Detector1, hit);
        assert_eq!(agg.hit_count(), 2);
    }

    #[test]
    fn failing_sink_still_forwards_particles() {
        let run = Arc::new(RunAggregator::new());
        let sink = Arc::new(FailingSink::new());
        let mut agg = EventAggregator::new(Arc::clone(&run), sink.clone());

        agg.begin_event();
        agg.record_step_hit(&tracks::hit(Detector::Detector2, Species::MuMinus, 2.0));
        let flush = agg.end_event(EventId(0));

        assert_eq!(flush.sink_failures, 2);
        assert_eq!(flush.trajectory_rows, 0);
        assert_eq!(flush.particle_rows, 0);
        assert_eq!(flush.forwarded, 1);
        assert_eq!(sink.attempts(), 2);
        assert_eq!(run.snapshot(Detector::Detector2, Species::MuMinus).count, 1);
    }

    #[test]
    fn one_failing_table_does_not_block_the_other() {
        let run = Arc::new(RunAggregator::new());
        let sink = Arc::new(FailingSink::only(Table::Trajectory));
        let mut agg = EventAggregator::new(run, sink);

        agg.begin_event();
        agg.record_step_hit(&tracks::hit(Detector::Detector1, Species::PiMinus, 5.0));
        let flush = agg.end_event(EventId(3));
        assert_eq!(flush.sink_failures, 1);
        assert_eq!(flush.trajectory_rows, 0);
        assert_eq!(flush.particle_rows, 1);
    }
}
