//! Host-facing callbacks: run, event and per-step hooks.
//!
//! [`BeamlineActions`] is built once per process and shared by every
//! worker. Each worker asks it for a [`WorkerActions`], which owns that
//! worker's [`EventAggregator`] and carries the per-step hook.

use std::sync::Arc;

use beamline_core::{EventId, RegionOracle, RunId, TableSink, TrackState};
use beamline_record::{EventAggregator, EventFlush, RunAggregator, RunSummary};
use beamline_step::{StepOutcome, StepPolicy};
use tracing::info;

/// Run-level callbacks and the state shared across workers.
#[derive(Clone)]
pub struct BeamlineActions {
    policy: StepPolicy,
    oracle: Arc<dyn RegionOracle>,
    run: Arc<RunAggregator>,
    sink: Arc<dyn TableSink>,
}

impl BeamlineActions {
    /// Bundle the step policy, region oracle, run aggregator and table sink.
    pub fn new(
        policy: StepPolicy,
        oracle: Arc<dyn RegionOracle>,
        run: Arc<RunAggregator>,
        sink: Arc<dyn TableSink>,
    ) -> Self {
        Self {
            policy,
            oracle,
            run,
            sink,
        }
    }

    /// The shared run aggregator.
    pub fn run_aggregator(&self) -> &Arc<RunAggregator> {
        &self.run
    }

    /// Reset run statistics.
    pub fn begin_of_run(&self, run: RunId) {
        self.run.begin_run();
        info!(%run, "run starts");
    }

    /// Close the run and build its summary.
    ///
    /// A run that processed no events produces no summary. Call only after
    /// every worker has finished.
    pub fn end_of_run(&self, run: RunId, event_count: u64) -> Option<RunSummary> {
        if event_count == 0 {
            return None;
        }
        let summary = self.run.end_run();
        info!(
            %run,
            events = event_count,
            particles = summary.total_count(),
            "run completed"
        );
        Some(summary)
    }

    /// Per-worker callbacks with a fresh event aggregator.
    pub fn worker(&self) -> WorkerActions {
        WorkerActions {
            policy: self.policy.clone(),
            oracle: Arc::clone(&self.oracle),
            event: EventAggregator::new(Arc::clone(&self.run), Arc::clone(&self.sink)),
        }
    }
}

impl std::fmt::Debug for BeamlineActions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BeamlineActions")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// Event and step callbacks for one worker thread.
pub struct WorkerActions {
    policy: StepPolicy,
    oracle: Arc<dyn RegionOracle>,
    event: EventAggregator,
}

impl WorkerActions {
    /// Clear the event buffers.
    pub fn begin_of_event(&mut self, _event: EventId) {
        self.event.begin_event();
    }

    /// Flush the event's hits to the tables and the run aggregator.
    pub fn end_of_event(&mut self, event: EventId) -> EventFlush {
        self.event.end_event(event)
    }

    /// Classify the pre-step position, apply the step policy and record any
    /// hit it produced.
    ///
    /// The caller applies the returned rewrite and honours the decision.
    pub fn per_step(&mut self, track: &TrackState) -> StepOutcome {
        let region = self.oracle.classify(track.position);
        let outcome = self.policy.apply(track, region);
        if let Some(hit) = &outcome.hit {
            self.event.record_step_hit(hit);
        }
        outcome
    }

    /// The worker's event aggregator.
    pub fn event(&self) -> &EventAggregator {
        &self.event
    }
}

impl std::fmt::Debug for WorkerActions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerActions")
            .field("policy", &self.policy)
            .field("event", &self.event)
            .finish_non_exhaustive()
    }
}
