//! Multi-threaded run manager.
//!
//! ```text
//!   caller thread                         worker threads (N)
//!   ─────────────                         ──────────────────
//!   begin_of_run
//!   event 0 (inline: table headers first)
//!   send 1..events ──[bounded(N*4)]──►   recv → begin_of_event
//!                                               generate primary
//!                                               transport (per_step …)
//!                                               end_of_event
//!   drop sender, join all  ◄── barrier ──  channel closed → exit
//!   end_of_run → RunSummary
//! ```
//!
//! Each worker owns one [`WorkerActions`] for the whole run; the only state
//! shared between workers is the run aggregator and the table sink.

use std::path::Path;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use beamline_core::{EventId, RunId, TableSink};
use beamline_record::{CsvDirSink, RunAggregator, RunSummary};
use crossbeam_channel::Receiver;
use tracing::{debug, error, info};

use crate::actions::{BeamlineActions, WorkerActions};
use crate::config::{Beamline, BeamlineConfig, RunConfig};
use crate::error::RunError;
use crate::gun::PrimaryBeam;
use crate::kernel::{ReferenceKernel, TrackExit};

/// Aggregate counters for one run.
///
/// Collected per worker and summed after the join barrier.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunMetrics {
    /// Events processed.
    pub events: u64,
    /// Transport steps across every event.
    pub steps: u64,
    /// Tracks killed by the step policy.
    pub killed_tracks: u64,
    /// Detector hits recorded.
    pub hits: u64,
    /// Table appends that failed and were skipped.
    pub sink_failures: u64,
    /// Worker threads used.
    pub worker_count: usize,
    /// Wall-clock time for the whole run, in microseconds.
    pub wall_time_us: u64,
}

impl RunMetrics {
    fn absorb(&mut self, other: &RunMetrics) {
        self.events += other.events;
        self.steps += other.steps;
        self.killed_tracks += other.killed_tracks;
        self.hits += other.hits;
        self.sink_failures += other.sink_failures;
    }
}

/// Result of one completed run.
#[derive(Clone, Debug)]
pub struct RunReport {
    /// Which run this was.
    pub run: RunId,
    /// End-of-run summary; `None` when the run had no events.
    pub summary: Option<RunSummary>,
    /// Counters and timing.
    pub metrics: RunMetrics,
}

/// Everything one event needs besides the worker's own callbacks.
#[derive(Clone, Debug)]
struct EventContext {
    kernel: ReferenceKernel,
    beam: PrimaryBeam,
    seed: u64,
}

impl EventContext {
    fn process(&self, worker: &mut WorkerActions, event: EventId, metrics: &mut RunMetrics) {
        worker.begin_of_event(event);
        let primary = self.beam.generate(self.seed, event);
        let track = self.kernel.transport(primary, worker);
        let flush = worker.end_of_event(event);

        metrics.events += 1;
        metrics.steps += u64::from(track.steps);
        metrics.hits += u64::from(track.hits);
        if track.exit == TrackExit::Killed {
            metrics.killed_tracks += 1;
        }
        metrics.sink_failures += flush.sink_failures as u64;
    }
}

/// Drives runs of many events over a pool of worker threads.
#[derive(Debug)]
pub struct RunManager {
    actions: BeamlineActions,
    context: EventContext,
    config: RunConfig,
}

impl RunManager {
    /// A manager over already-built components writing to `sink`.
    pub fn new(beamline: Beamline, config: RunConfig, sink: Arc<dyn TableSink>) -> Self {
        let actions = BeamlineActions::new(
            beamline.policy,
            beamline.geometry,
            Arc::new(RunAggregator::new()),
            sink,
        );
        let context = EventContext {
            kernel: beamline.kernel,
            beam: beamline.beam,
            seed: config.seed,
        };
        Self {
            actions,
            context,
            config,
        }
    }

    /// Validate `config`, prepare its output directory and build a manager
    /// writing CSV tables there.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Config`] for an invalid configuration and
    /// [`RunError::Output`] if the output directory cannot be created.
    pub fn from_config(config: &BeamlineConfig) -> Result<Self, RunError> {
        let beamline = config.build()?;
        let sink = CsvDirSink::create(&config.run.output_dir)?;
        Ok(Self::new(beamline, config.run.clone(), Arc::new(sink)))
    }

    /// Output directory from the run configuration.
    pub fn output_dir(&self) -> &Path {
        &self.config.output_dir
    }

    /// The shared callbacks (and through them the run aggregator).
    pub fn actions(&self) -> &BeamlineActions {
        &self.actions
    }

    /// Run the configured number of events.
    ///
    /// # Errors
    ///
    /// See [`run_events`](Self::run_events).
    pub fn run(&self, run: RunId) -> Result<RunReport, RunError> {
        self.run_events(run, self.config.events)
    }

    /// Run `events` events as run `run`.
    ///
    /// Event 0 runs on the calling thread before any worker starts, so the
    /// table headers precede every other row. The remaining events are
    /// spread over the worker pool; the summary is built only after every
    /// worker has been joined.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::ThreadSpawn`] if a worker cannot be started and
    /// [`RunError::WorkerPanicked`] if any worker panics. Sink failures are
    /// not errors; they are counted in [`RunMetrics::sink_failures`].
    pub fn run_events(&self, run: RunId, events: u64) -> Result<RunReport, RunError> {
        let started = Instant::now();
        let worker_count = self.config.resolved_worker_count();
        self.actions.begin_of_run(run);

        let mut metrics = RunMetrics {
            worker_count,
            ..RunMetrics::default()
        };

        if events > 0 {
            let mut first = self.actions.worker();
            self.context.process(&mut first, EventId::FIRST, &mut metrics);
        }
        if events > 1 {
            info!(%run, events, workers = worker_count, "dispatching events");
            for worker in self.dispatch(events, worker_count)? {
                metrics.absorb(&worker);
            }
        }

        let summary = self.actions.end_of_run(run, metrics.events);
        metrics.wall_time_us = started.elapsed().as_micros() as u64;
        Ok(RunReport {
            run,
            summary,
            metrics,
        })
    }

    /// Fan events `1..events` out to `worker_count` threads and join them.
    fn dispatch(&self, events: u64, worker_count: usize) -> Result<Vec<RunMetrics>, RunError> {
        let (tx, rx) = crossbeam_channel::bounded::<EventId>(worker_count * 4);

        let mut handles = Vec::with_capacity(worker_count);
        let mut spawn_error = None;
        for i in 0..worker_count {
            match self.spawn_worker(i, rx.clone()) {
                Ok(h) => handles.push(h),
                Err(e) => {
                    spawn_error = Some(e);
                    break;
                }
            }
        }
        drop(rx);

        if spawn_error.is_none() {
            for id in 1..events {
                // All receivers gone means every worker died; the join
                // below reports it.
                if tx.send(EventId(id)).is_err() {
                    break;
                }
            }
        }
        drop(tx);

        let mut results = Vec::with_capacity(handles.len());
        let mut panicked = None;
        for handle in handles {
            let name = handle.thread().name().unwrap_or("beamline-worker").to_string();
            match handle.join() {
                Ok(m) => results.push(m),
                Err(_) => {
                    error!(worker = %name, "worker panicked");
                    panicked.get_or_insert(name);
                }
            }
        }

        if let Some(e) = spawn_error {
            return Err(e);
        }
        if let Some(worker) = panicked {
            return Err(RunError::WorkerPanicked { worker });
        }
        Ok(results)
    }

    fn spawn_worker(
        &self,
        index: usize,
        rx: Receiver<EventId>,
    ) -> Result<JoinHandle<RunMetrics>, RunError> {
        let mut worker = self.actions.worker();
        let context = self.context.clone();
        thread::Builder::new()
            .name(format!("beamline-worker-{index}"))
            .spawn(move || {
                let mut metrics = RunMetrics::default();
                while let Ok(event) = rx.recv() {
                    context.process(&mut worker, event, &mut metrics);
                }
                debug!(worker = index, events = metrics.events, "worker finished");
                metrics
            })
            .map_err(|e| RunError::ThreadSpawn {
                reason: format!("beamline-worker-{index}: {e}"),
            })
    }
}
