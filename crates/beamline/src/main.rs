//! `beamline-sim`: run the reference beamline from the command line.
//!
//! Loads a JSON [`BeamlineConfig`] (or the built-in reference beamline),
//! applies command-line overrides, runs one or more runs and prints each
//! run's detection summary. The CSV tables land in the output directory.
//!
//! Log verbosity follows `RUST_LOG` and defaults to `info`.

use std::path::PathBuf;

use beamline::engine::{BeamlineConfig, RunManager};
use beamline::types::RunId;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Muon beamline simulation
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON configuration file; omitted sections use the reference beamline
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Events per run
    #[arg(short = 'n', long)]
    events: Option<u64>,

    /// Worker threads (default: one per core)
    #[arg(short = 'j', long)]
    workers: Option<usize>,

    /// Run seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Directory receiving the CSV tables
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Number of consecutive runs, all appending to the same tables
    #[arg(long, default_value_t = 1)]
    runs: u32,

    /// Validate the configuration and exit
    #[arg(long)]
    check: bool,
}

impl Args {
    fn apply(&self, cfg: &mut BeamlineConfig) {
        if let Some(n) = self.events {
            cfg.run.events = n;
        }
        if let Some(n) = self.workers {
            cfg.run.worker_count = Some(n);
        }
        if let Some(seed) = self.seed {
            cfg.run.seed = seed;
        }
        if let Some(dir) = &self.output_dir {
            cfg.run.output_dir = dir.clone();
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let args = Args::parse();
    let mut cfg = match &args.config {
        Some(path) => BeamlineConfig::load(path)?,
        None => BeamlineConfig::default(),
    };
    args.apply(&mut cfg);
    cfg.validate()?;

    if args.check {
        println!("configuration ok");
        return Ok(());
    }

    let manager = RunManager::from_config(&cfg)?;
    info!(
        output_dir = %manager.output_dir().display(),
        events = cfg.run.events,
        runs = args.runs,
        "beamline-sim starting"
    );

    for run in 0..args.runs {
        let report = manager.run(RunId(run))?;
        match &report.summary {
            Some(summary) => println!("{summary}"),
            None => println!("run {} had no events", report.run),
        }
        let m = &report.metrics;
        println!(
            "run {}: {} events, {} steps, {} hits, {} killed, {} sink failures, {} workers, {:.3} s",
            report.run,
            m.events,
            m.steps,
            m.hits,
            m.killed_tracks,
            m.sink_failures,
            m.worker_count,
            m.wall_time_us as f64 / 1e6,
        );
    }
    Ok(())
}
