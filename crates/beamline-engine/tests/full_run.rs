//! Full runs through the reference beamline, written to real CSV files.

use std::fs;

use beamline_core::{Detector, RunId, Species, Table};
use beamline_engine::{BeamlineConfig, RunManager};

fn config(dir: &std::path::Path, workers: usize) -> BeamlineConfig {
    BeamlineConfig::from_json_str(&format!(
        r#"{{
            "beam": {{
                "species": "mu-",
                "energy": 3.0,
                "energy_spread": 0.2,
                "angle_deg": 0.0,
                "spot_size": 0.5
            }},
            "guide": {{ "max_field": 0.5 }},
            "run": {{
                "events": 40,
                "worker_count": {workers},
                "seed": 1234,
                "output_dir": {dir:?}
            }}
        }}"#,
    ))
    .unwrap()
}

#[test]
fn tables_and_summary_agree() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path(), 4);
    let report = RunManager::from_config(&cfg).unwrap().run(RunId(0)).unwrap();
    let summary = report.summary.unwrap();
    assert_eq!(report.metrics.events, 40);

    let particles = fs::read_to_string(dir.path().join(Table::Particle.file_name())).unwrap();
    let mut lines = particles.lines();
    assert_eq!(lines.next(), Some(Table::Particle.header()));
    let rows: Vec<&str> = lines.collect();
    assert_eq!(rows.len() as u64, summary.total_count());
    assert!(rows.iter().all(|r| r.split(',').nth(2) == Some("mu-")));

    let trajectory = fs::read_to_string(dir.path().join(Table::Trajectory.file_name())).unwrap();
    assert_eq!(trajectory.lines().next(), Some(Table::Trajectory.header()));
    // Muons are tracked, so every hit has a matching particle row.
    assert_eq!(trajectory.lines().count() - 1, rows.len());
    assert_eq!(rows.len() as u64, report.metrics.hits);

    let energy: f64 = rows
        .iter()
        .map(|r| r.rsplit(',').next().unwrap().parse::<f64>().unwrap())
        .sum();
    assert!((energy - summary.total_energy()).abs() < 1e-6);
}

#[test]
fn results_do_not_depend_on_worker_count() {
    let one_dir = tempfile::tempdir().unwrap();
    let many_dir = tempfile::tempdir().unwrap();
    let one = RunManager::from_config(&config(one_dir.path(), 1))
        .unwrap()
        .run(RunId(0))
        .unwrap();
    let many = RunManager::from_config(&config(many_dir.path(), 6))
        .unwrap()
        .run(RunId(0))
        .unwrap();

    assert_eq!(one.metrics.steps, many.metrics.steps);
    assert_eq!(one.metrics.hits, many.metrics.hits);

    let (a, b) = (one.summary.unwrap(), many.summary.unwrap());
    assert_eq!(a.rows().len(), b.rows().len());
    for (x, y) in a.rows().iter().zip(b.rows()) {
        assert_eq!((x.detector, x.species, x.count), (y.detector, y.species, y.count));
        assert!((x.total_energy - y.total_energy).abs() < 1e-9);
    }
}

#[test]
fn default_proton_beam_fills_no_particle_rows() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = BeamlineConfig::default();
    cfg.run.events = 5;
    cfg.run.worker_count = Some(2);
    cfg.run.output_dir = dir.path().to_path_buf();

    let report = RunManager::from_config(&cfg).unwrap().run(RunId(0)).unwrap();
    let summary = report.summary.unwrap();
    assert!(summary.is_empty());
    assert!(summary.row(Detector::Detector1, Species::Proton).is_none());
    assert!(summary.to_string().contains("ALL |      TOTAL |          0 |"));

    let particles = fs::read_to_string(dir.path().join(Table::Particle.file_name())).unwrap();
    assert_eq!(particles, format!("{}\n", Table::Particle.header()));
}

#[test]
fn second_run_appends_to_the_same_tables() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path(), 2);
    let mgr = RunManager::from_config(&cfg).unwrap();
    let first = mgr.run(RunId(0)).unwrap();
    let after_first = fs::read_to_string(dir.path().join(Table::Particle.file_name())).unwrap();
    mgr.run(RunId(1)).unwrap();
    let after_second = fs::read_to_string(dir.path().join(Table::Particle.file_name())).unwrap();

    assert!(after_second.starts_with(&after_first));
    // The second run's event 0 writes the header again, as each run starts at event 0.
    assert_eq!(
        after_second.matches(Table::Particle.header()).count(),
        2
    );
    assert_eq!(
        first.summary.unwrap().total_count() * 2,
        (after_second.lines().count() - 2) as u64
    );
}

#[test]
fn demo_config_is_valid() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/muon_beam.json");
    let cfg = BeamlineConfig::load(path).unwrap();
    assert_eq!(cfg.beam.species, Species::MuMinus);
    assert_eq!(cfg.kernel.step_length, 0.5);
    assert!(cfg.validate().is_ok());
}
