mod common;

use civitas_core::telemetry::{ExperimentConfig, ExperimentRun};
use civitas_core::{Engine, TelemetryError};
use common::{run_days, EngineBuilder};
use std::sync::Arc;

fn ten_day_study() -> ExperimentConfig {
    ExperimentConfig {
        duration_days: 10,
        ..ExperimentConfig::named("Ten Day Study")
    }
}

async fn finished_run() -> ExperimentRun {
    let mut engine = EngineBuilder::new()
        .with_source(Arc::new(civitas_oracle::ScriptedOracle::default()))
        .build();
    engine.start_experiment(ten_day_study()).expect("no run active");

    let mut finished = None;
    for _ in 0..10 {
        let report = engine.advance_one_day().await;
        if let Some(run) = report.finished_run {
            finished = Some(run);
        }
    }
    assert!(engine.current_experiment().is_none());
    assert_eq!(engine.experiment_history().len(), 1);
    finished.expect("run ends on its tenth day")
}

#[tokio::test]
async fn test_ten_day_run_summary() {
    let run = finished_run().await;

    assert!(run.run_id.starts_with("run-"));
    assert_eq!(run.experiment_id, "ten-day-study");
    assert_eq!(run.snapshots.len(), 10);
    let days: Vec<u64> = run.snapshots.iter().map(|s| s.day).collect();
    assert_eq!(days, (1..=10).collect::<Vec<_>>());
    assert!(run.end_time.is_some());

    let first = &run.snapshots[0];
    let last = &run.snapshots[9];
    assert_eq!(run.summary.total_days, 10);
    assert_eq!(
        run.summary.total_agents_created,
        last.total_agents as i64 - first.total_agents as i64
    );
    assert_eq!(run.summary.final_public_approval, last.public_approval);
    assert_eq!(run.summary.avg_effectiveness, last.avg_effectiveness);
    assert!(run
        .events
        .iter()
        .any(|e| e.event_type == civitas_data::EventType::SimulationDay));
}

#[tokio::test]
async fn test_csv_has_one_row_per_snapshot() {
    let run = finished_run().await;
    let csv = Engine::export_csv(&run).expect("run has snapshots");
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(lines.len(), 11);
    let header: Vec<&str> = lines[0].split(',').collect();
    assert_eq!(header[0], "day");
    assert!(header.contains(&"public_approval"));
    assert!(header.contains(&"network_density"));
    // Nested maps and lists are left to the JSON export.
    assert!(!header.contains(&"agents_by_type"));
    assert!(lines[1].starts_with("1,"));
}

#[tokio::test]
async fn test_json_export_round_trips_through_disk() {
    let run = finished_run().await;
    let dir = std::env::temp_dir().join(format!("civitas-export-{}", uuid::Uuid::new_v4()));
    let json_path = dir.join("run.json");
    let csv_path = dir.join("nested").join("run.csv");

    civitas_io::write_run_json(&run, &json_path).expect("write json");
    civitas_io::write_run_csv(&run, &csv_path).expect("write csv");

    let text = std::fs::read_to_string(&json_path).expect("json written");
    let restored: ExperimentRun = serde_json::from_str(&text).expect("valid run");
    assert_eq!(restored.run_id, run.run_id);
    assert_eq!(restored.snapshots.len(), run.snapshots.len());
    assert_eq!(restored.summary.total_days, run.summary.total_days);
    assert!(csv_path.exists());

    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn test_second_start_is_rejected() {
    let mut engine = EngineBuilder::new().build();
    let first = engine.start_experiment(ExperimentConfig::named("A")).expect("first start");

    match engine.start_experiment(ExperimentConfig::named("B")) {
        Err(TelemetryError::ExperimentAlreadyActive { run_id }) => assert_eq!(run_id, first),
        other => panic!("expected ExperimentAlreadyActive, got {other:?}"),
    }
    assert_eq!(engine.current_experiment().map(|r| r.config.name.as_str()), Some("A"));

    run_days(&mut engine, 2).await;
    let run = engine.end_experiment().expect("run active");
    assert_eq!(run.snapshots.len(), 2);
    assert!(matches!(engine.end_experiment(), Err(TelemetryError::NoActiveExperiment)));
}

#[tokio::test]
async fn test_sparse_snapshots_and_empty_export() {
    let mut engine = EngineBuilder::new().build();
    engine
        .start_experiment(ExperimentConfig {
            snapshot_interval: 3,
            ..ExperimentConfig::named("Sparse")
        })
        .expect("start");
    run_days(&mut engine, 2).await;
    let run = engine.end_experiment().expect("run active");
    assert!(run.snapshots.is_empty());
    assert!(matches!(Engine::export_csv(&run), Err(TelemetryError::EmptyRun { .. })));
    assert!(Engine::export_json(&run).is_ok());

    engine
        .start_experiment(ExperimentConfig {
            snapshot_interval: 3,
            ..ExperimentConfig::named("Sparse again")
        })
        .expect("restart after end");
    run_days(&mut engine, 6).await;
    let run = engine.end_experiment().expect("run active");
    let days: Vec<u64> = run.snapshots.iter().map(|s| s.day).collect();
    assert_eq!(days, vec![5, 8]);
}

#[tokio::test]
async fn test_invalid_experiment_is_refused() {
    let mut engine = EngineBuilder::new().build();
    let bad = ExperimentConfig {
        snapshot_interval: 0,
        ..ExperimentConfig::named("Broken")
    };
    assert!(matches!(
        engine.start_experiment(bad),
        Err(TelemetryError::InvalidConfig(_))
    ));
    assert!(engine.current_experiment().is_none());
}
