//! Tests for single experiment runs
//!
//! Time is paused so the poll cadence can be asserted exactly.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use tokio::time::Instant;

use litmus_demo::chaos::clock::FixedClock;
use litmus_demo::chaos::manifest::ExperimentManifest;
use litmus_demo::chaos::{ExperimentRunner, RunnerSettings, UNKNOWN_VERDICT};
use litmus_demo::error::DemoError;
use litmus_demo::shutdown::shutdown_channel;

mod common;

use common::FakeChaosOps;

#[tokio::test(start_paused = true)]
async fn test_polls_until_execution_successful() {
    let dir = tempfile::tempdir().unwrap();
    let entry = common::write_engine(dir.path(), "pod-delete", "sock-chaos");
    let ops = Arc::new(
        FakeChaosOps::new()
            .with_statuses("sock-chaos", &[None, Some("Running"), Some("Running")])
            .with_verdict("sock-chaos-pod-delete", "Pass"),
    );

    let started_at = Utc.with_ymd_and_hms(2020, 6, 1, 12, 0, 0).unwrap();
    let (_controller, signal) = shutdown_channel();
    let runner = ExperimentRunner::new(ops.clone(), signal, RunnerSettings::default())
        .with_clock(Arc::new(FixedClock(started_at)));

    let begin = Instant::now();
    let result = runner.run(&entry, 0).await.unwrap();

    assert_eq!(begin.elapsed(), Duration::from_secs(30));
    assert_eq!(ops.count("status sock-shop/sock-chaos"), 4);
    assert_eq!(ops.count("logs sock-shop/name=pod-delete 10s"), 3);
    assert_eq!(result.experiment_name, "pod-delete");
    assert_eq!(result.status, "Pass");
    assert_eq!(result.start_time, started_at);

    let calls = ops.calls();
    assert_eq!(calls[0], "delete sock-shop/sock-chaos");
    assert_eq!(calls[1], "apply sock-shop");
    assert_eq!(
        &calls[calls.len() - 2..],
        &[
            "describe sock-shop/sock-chaos-pod-delete".to_string(),
            "verdict sock-shop/sock-chaos-pod-delete".to_string(),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_immediate_completion_does_not_sleep() {
    let dir = tempfile::tempdir().unwrap();
    let entry = common::write_engine(dir.path(), "pod-delete", "sock-chaos");
    let ops = Arc::new(FakeChaosOps::new());

    let (_controller, signal) = shutdown_channel();
    let runner = ExperimentRunner::new(ops.clone(), signal, RunnerSettings::default());

    let begin = Instant::now();
    let result = runner.run(&entry, 0).await.unwrap();

    assert_eq!(begin.elapsed(), Duration::ZERO);
    assert_eq!(ops.count("status sock-shop/sock-chaos"), 1);
    assert_eq!(ops.count("logs sock-shop/name=pod-delete 10s"), 0);
    assert_eq!(result.status, UNKNOWN_VERDICT);
}

#[tokio::test(start_paused = true)]
async fn test_ramp_time_applied_and_temp_file_removed() {
    let dir = tempfile::tempdir().unwrap();
    let entry = common::write_engine(dir.path(), "pod-delete", "sock-chaos");
    let ops = Arc::new(FakeChaosOps::new());

    let (_controller, signal) = shutdown_channel();
    let runner = ExperimentRunner::new(ops.clone(), signal, RunnerSettings::default());
    runner.run(&entry, 120).await.unwrap();

    let applied = ops.applied();
    assert_eq!(applied.len(), 1);
    let (path, text) = &applied[0];
    assert_ne!(path, &entry.path);
    assert!(!path.exists());

    let manifest = ExperimentManifest::parse(text, path).unwrap();
    let ramp: Vec<_> = manifest
        .experiment_env()
        .into_iter()
        .filter(|(name, _)| name == "RAMP_TIME")
        .collect();
    assert_eq!(ramp, vec![("RAMP_TIME".to_string(), "120".to_string())]);
}

#[tokio::test(start_paused = true)]
async fn test_custom_poll_interval() {
    let dir = tempfile::tempdir().unwrap();
    let entry = common::write_engine(dir.path(), "pod-delete", "sock-chaos");
    let ops = Arc::new(FakeChaosOps::new().with_statuses("sock-chaos", &[None, None]));

    let settings = RunnerSettings {
        poll_interval: Duration::from_secs(3),
        log_lookback: Duration::from_secs(5),
    };
    let (_controller, signal) = shutdown_channel();
    let runner = ExperimentRunner::new(ops.clone(), signal, settings);

    let begin = Instant::now();
    runner.run(&entry, 0).await.unwrap();

    assert_eq!(begin.elapsed(), Duration::from_secs(6));
    assert_eq!(ops.count("logs sock-shop/name=pod-delete 5s"), 2);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_while_polling() {
    let dir = tempfile::tempdir().unwrap();
    let entry = common::write_engine(dir.path(), "pod-delete", "sock-chaos");

    let (controller, signal) = shutdown_channel();
    let ops = Arc::new(FakeChaosOps::new().cancel_on("sock-chaos", controller));
    let runner = ExperimentRunner::new(ops.clone(), signal, RunnerSettings::default());

    let begin = Instant::now();
    let err = runner.run(&entry, 60).await.unwrap_err();

    assert!(matches!(err, DemoError::Cancelled { ref experiment } if experiment == "pod-delete"));
    assert_eq!(err.exit_code(), 2);
    assert_eq!(begin.elapsed(), Duration::ZERO);
    assert_eq!(ops.count("verdict sock-shop/sock-chaos-pod-delete"), 0);

    let applied = ops.applied();
    assert_eq!(applied.len(), 1);
    assert!(!applied[0].0.exists());
}

#[tokio::test]
async fn test_unreadable_manifest_fails_before_cluster_calls() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.yaml");
    std::fs::write(&path, "kind: ChaosEngine\nmetadata: {}\n").unwrap();
    let entry = litmus_demo::chaos::ExperimentEntry {
        id: "broken".to_string(),
        path,
    };

    let ops = Arc::new(FakeChaosOps::new());
    let (_controller, signal) = shutdown_channel();
    let runner = ExperimentRunner::new(ops.clone(), signal, RunnerSettings::default());

    let err = runner.run(&entry, 0).await.unwrap_err();
    assert!(matches!(err, DemoError::ManifestField { .. }));
    assert!(ops.calls().is_empty());
}
