//! Integration tests for graceful shutdown
//!
//! These tests verify that:
//! - A shutdown signal stops the pass between requests
//! - Monitoring stops promptly without losing the submitted job
//! - An interrupted pass reports exit code 130

mod common;

use common::{point, scheduler, scheduler_config, FakeImagery, MemoryStore};
use geoexport::domain::{ExportOutcome, JobState};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

#[tokio::test]
async fn test_shutdown_signal_propagation() {
    let (shutdown_tx, shutdown_rx1) = watch::channel(false);
    let shutdown_rx2 = shutdown_rx1.clone();

    assert!(!*shutdown_rx1.borrow());
    assert!(!*shutdown_rx2.borrow());

    shutdown_tx.send(true).unwrap();

    assert!(*shutdown_rx1.borrow());
    assert!(*shutdown_rx2.borrow());
}

#[tokio::test]
async fn test_shutdown_before_pass_submits_nothing() {
    let imagery = Arc::new(FakeImagery::new());
    let (tx, rx) = watch::channel(false);
    tx.send(true).unwrap();

    let report = scheduler(scheduler_config(), imagery.clone(), Arc::new(MemoryStore::new()), rx)
        .plan_and_submit(&[point(0.5, 36.5), point(-1.2, 34.9)])
        .await
        .unwrap();

    assert!(report.interrupted);
    assert_eq!(report.total_requests(), 0);
    assert_eq!(report.exit_code(), 130);
    assert!(imagery.submitted().is_empty());
}

#[tokio::test]
async fn test_shutdown_interrupts_monitoring() {
    let imagery = Arc::new(FakeImagery::new());
    imagery.report_state(JobState::Running);
    let (tx, rx) = watch::channel(false);

    let mut config = scheduler_config();
    config.monitor = true;
    config.poll_interval = Duration::from_secs(60);

    let pass = scheduler(config, imagery.clone(), Arc::new(MemoryStore::new()), rx);

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let _ = tx.send(true);
    });

    let report = tokio::time::timeout(
        Duration::from_secs(10),
        pass.plan_and_submit(&[point(0.5, 36.5), point(-1.2, 34.9)]),
    )
    .await
    .expect("monitoring should stop on shutdown")
    .unwrap();

    assert!(report.interrupted);
    assert_eq!(report.exit_code(), 130);

    // The first job was submitted before the signal and is still recorded
    assert_eq!(report.total_requests(), 1);
    match &report.outcomes[0].outcome {
        ExportOutcome::Submitted { job, final_state } => {
            assert_eq!(job.as_str(), "job-0");
            assert!(final_state.is_none());
        }
        other => panic!("unexpected outcome {other}"),
    }
    assert_eq!(imagery.submitted().len(), 1);
}

#[tokio::test]
async fn test_dropped_sender_keeps_monitoring() {
    let imagery = Arc::new(FakeImagery::new());
    imagery.script_states("job-0", vec![JobState::Running, JobState::Completed]);
    let (tx, rx) = watch::channel(false);
    drop(tx);

    let mut config = scheduler_config();
    config.monitor = true;

    let report = scheduler(config, imagery, Arc::new(MemoryStore::new()), rx)
        .plan_and_submit(&[point(0.5, 36.5)])
        .await
        .unwrap();

    assert!(!report.interrupted);
    match &report.outcomes[0].outcome {
        ExportOutcome::Submitted { final_state, .. } => {
            assert_eq!(*final_state, Some(JobState::Completed))
        }
        other => panic!("unexpected outcome {other}"),
    }
}
