//! Integration tests for dry-run mode
//!
//! These tests verify that `--dry-run` evaluates the ledger normally but never
//! composites or submits anything.

mod common;

use common::{point, scheduler, scheduler_config, FakeImagery, MemoryStore};
use geoexport::cli::commands::schedule::ScheduleArgs;
use geoexport::config::GeoExportConfig;
use geoexport::domain::{ExportOutcome, JobState};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::sync::watch;

fn dry_run_config() -> geoexport::core::scheduler::SchedulerConfig {
    let mut config = scheduler_config();
    config.dry_run = true;
    config
}

#[tokio::test]
async fn test_dry_run_submits_nothing() {
    let imagery = Arc::new(FakeImagery::new());
    let store = Arc::new(MemoryStore::new());
    let (_tx, rx) = watch::channel(false);

    let report = scheduler(dry_run_config(), imagery.clone(), store.clone(), rx)
        .plan_and_submit(&[point(0.5, 36.5), point(-1.2, 34.9)])
        .await
        .unwrap();

    assert!(report.dry_run);
    assert_eq!(report.submitted(), 2);
    for entry in &report.outcomes {
        match &entry.outcome {
            ExportOutcome::Submitted { job, final_state } => {
                assert!(job.is_dry_run());
                assert!(final_state.is_none());
            }
            other => panic!("unexpected outcome {other}"),
        }
    }

    assert_eq!(imagery.composite_calls(), 0);
    assert!(imagery.submitted().is_empty());

    // The ledger is still consulted
    assert_eq!(imagery.list_calls(), 1);
    assert_eq!(store.list_calls(), 1);
}

#[tokio::test]
async fn test_dry_run_still_skips_existing_and_pending() {
    let imagery = Arc::new(FakeImagery::new());
    let store = Arc::new(MemoryStore::new());
    let (_tx, rx) = watch::channel(false);

    // A real pass submits the first point
    let first = scheduler(scheduler_config(), imagery.clone(), store.clone(), rx.clone())
        .plan_and_submit(&[point(0.5, 36.5)])
        .await
        .unwrap();
    assert_eq!(first.submitted(), 1);

    let report = scheduler(dry_run_config(), imagery.clone(), store, rx)
        .plan_and_submit(&[point(0.5, 36.5), point(-1.2, 34.9)])
        .await
        .unwrap();

    assert_eq!(report.skipped_pending(), 1);
    assert_eq!(report.submitted(), 1);
    assert_eq!(imagery.submitted().len(), 1);
}

#[tokio::test]
async fn test_dry_run_never_polls() {
    let imagery = Arc::new(FakeImagery::new());
    imagery.report_state(JobState::Running);
    let (_tx, rx) = watch::channel(false);

    let mut config = dry_run_config();
    config.monitor = true;

    let report = scheduler(config, imagery.clone(), Arc::new(MemoryStore::new()), rx)
        .plan_and_submit(&[point(0.5, 36.5)])
        .await
        .unwrap();

    assert_eq!(report.exit_code(), 0);
    assert_eq!(imagery.state_polls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_dry_run_flag_overrides_config() {
    let mut config: GeoExportConfig =
        toml::from_str("[imagery]\nproject = \"crop-mask\"\n").unwrap();
    assert!(!config.export.dry_run);

    let args = ScheduleArgs {
        dry_run: true,
        monitor: false,
        strategy: None,
    };
    args.apply(&mut config);

    assert!(config.export.dry_run);
}
