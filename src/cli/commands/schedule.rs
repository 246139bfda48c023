//! Shared scheduling pass for the `labels` and `regions` commands

use crate::adapters::imagery::{HttpImageryService, ImageryService};
use crate::adapters::storage::create_output_store;
use crate::config::GeoExportConfig;
use crate::core::composite::{build_compositor, CompositeStrategy};
use crate::core::ledger::ExportLedger;
use crate::core::scheduler::{ExportScheduler, ScheduleReport, SchedulerConfig};
use crate::domain::ScheduleInput;
use clap::Args;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::watch;

/// Flags shared by every command that runs a scheduling pass
#[derive(Args, Debug, Clone, Default)]
pub struct ScheduleArgs {
    /// Evaluate the ledger but do not composite or submit anything
    #[arg(long)]
    pub dry_run: bool,

    /// Wait for every submitted job to finish
    #[arg(long)]
    pub monitor: bool,

    /// Compositing strategy (fast or thorough)
    #[arg(long, value_name = "STRATEGY")]
    pub strategy: Option<String>,
}

impl ScheduleArgs {
    /// Applies command-line overrides to the loaded configuration
    pub fn apply(&self, config: &mut GeoExportConfig) {
        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.export.dry_run = true;
        }
        if self.monitor {
            tracing::info!("Enabling job monitoring from CLI");
            config.export.monitor = true;
        }
        if let Some(strategy) = &self.strategy {
            tracing::info!(strategy = %strategy, "Overriding compositing strategy from CLI");
            config.export.strategy = strategy.clone();
        }
    }
}

/// Runs one scheduling pass and prints its summary
///
/// Returns the process exit code.
pub async fn run_pass(
    config: GeoExportConfig,
    inputs: Vec<ScheduleInput>,
    shutdown_signal: watch::Receiver<bool>,
) -> anyhow::Result<i32> {
    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "Configuration validation failed");
        eprintln!("Configuration validation failed: {e}");
        return Ok(2);
    }

    let strategy = match CompositeStrategy::from_str(&config.export.strategy) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }
    };

    let scheduler_config = match SchedulerConfig::from_config(&config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }
    };

    if scheduler_config.dry_run {
        println!("🔍 DRY RUN MODE - No jobs will be submitted");
        println!();
    }

    let scheduler = match connect(&config, scheduler_config, strategy, shutdown_signal).await {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize scheduler");
            eprintln!("Failed to initialize export: {e}");
            return Ok(4);
        }
    };

    println!("🚀 Scheduling {} input(s)...", inputs.len());
    println!();

    let report = match scheduler.plan_and_submit(&inputs).await {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(error = %e, "Scheduling pass failed");
            eprintln!("Scheduling failed: {e}");
            return Ok(if e.is_fatal() { 4 } else { 5 });
        }
    };

    report.log_summary();
    print_summary(&report);

    Ok(report.exit_code())
}

async fn connect(
    config: &GeoExportConfig,
    scheduler_config: SchedulerConfig,
    strategy: CompositeStrategy,
    shutdown_signal: watch::Receiver<bool>,
) -> crate::domain::Result<ExportScheduler> {
    let imagery: Arc<dyn ImageryService> =
        Arc::new(HttpImageryService::new(config.imagery.clone())?);
    let store = create_output_store(&config.storage)?;

    if !scheduler_config.dry_run {
        imagery.authenticate().await?;
    }

    let ledger = Arc::new(ExportLedger::new(imagery.clone(), store));
    let compositor = build_compositor(strategy, imagery.clone());

    Ok(ExportScheduler::new(
        scheduler_config,
        imagery,
        compositor,
        ledger,
        shutdown_signal,
    ))
}

fn print_summary(report: &ScheduleReport) {
    println!();
    println!("📊 Scheduling Summary:");
    println!("  Run ID: {}", report.run_id);
    println!("  Total Requests: {}", report.total_requests());
    println!("  Submitted: {}", report.submitted());
    println!("  Skipped (exists): {}", report.skipped_exists());
    println!("  Skipped (pending): {}", report.skipped_pending());
    println!("  Skipped (quota): {}", report.skipped_quota_capped());
    println!("  Failed: {}", report.submit_failed());
    println!("  Rejected Inputs: {}", report.rejected.len());
    println!("  Duration: {:.2}s", report.duration.as_secs_f64());
    println!();

    if !report.rejected.is_empty() {
        println!("⚠️  Rejected inputs:");
        for rejected in report.rejected.iter().take(10) {
            println!("  - {}: {}", rejected.input, rejected.reason);
        }
        if report.rejected.len() > 10 {
            println!("  ... and {} more", report.rejected.len() - 10);
        }
        println!();
    }

    let failures: Vec<_> = report
        .outcomes
        .iter()
        .filter(|e| e.outcome.is_failure())
        .collect();
    if !failures.is_empty() {
        println!("⚠️  Failed submissions:");
        for entry in failures.iter().take(10) {
            println!("  - {}: {}", entry.request.identifier, entry.outcome);
        }
        if failures.len() > 10 {
            println!("  ... and {} more", failures.len() - 10);
        }
        println!();
    }

    if report.interrupted {
        println!("⚠️  Scheduling interrupted. Submitted jobs keep running remotely.");
        println!("   Run the same command again; finished and pending work is skipped.");
    } else if report.is_successful() {
        println!("✅ Scheduling completed successfully!");
    } else {
        println!("⚠️  Scheduling completed with failures");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GeoExportConfig {
        toml::from_str("[imagery]\nproject = \"crop-mask\"\n").unwrap()
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = config();
        let args = ScheduleArgs {
            dry_run: true,
            monitor: true,
            strategy: Some("thorough".to_string()),
        };

        args.apply(&mut config);

        assert!(config.export.dry_run);
        assert!(config.export.monitor);
        assert_eq!(config.export.strategy, "thorough");
    }

    #[test]
    fn test_apply_without_flags_keeps_config() {
        let mut config = config();
        ScheduleArgs::default().apply(&mut config);

        assert!(!config.export.dry_run);
        assert!(!config.export.monitor);
        assert_eq!(config.export.strategy, "fast");
    }

    #[tokio::test]
    async fn test_invalid_strategy_is_a_configuration_error() {
        let mut config = config();
        config.export.strategy = "median".to_string();
        let (_tx, rx) = watch::channel(false);

        let code = run_pass(config, Vec::new(), rx).await.unwrap();
        assert_eq!(code, 2);
    }
}
