//! Cancel-all command implementation
//!
//! Cancels every queued or running export job of the configured project.

use crate::adapters::imagery::{HttpImageryService, ImageryService};
use crate::config::load_config;
use clap::Args;
use std::io::{self, Write};

/// Arguments for the cancel-all command
#[derive(Args, Debug)]
pub struct CancelAllArgs {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

impl CancelAllArgs {
    /// Execute the cancel-all command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting cancel-all command");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        let imagery = match HttpImageryService::new(config.imagery.clone()) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Failed to create imagery client: {e}");
                return Ok(4);
            }
        };

        let jobs = match imagery.list_active_jobs().await {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Failed to list active jobs");
                eprintln!("Failed to list active jobs: {e}");
                return Ok(4);
            }
        };

        if jobs.is_empty() {
            println!("✅ No active jobs to cancel");
            return Ok(0);
        }

        if !self.yes {
            println!("{} active job(s) in project {}", jobs.len(), config.imagery.project);
            print!("Cancel all of them? [y/N]: ");
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;

            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Cancel aborted.");
                return Ok(0);
            }
        }

        println!("🛑 Cancelling {} job(s)...", jobs.len());

        let mut failed = 0;
        for job in &jobs {
            match imagery.cancel_job(&job.id).await {
                Ok(()) => {
                    tracing::info!(
                        job = %job.id,
                        description = %job.description,
                        "Job cancelled"
                    );
                }
                Err(e) if e.is_fatal() => {
                    eprintln!("Authentication failed while cancelling: {e}");
                    return Ok(4);
                }
                Err(e) => {
                    failed += 1;
                    tracing::warn!(job = %job.id, error = %e, "Failed to cancel job");
                    eprintln!("  - {}: {e}", job.id);
                }
            }
        }

        if failed == 0 {
            println!("✅ Cancelled {} job(s)", jobs.len());
            Ok(0)
        } else {
            println!("⚠️  Cancelled {} of {} job(s)", jobs.len() - failed, jobs.len());
            Ok(1)
        }
    }
}
