//! Status command implementation
//!
//! Shows what the export ledger sees: outputs already in storage and jobs
//! queued or running remotely, against the concurrent-job ceiling.

use crate::adapters::imagery::{HttpImageryService, ImageryService};
use crate::adapters::storage::create_output_store;
use crate::config::load_config;
use crate::domain::JobState;
use clap::Args;
use std::sync::Arc;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Storage prefix to count outputs under (defaults to storage.prefix)
    #[arg(long)]
    pub prefix: Option<String>,

    /// List every active job
    #[arg(long)]
    pub jobs: bool,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking export status");

        println!("📊 Export Status");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {}", e);
                return Ok(2);
            }
        };

        let imagery: Arc<dyn ImageryService> =
            match HttpImageryService::new(config.imagery.clone()) {
                Ok(s) => Arc::new(s),
                Err(e) => {
                    println!("❌ Failed to create imagery client");
                    println!("   Error: {}", e);
                    return Ok(4);
                }
            };
        let store = match create_output_store(&config.storage) {
            Ok(s) => s,
            Err(e) => {
                println!("❌ Failed to create output store");
                println!("   Error: {}", e);
                return Ok(4);
            }
        };

        let prefix = self.prefix.as_deref().unwrap_or(&config.storage.prefix);
        let outputs = match store.list_outputs(prefix).await {
            Ok(o) => o,
            Err(e) => {
                println!("❌ Failed to list outputs in {}", store.location());
                println!("   Error: {}", e);
                return Ok(4);
            }
        };

        let jobs = match imagery.list_active_jobs().await {
            Ok(j) => j,
            Err(e) => {
                println!("❌ Failed to list active jobs");
                println!("   Error: {}", e);
                return Ok(4);
            }
        };

        let running = jobs.iter().filter(|j| j.state == JobState::Running).count();
        let queued = jobs.iter().filter(|j| j.state == JobState::Queued).count();
        let cap = config.export.max_pending_jobs;

        println!("Outputs in {}/{}: {}", store.location(), prefix, outputs.len());
        println!("Active jobs: {} ({} running, {} queued)", jobs.len(), running, queued);
        println!("Job ceiling: {}", cap);

        if jobs.len() >= cap {
            println!("⚠️  At capacity: new exports will be skipped");
        } else {
            println!("✅ {} job slot(s) available", cap - jobs.len());
        }

        if self.jobs && !jobs.is_empty() {
            println!();
            println!("{:<30} {:<10} {:<60}", "Job ID", "State", "Description");
            println!("{}", "-".repeat(100));
            for job in &jobs {
                let status = match job.state {
                    JobState::Running => "🔄 running",
                    _ => "⏸️  queued",
                };
                println!("{:<30} {:<10} {:<60}", job.id.as_str(), status, job.description);
            }
        }

        println!();
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    #[test]
    fn test_status_args() {
        let cli = Cli::parse_from(["geoexport", "status", "--prefix", "tifs/Kenya", "--jobs"]);
        match cli.command {
            Commands::Status(args) => {
                assert_eq!(args.prefix.as_deref(), Some("tifs/Kenya"));
                assert!(args.jobs);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
