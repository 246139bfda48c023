//! Labels command implementation
//!
//! Runs a scheduling pass over every labelled point in a label file.

use super::schedule::{run_pass, ScheduleArgs};
use crate::adapters::labels::load_labels;
use crate::config::load_config;
use clap::Args;
use std::path::PathBuf;
use tokio::sync::watch;

/// Arguments for the labels command
#[derive(Args, Debug)]
pub struct LabelsArgs {
    /// Label file: a JSON array or JSON Lines (.jsonl, .ndjson) of
    /// {lat, lon, start_date, end_date} rows
    pub file: PathBuf,

    /// Half-width in metres of the box exported around each point
    #[arg(long, value_name = "METRES")]
    pub surrounding_metres: Option<f64>,

    #[command(flatten)]
    pub schedule: ScheduleArgs,
}

impl LabelsArgs {
    /// Execute the labels command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!(file = %self.file.display(), "Starting labels command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };
        self.schedule.apply(&mut config);
        if let Some(metres) = self.surrounding_metres {
            config.export.surrounding_metres = metres;
        }

        let rows = match load_labels(&self.file).await {
            Ok(rows) => rows,
            Err(e) => {
                eprintln!("Failed to load labels: {e}");
                return Ok(5);
            }
        };

        let mut inputs = Vec::with_capacity(rows.len());
        let mut invalid = 0;
        for (index, row) in rows.iter().enumerate() {
            match row.to_input() {
                Ok(input) => inputs.push(input),
                Err(e) => {
                    invalid += 1;
                    tracing::warn!(row = index, error = %e, "Skipping invalid label");
                    eprintln!("Skipping label {index}: {e}");
                }
            }
        }

        println!("🏷️  Loaded {} label(s) from {}", rows.len(), self.file.display());

        let code = run_pass(config, inputs, shutdown_signal).await?;
        Ok(if code == 0 && invalid > 0 { 1 } else { code })
    }
}

#[cfg(test)]
mod tests {
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    #[test]
    fn test_labels_args() {
        let cli = Cli::parse_from([
            "geoexport",
            "labels",
            "labels.jsonl",
            "--dry-run",
            "--surrounding-metres",
            "100",
        ]);
        match cli.command {
            Commands::Labels(args) => {
                assert_eq!(args.file.to_str(), Some("labels.jsonl"));
                assert_eq!(args.surrounding_metres, Some(100.0));
                assert!(args.schedule.dry_run);
                assert!(!args.schedule.monitor);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
