//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the geoexport configuration file.

use crate::config::{load_config, StorageBackend};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates as well; a failure here covers both cases
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Environment: {:?}", config.environment);
        println!("  Log Level: {}", config.application.log_level);
        println!("  Imagery Service: {}", config.imagery.base_url);
        println!("  Imagery Project: {}", config.imagery.project);
        println!(
            "  Imagery Token: {}",
            if config.imagery.token.is_some() {
                "set"
            } else {
                "not set"
            }
        );

        match config.storage.backend {
            StorageBackend::Gcs => {
                println!(
                    "  Output Store: gs://{}/{}",
                    config.storage.bucket, config.storage.prefix
                );
            }
            StorageBackend::Local => {
                println!(
                    "  Output Store: {}/{}",
                    config.storage.local_root.as_deref().unwrap_or("."),
                    config.storage.prefix
                );
            }
        }

        println!("  Strategy: {}", config.export.strategy);
        println!(
            "  Time Steps: {} x {} days",
            config.export.num_timesteps, config.export.days_per_timestep
        );
        match config.export.metres_per_polygon {
            Some(metres) => println!(
                "  Polygon Size: {metres} m ({} rounding)",
                config.tiling.rounding
            ),
            None => println!("  Polygon Size: whole region"),
        }
        println!("  Job Ceiling: {}", config.export.max_pending_jobs);
        println!("  Monitor: {}", config.export.monitor);
        println!("  Dry Run: {}", config.export.dry_run);
        println!();
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_validate_missing_file() {
        let code = ValidateArgs {}.execute("does-not-exist.toml").await.unwrap();
        assert_eq!(code, 2);
    }

    #[tokio::test]
    async fn test_validate_valid_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[imagery]\nproject = \"crop-mask\"").unwrap();

        let code = ValidateArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, 0);
    }
}
