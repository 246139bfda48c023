//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for geoexport using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// geoexport - satellite imagery export scheduler
#[derive(Parser, Debug)]
#[command(name = "geoexport")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "geoexport.toml", env = "GEOEXPORT_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "GEOEXPORT_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export imagery around every labelled point in a label file
    Labels(commands::labels::LabelsArgs),

    /// Export imagery for named regions, tiled into polygons
    Regions(commands::regions::RegionsArgs),

    /// Cancel every queued or running export job
    CancelAll(commands::cancel_all::CancelAllArgs),

    /// Show existing outputs and active jobs
    Status(commands::status::StatusArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_labels() {
        let cli = Cli::parse_from(["geoexport", "labels", "labels.json"]);
        assert_eq!(cli.config, "geoexport.toml");
        assert!(matches!(cli.command, Commands::Labels(_)));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["geoexport", "--config", "custom.toml", "status"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["geoexport", "--log-level", "debug", "status"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["geoexport", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_regions_with_common_flags() {
        let cli = Cli::parse_from([
            "geoexport",
            "regions",
            "Kenya",
            "--monitor",
            "--strategy",
            "thorough",
        ]);
        match cli.command {
            Commands::Regions(args) => {
                assert!(args.schedule.monitor);
                assert_eq!(args.schedule.strategy.as_deref(), Some("thorough"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_requires_command() {
        assert!(Cli::try_parse_from(["geoexport"]).is_err());
    }
}
