//! Configuration management for geoexport.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! geoexport uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `GEOEXPORT_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use geoexport::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("geoexport.toml")?;
//!
//! println!("Imagery project: {}", config.imagery.project);
//! println!("Bucket: {}", config.storage.bucket);
//! println!("Strategy: {}", config.export.strategy);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level
//! - [`ImageryConfig`] - Imagery service endpoint, project and token
//! - [`StorageConfig`] - Output bucket, prefix and listing backend
//! - [`ExportConfig`] - Time steps, strategy, monitoring and ledger checks
//! - [`TilingConfig`] - Region grid rounding
//! - [`LoggingConfig`] - File logging
//!
//! # Example Configuration
//!
//! ```toml
//! environment = "production"
//!
//! [application]
//! log_level = "info"
//!
//! [imagery]
//! base_url = "https://earthengine.googleapis.com"
//! project = "crop-mask"
//! token = "${GEOEXPORT_IMAGERY_TOKEN}"
//!
//! [storage]
//! bucket = "crop-mask-tifs"
//! prefix = "tifs"
//!
//! [export]
//! days_per_timestep = 30
//! num_timesteps = 12
//! strategy = "fast"
//! max_pending_jobs = 3000
//!
//! [tiling]
//! rounding = "truncate"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, parse_config};
pub use schema::{
    ApplicationConfig, Environment, ExportConfig, GeoExportConfig, ImageryConfig, LoggingConfig,
    StorageBackend, StorageConfig, TilingConfig,
};
pub use secret::{redact_tokens, BearerToken};
