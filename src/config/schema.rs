//! Configuration schema types
//!
//! This module defines the configuration structure for geoexport. Every
//! section maps to a TOML table; most fields have defaults so a minimal file
//! only names the imagery project and the destination bucket.

use crate::config::BearerToken;
use serde::{Deserialize, Serialize};

/// Runtime environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment
    #[default]
    Development,
    /// Staging environment
    Staging,
    /// Production environment
    Production,
}

/// Output store selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Google Cloud Storage bucket
    #[default]
    Gcs,
    /// Local directory mirroring a bucket
    Local,
}

/// Main geoexport configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoExportConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: Environment,

    /// Imagery service connection
    pub imagery: ImageryConfig,

    /// Durable output storage
    #[serde(default)]
    pub storage: StorageConfig,

    /// Export scheduling settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Region tiling settings
    #[serde(default)]
    pub tiling: TilingConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl GeoExportConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.imagery.validate(&self.environment)?;
        self.storage.validate()?;
        self.export.validate()?;
        self.tiling.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Imagery service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageryConfig {
    /// Base URL of the imagery service REST API
    #[serde(default = "default_imagery_base_url")]
    pub base_url: String,

    /// Cloud project the export jobs run under
    #[serde(default)]
    pub project: String,

    /// Bearer token
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub token: Option<BearerToken>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// TLS certificate verification enabled
    ///
    /// Cannot be disabled in production environments.
    #[serde(default = "default_true")]
    pub tls_verify: bool,
}

impl ImageryConfig {
    fn validate(&self, environment: &Environment) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("imagery.base_url cannot be empty".to_string());
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err("imagery.base_url must start with http:// or https://".to_string());
        }

        if self.project.trim().is_empty() {
            return Err("imagery.project cannot be empty".to_string());
        }

        if self.timeout_seconds == 0 {
            return Err("imagery.timeout_seconds must be > 0".to_string());
        }

        if *environment == Environment::Production && !self.tls_verify {
            return Err(
                "TLS certificate verification cannot be disabled in production environments. \
                Set 'tls_verify = true' or use environment = \"development\" for local testing."
                    .to_string(),
            );
        }

        Ok(())
    }
}

impl Default for ImageryConfig {
    fn default() -> Self {
        Self {
            base_url: default_imagery_base_url(),
            project: String::new(),
            token: None,
            timeout_seconds: default_timeout_seconds(),
            tls_verify: true,
        }
    }
}

/// Durable storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Backend to list outputs from (gcs or local)
    #[serde(default)]
    pub backend: StorageBackend,

    /// Destination bucket exports are written to
    #[serde(default = "default_bucket")]
    pub bucket: String,

    /// Path prefix every export destination is placed under
    #[serde(default = "default_storage_prefix")]
    pub prefix: String,

    /// Cloud Storage JSON API endpoint
    #[serde(default = "default_storage_base_url")]
    pub base_url: String,

    /// Bearer token for bucket listing (optional for public buckets)
    #[serde(default)]
    pub token: Option<BearerToken>,

    /// Root directory when backend = "local"
    #[serde(default)]
    pub local_root: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl StorageConfig {
    fn validate(&self) -> Result<(), String> {
        if self.bucket.trim().is_empty() {
            return Err("storage.bucket cannot be empty".to_string());
        }

        match self.backend {
            StorageBackend::Gcs => {
                if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://")
                {
                    return Err(
                        "storage.base_url must start with http:// or https://".to_string()
                    );
                }
            }
            StorageBackend::Local => {
                if self
                    .local_root
                    .as_ref()
                    .map(|s| s.trim().is_empty())
                    .unwrap_or(true)
                {
                    return Err(
                        "storage.local_root is required when storage.backend = 'local'"
                            .to_string(),
                    );
                }
            }
        }

        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            bucket: default_bucket(),
            prefix: default_storage_prefix(),
            base_url: default_storage_base_url(),
            token: None,
            local_root: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Export scheduling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Days of imagery reduced into each mosaic
    #[serde(default = "default_days_per_timestep")]
    pub days_per_timestep: u32,

    /// Timesteps used to derive a missing start or end date
    #[serde(default = "default_num_timesteps")]
    pub num_timesteps: u32,

    /// Compositing strategy (fast or thorough)
    #[serde(default = "default_strategy")]
    pub strategy: String,

    /// Block until each submitted job terminates
    #[serde(default)]
    pub monitor: bool,

    /// Seconds between job state polls while monitoring
    #[serde(default = "default_poll_interval_seconds")]
    pub poll_interval_seconds: u64,

    /// Remote concurrent-job ceiling
    #[serde(default = "default_max_pending_jobs")]
    pub max_pending_jobs: usize,

    /// Metres exported on each side of a labelled point
    #[serde(default = "default_surrounding_metres")]
    pub surrounding_metres: f64,

    /// Maximum tile edge for region exports
    ///
    /// Regions are exported as a single polygon when this is unset, which
    /// only the `--single-polygon` flag can do since TOML has no null.
    #[serde(default = "default_metres_per_polygon")]
    pub metres_per_polygon: Option<f64>,

    /// Output tile size in pixels
    #[serde(default)]
    pub file_dimensions: Option<u32>,

    /// Output resolution in metres per pixel
    #[serde(default = "default_scale")]
    pub scale: f64,

    /// Upper bound on exported pixels per job
    #[serde(default = "default_max_pixels")]
    pub max_pixels: f64,

    /// Skip exports whose output already exists in storage
    #[serde(default = "default_true")]
    pub check_storage: bool,

    /// Skip exports with a queued or running job
    #[serde(default = "default_true")]
    pub check_pending: bool,

    /// Dry run mode - evaluate the ledger but submit nothing (default: false)
    #[serde(default)]
    pub dry_run: bool,
}

impl ExportConfig {
    fn validate(&self) -> Result<(), String> {
        if self.days_per_timestep == 0 {
            return Err("export.days_per_timestep must be > 0".to_string());
        }

        if self.num_timesteps == 0 {
            return Err("export.num_timesteps must be > 0".to_string());
        }

        let valid_strategies = ["fast", "thorough", "slow"];
        if !valid_strategies.contains(&self.strategy.as_str()) {
            return Err(format!(
                "Invalid export.strategy '{}'. Must be one of: {}",
                self.strategy,
                valid_strategies.join(", ")
            ));
        }

        if self.poll_interval_seconds == 0 {
            return Err("export.poll_interval_seconds must be > 0".to_string());
        }

        if self.max_pending_jobs == 0 {
            return Err("export.max_pending_jobs must be > 0".to_string());
        }

        if !self.surrounding_metres.is_finite() || self.surrounding_metres <= 0.0 {
            return Err(format!(
                "export.surrounding_metres must be positive, got {}",
                self.surrounding_metres
            ));
        }

        if let Some(metres) = self.metres_per_polygon {
            if !metres.is_finite() || metres <= 0.0 {
                return Err(format!(
                    "export.metres_per_polygon must be positive, got {metres}"
                ));
            }
        }

        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(format!("export.scale must be positive, got {}", self.scale));
        }

        if !self.max_pixels.is_finite() || self.max_pixels < 1.0 {
            return Err(format!(
                "export.max_pixels must be >= 1, got {}",
                self.max_pixels
            ));
        }

        if self.file_dimensions == Some(0) {
            return Err("export.file_dimensions must be > 0 when set".to_string());
        }

        Ok(())
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            days_per_timestep: default_days_per_timestep(),
            num_timesteps: default_num_timesteps(),
            strategy: default_strategy(),
            monitor: false,
            poll_interval_seconds: default_poll_interval_seconds(),
            max_pending_jobs: default_max_pending_jobs(),
            surrounding_metres: default_surrounding_metres(),
            metres_per_polygon: default_metres_per_polygon(),
            file_dimensions: None,
            scale: default_scale(),
            max_pixels: default_max_pixels(),
            check_storage: true,
            check_pending: true,
            dry_run: false,
        }
    }
}

/// Region tiling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TilingConfig {
    /// Grid rounding (ceil or truncate)
    #[serde(default = "default_rounding")]
    pub rounding: String,
}

impl TilingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid = ["ceil", "truncate"];
        if !valid.contains(&self.rounding.as_str()) {
            return Err(format!(
                "Invalid tiling.rounding '{}'. Must be one of: {}",
                self.rounding,
                valid.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for TilingConfig {
    fn default() -> Self {
        Self {
            rounding: default_rounding(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub local_enabled: bool,

    #[serde(default = "default_local_path")]
    pub local_path: String,

    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err(
                "logging.local_path cannot be empty when local logging is enabled".to_string(),
            );
        }

        Ok(())
    }

    /// Console-only logging, used before a configuration file is loaded
    pub fn console_only() -> Self {
        Self {
            local_enabled: false,
            ..Self::default()
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_imagery_base_url() -> String {
    "https://earthengine.googleapis.com".to_string()
}

fn default_bucket() -> String {
    "crop-mask-tifs".to_string()
}

fn default_storage_prefix() -> String {
    "tifs".to_string()
}

fn default_storage_base_url() -> String {
    "https://storage.googleapis.com".to_string()
}

fn default_days_per_timestep() -> u32 {
    30
}

fn default_num_timesteps() -> u32 {
    12
}

fn default_strategy() -> String {
    "fast".to_string()
}

fn default_poll_interval_seconds() -> u64 {
    30
}

fn default_max_pending_jobs() -> usize {
    3000
}

fn default_surrounding_metres() -> f64 {
    80.0
}

fn default_metres_per_polygon() -> Option<f64> {
    Some(10_000.0)
}

fn default_scale() -> f64 {
    10.0
}

fn default_max_pixels() -> f64 {
    1e13
}

fn default_rounding() -> String {
    "truncate".to_string()
}

fn default_local_path() -> String {
    "/var/log/geoexport".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
