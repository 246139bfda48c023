//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Console output with span timings
//! - Configurable log levels (overridable through `RUST_LOG`)
//! - JSON file logging with rotation
//!
//! # Example
//!
//! ```no_run
//! use geoexport::logging::init_logging;
//! use geoexport::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the evaluation of one export request
///
/// # Example
///
/// ```no_run
/// use geoexport::log_export_outcome;
///
/// let identifier = "min_lat=0.0_min_lon=36.0_max_lat=0.1_max_lon=36.1_dates=2021-01-01_2021-12-31";
/// log_export_outcome!(identifier, "skipped-exists");
/// ```
#[macro_export]
macro_rules! log_export_outcome {
    ($identifier:expr, $outcome:expr) => {
        tracing::info!(
            identifier = %$identifier,
            outcome = %$outcome,
            "Export evaluated"
        );
    };
}

/// Log the completion of a scheduling pass
///
/// # Example
///
/// ```no_run
/// use geoexport::log_schedule_complete;
/// use std::time::Duration;
///
/// log_schedule_complete!(12, Duration::from_secs(4));
/// ```
#[macro_export]
macro_rules! log_schedule_complete {
    ($count:expr, $duration:expr) => {
        tracing::info!(
            count = $count,
            duration_ms = $duration.as_millis() as u64,
            "Scheduling pass completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use geoexport::log_error_with_context;
/// use geoexport::domain::GeoExportError;
///
/// let error = GeoExportError::UpstreamUnavailable("503".to_string());
/// log_error_with_context!(&error, "Failed to list active jobs");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log progress through a list of requests
///
/// # Example
///
/// ```no_run
/// use geoexport::log_batch_processing;
///
/// log_batch_processing!(100, 1000);
/// ```
#[macro_export]
macro_rules! log_batch_processing {
    ($current:expr, $total:expr) => {
        tracing::debug!(
            current = $current,
            total = $total,
            progress_pct = ($current as f64 / ($total as f64).max(1.0) * 100.0),
            "Processing requests"
        );
    };
}
