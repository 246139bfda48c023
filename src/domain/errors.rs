//! Domain error types
//!
//! This module defines the error hierarchy for geoexport.
//! All errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main geoexport error type
///
/// The first four variants carry the propagation policy of a scheduling pass:
///
/// - [`GeoExportError::InvalidParameter`] and [`GeoExportError::InvalidDateRange`]
///   are caller errors. They reject a single scheduling input and are never retried.
/// - [`GeoExportError::AuthenticationRequired`] is fatal for the whole run.
/// - [`GeoExportError::UpstreamUnavailable`] is caught at the submission boundary
///   and recorded as a failed outcome for that request only.
#[derive(Debug, Error)]
pub enum GeoExportError {
    /// Malformed geometry or time inputs
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Date range ends in the future
    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    /// Missing or rejected credentials for the imagery service
    #[error("Authentication required: {0}")]
    AuthenticationRequired(String),

    /// The imagery service rejected a composite or submission request
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Output store errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl GeoExportError {
    /// Whether this error must abort the whole run rather than a single request
    pub fn is_fatal(&self) -> bool {
        matches!(self, GeoExportError::AuthenticationRequired(_))
    }

    /// Whether this error is a caller error (bad geometry or dates)
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            GeoExportError::InvalidParameter(_) | GeoExportError::InvalidDateRange(_)
        )
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for GeoExportError {
    fn from(err: std::io::Error) -> Self {
        GeoExportError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for GeoExportError {
    fn from(err: serde_json::Error) -> Self {
        GeoExportError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for GeoExportError {
    fn from(err: toml::de::Error) -> Self {
        GeoExportError::Configuration(format!("TOML parse error: {err}"))
    }
}
