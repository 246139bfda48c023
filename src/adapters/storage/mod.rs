//! Durable output storage
//!
//! - [`OutputStore`] - listing trait consulted by the export ledger
//! - [`GcsOutputStore`] - Cloud Storage bucket listing
//! - [`LocalOutputStore`] - directory tree listing

pub mod gcs;
pub mod local;
pub mod traits;

pub use gcs::GcsOutputStore;
pub use local::LocalOutputStore;
pub use traits::OutputStore;

use crate::config::{StorageBackend, StorageConfig};
use crate::domain::{GeoExportError, Result};
use std::sync::Arc;

/// Create the output store selected by `storage.backend`
///
/// # Errors
///
/// Returns a configuration error if the selected backend is missing settings.
pub fn create_output_store(config: &StorageConfig) -> Result<Arc<dyn OutputStore>> {
    match config.backend {
        StorageBackend::Gcs => {
            tracing::info!(bucket = %config.bucket, "Creating Cloud Storage output store");
            Ok(Arc::new(GcsOutputStore::new(config.clone())?))
        }
        StorageBackend::Local => {
            let root = config.local_root.as_ref().ok_or_else(|| {
                GeoExportError::Configuration(
                    "storage.local_root is required when storage.backend = 'local'".to_string(),
                )
            })?;
            tracing::info!(root = %root, "Creating local output store");
            Ok(Arc::new(LocalOutputStore::new(root)))
        }
    }
}
