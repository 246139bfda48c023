//! Output store abstraction
//!
//! Durable storage is only ever listed: the imagery service writes the
//! rasters, this crate checks which ones are already there.

use crate::domain::Result;
use async_trait::async_trait;

/// Listing of materialised export outputs
#[async_trait]
pub trait OutputStore: Send + Sync {
    /// Every object path that starts with `prefix`, `/`-separated
    ///
    /// # Errors
    ///
    /// Returns a storage error if the listing fails, or
    /// `AuthenticationRequired` if the store rejects the credentials.
    async fn list_outputs(&self, prefix: &str) -> Result<Vec<String>>;

    /// Human-readable location, for logs and status output
    fn location(&self) -> String;
}
