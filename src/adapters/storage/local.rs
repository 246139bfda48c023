//! Local filesystem output store
//!
//! Mirrors a bucket on disk: object paths are relative to the root directory
//! and always `/`-separated.

use super::OutputStore;
use crate::domain::{GeoExportError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Output store backed by a directory tree
pub struct LocalOutputStore {
    root: PathBuf,
}

impl LocalOutputStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn relative_name(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(parts.join("/"))
    }
}

#[async_trait]
impl OutputStore for LocalOutputStore {
    async fn list_outputs(&self, prefix: &str) -> Result<Vec<String>> {
        if !tokio::fs::try_exists(&self.root).await? {
            tracing::warn!(root = %self.root.display(), "Output directory does not exist");
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        let mut pending = vec![self.root.clone()];
        while let Some(dir) = pending.pop() {
            let mut entries = tokio::fs::read_dir(&dir).await.map_err(|e| {
                GeoExportError::Storage(format!("failed to read {}: {e}", dir.display()))
            })?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if entry.file_type().await?.is_dir() {
                    pending.push(path);
                } else if let Some(name) = self.relative_name(&path) {
                    if name.starts_with(prefix) {
                        names.push(name);
                    }
                }
            }
        }
        names.sort();

        tracing::info!(
            root = %self.root.display(),
            prefix = %prefix,
            count = names.len(),
            "Loaded existing outputs from local storage"
        );
        Ok(names)
    }

    fn location(&self) -> String {
        self.root.display().to_string()
    }
}
