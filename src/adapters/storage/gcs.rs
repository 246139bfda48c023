//! Google Cloud Storage output store
//!
//! Lists objects through the JSON API:
//! `GET {base_url}/storage/v1/b/{bucket}/o?prefix=...&pageToken=...`.

use super::OutputStore;
use crate::config::StorageConfig;
use crate::domain::{GeoExportError, Result};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectList {
    #[serde(default)]
    items: Vec<ObjectItem>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct ObjectItem {
    name: String,
}

/// Bucket listing over the Cloud Storage JSON API
pub struct GcsOutputStore {
    client: Client,
    base_url: Url,
    config: StorageConfig,
}

impl GcsOutputStore {
    /// Create a new store for `config.bucket`
    pub fn new(config: StorageConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            GeoExportError::Configuration(format!(
                "invalid storage.base_url '{}': {e}",
                config.base_url
            ))
        })?;

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                GeoExportError::Configuration(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    fn list_url(&self, prefix: &str, page_token: Option<&str>) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                GeoExportError::Configuration(format!(
                    "storage.base_url '{}' cannot be a base URL",
                    self.config.base_url
                ))
            })?
            .pop_if_empty()
            .extend(["storage", "v1", "b", self.config.bucket.as_str(), "o"]);

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("prefix", prefix);
            query.append_pair("fields", "items(name),nextPageToken");
            if let Some(token) = page_token {
                query.append_pair("pageToken", token);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl OutputStore for GcsOutputStore {
    async fn list_outputs(&self, prefix: &str) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let url = self.list_url(prefix, page_token.as_deref())?;
            let mut request = self.client.get(url);
            if let Some(token) = self.config.token.as_ref().filter(|t| !t.is_blank()) {
                request = request.bearer_auth(token.expose());
            }

            let response = request.send().await.map_err(|e| {
                GeoExportError::Storage(format!(
                    "listing gs://{}/{prefix} failed: {e}",
                    self.config.bucket
                ))
            })?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(match status {
                    StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                        GeoExportError::AuthenticationRequired(format!(
                            "storage listing rejected with status {status}: {body}"
                        ))
                    }
                    _ => GeoExportError::Storage(format!(
                        "storage listing failed with status {status}: {body}"
                    )),
                });
            }

            let page: ObjectList = response.json().await.map_err(|e| {
                GeoExportError::Storage(format!("invalid storage listing body: {e}"))
            })?;
            names.extend(page.items.into_iter().map(|item| item.name));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        tracing::info!(
            bucket = %self.config.bucket,
            prefix = %prefix,
            count = names.len(),
            "Loaded existing outputs from cloud storage"
        );
        Ok(names)
    }

    fn location(&self) -> String {
        format!("gs://{}", self.config.bucket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_url() {
        let store = GcsOutputStore::new(StorageConfig::default()).unwrap();
        let url = store.list_url("tifs", Some("abc")).unwrap();
        assert_eq!(url.path(), "/storage/v1/b/crop-mask-tifs/o");
        let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(query.contains(&("prefix".to_string(), "tifs".to_string())));
        assert!(query.contains(&("pageToken".to_string(), "abc".to_string())));
    }

    #[test]
    fn test_location() {
        let store = GcsOutputStore::new(StorageConfig::default()).unwrap();
        assert_eq!(store.location(), "gs://crop-mask-tifs");
    }
}
