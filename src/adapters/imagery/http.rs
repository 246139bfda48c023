//! HTTP imagery service implementation
//!
//! This module talks to the imagery service's JSON REST API. All endpoints
//! live under `{base_url}/v1/projects/{project}` and authenticate with a
//! bearer token.

use super::{CompositeRecipe, CompositeRequest, ExportOptions, ImageryService};
use crate::config::ImageryConfig;
use crate::domain::{
    ActiveJob, GeoExportError, JobHandle, JobState, MosaicHandle, Polygon, Result,
};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

#[derive(Serialize)]
struct CompositeBody<'a> {
    region: serde_json::Value,
    start_date: String,
    end_date: String,
    recipe: &'a CompositeRecipe,
    bands: &'a [String],
}

#[derive(Serialize)]
struct ExportBody<'a> {
    image: &'a MosaicHandle,
    region: serde_json::Value,
    destination: Destination<'a>,
    description: &'a str,
    scale: f64,
    max_pixels: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_dimensions: Option<u32>,
}

#[derive(Serialize)]
struct Destination<'a> {
    bucket: &'a str,
    file_name_prefix: &'a str,
}

#[derive(Deserialize)]
struct SubmitResponse {
    id: String,
}

#[derive(Deserialize)]
struct JobListResponse {
    #[serde(default)]
    jobs: Vec<ActiveJob>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// Imagery service reached over HTTP
///
/// # Example
///
/// ```no_run
/// use geoexport::adapters::imagery::{HttpImageryService, ImageryService};
/// use geoexport::config::ImageryConfig;
///
/// # async fn example() -> geoexport::domain::Result<()> {
/// let service = HttpImageryService::new(ImageryConfig::default())?;
/// service.authenticate().await?;
/// # Ok(())
/// # }
/// ```
pub struct HttpImageryService {
    /// HTTP client for making requests
    client: Client,

    /// `{base_url}/v1/projects/{project}/`
    project_url: Url,

    /// Imagery configuration
    config: ImageryConfig,
}

impl HttpImageryService {
    /// Create a new HTTP imagery service
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the base URL is invalid or the HTTP
    /// client cannot be built.
    pub fn new(config: ImageryConfig) -> Result<Self> {
        let base = Url::parse(config.base_url.trim_end_matches('/')).map_err(|e| {
            GeoExportError::Configuration(format!(
                "invalid imagery.base_url '{}': {e}",
                config.base_url
            ))
        })?;
        let project_url = base
            .join(&format!(
                "{}/v1/projects/{}/",
                base.path().trim_end_matches('/'),
                config.project
            ))
            .map_err(|e| GeoExportError::Configuration(format!("invalid imagery project: {e}")))?;

        let mut client_builder = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30));

        if !config.tls_verify {
            client_builder = client_builder.danger_accept_invalid_certs(true);
        }

        let client = client_builder.build().map_err(|e| {
            GeoExportError::Configuration(format!("failed to build HTTP client: {e}"))
        })?;

        Ok(Self {
            client,
            project_url,
            config,
        })
    }

    /// Base URL of the imagery service
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.project_url.join(path).map_err(|e| {
            GeoExportError::Other(format!("failed to build imagery URL for '{path}': {e}"))
        })
    }

    fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        match &self.config.token {
            Some(token) if !token.is_blank() => Ok(request.bearer_auth(token.expose())),
            _ => Err(GeoExportError::AuthenticationRequired(
                "imagery.token is not set".to_string(),
            )),
        }
    }

    async fn send(&self, request: RequestBuilder, operation: &str) -> Result<Response> {
        let response = self.authorize(request)?.send().await.map_err(|e| {
            GeoExportError::UpstreamUnavailable(format!("{operation} request failed: {e}"))
        })?;
        check_status(response, operation).await
    }
}

/// Maps a non-success response to the error the scheduler acts on
async fn check_status(response: Response, operation: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Err(GeoExportError::AuthenticationRequired(format!(
                "{operation} rejected with status {status}: {body}"
            )))
        }
        _ => Err(GeoExportError::UpstreamUnavailable(format!(
            "{operation} failed with status {status}: {body}"
        ))),
    }
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response, operation: &str) -> Result<T> {
    response.json::<T>().await.map_err(|e| {
        GeoExportError::UpstreamUnavailable(format!("{operation} returned an invalid body: {e}"))
    })
}

#[async_trait]
impl ImageryService for HttpImageryService {
    async fn authenticate(&self) -> Result<()> {
        let url = self.endpoint("")?;
        self.send(self.client.get(url), "authenticate").await?;
        tracing::info!(
            base_url = %self.config.base_url,
            project = %self.config.project,
            "Authenticated with imagery service"
        );
        Ok(())
    }

    async fn composite(&self, request: &CompositeRequest) -> Result<MosaicHandle> {
        let url = self.endpoint("composites")?;
        let body = CompositeBody {
            region: request.region.to_geojson(),
            start_date: request.window.start.to_string(),
            end_date: request.window.end.to_string(),
            recipe: &request.recipe,
            bands: &request.bands,
        };

        tracing::debug!(window = %request.window, "Requesting composite");
        let response = self
            .send(self.client.post(url).json(&body), "composite")
            .await?;
        decode(response, "composite").await
    }

    async fn submit_export(
        &self,
        image: &MosaicHandle,
        region: &Polygon,
        destination: &str,
        description: &str,
        options: &ExportOptions,
    ) -> Result<JobHandle> {
        let url = self.endpoint("exports")?;
        let body = ExportBody {
            image,
            region: region.to_geojson(),
            destination: Destination {
                bucket: &options.bucket,
                file_name_prefix: destination,
            },
            description,
            scale: options.scale,
            max_pixels: options.max_pixels,
            file_dimensions: options.file_dimensions,
        };

        let response = self
            .send(self.client.post(url).json(&body), "submit export")
            .await?;
        let submitted: SubmitResponse = decode(response, "submit export").await?;
        JobHandle::new(submitted.id).map_err(GeoExportError::UpstreamUnavailable)
    }

    async fn job_state(&self, job: &JobHandle) -> Result<JobState> {
        let url = self.endpoint(&format!("exports/{}", job.as_str()))?;
        let response = self.send(self.client.get(url), "job state").await?;
        let status: ActiveJob = decode(response, "job state").await?;
        Ok(status.state)
    }

    async fn list_active_jobs(&self) -> Result<Vec<ActiveJob>> {
        let mut jobs = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = self.endpoint("exports")?;
            url.query_pairs_mut().append_pair("active", "true");
            if let Some(token) = &page_token {
                url.query_pairs_mut().append_pair("page_token", token);
            }

            let response = self.send(self.client.get(url), "list jobs").await?;
            let page: JobListResponse = decode(response, "list jobs").await?;
            jobs.extend(page.jobs.into_iter().filter(|job| job.state.is_active()));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        tracing::debug!(count = jobs.len(), "Listed active imagery jobs");
        Ok(jobs)
    }

    async fn cancel_job(&self, job: &JobHandle) -> Result<()> {
        let url = self.endpoint(&format!("exports/{}:cancel", job.as_str()))?;
        self.send(self.client.post(url), "cancel job").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BearerToken;

    fn config(base_url: &str) -> ImageryConfig {
        ImageryConfig {
            base_url: base_url.to_string(),
            project: "crop-mask".to_string(),
            token: Some(BearerToken::new("test-token")),
            ..ImageryConfig::default()
        }
    }

    #[test]
    fn test_endpoint_urls() {
        let service = HttpImageryService::new(config("https://imagery.example.com/api/")).unwrap();
        assert_eq!(
            service.endpoint("exports").unwrap().as_str(),
            "https://imagery.example.com/api/v1/projects/crop-mask/exports"
        );
        assert_eq!(
            service.endpoint("exports/job-1:cancel").unwrap().as_str(),
            "https://imagery.example.com/api/v1/projects/crop-mask/exports/job-1:cancel"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            HttpImageryService::new(config("not a url")),
            Err(GeoExportError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_token_requires_authentication() {
        let mut cfg = config("https://imagery.example.com");
        cfg.token = None;
        let service = HttpImageryService::new(cfg).unwrap();
        assert!(matches!(
            service.authenticate().await,
            Err(GeoExportError::AuthenticationRequired(_))
        ));
    }
}
