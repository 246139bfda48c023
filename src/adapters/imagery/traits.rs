//! Imagery service trait definition
//!
//! This module defines the `ImageryService` trait that abstracts the remote
//! imagery-processing service. The core never talks to the service directly;
//! it builds composite requests and export submissions and hands them to an
//! implementation of this trait.

use crate::domain::{ActiveJob, JobHandle, JobState, MosaicHandle, Polygon, Result, TimeWindow};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Sentinel-2 top-of-atmosphere collection
pub const SENTINEL2_COLLECTION: &str = "COPERNICUS/S2";

/// Per-pixel cloud probability product matching [`SENTINEL2_COLLECTION`]
pub const CLOUD_PROBABILITY_COLLECTION: &str = "COPERNICUS/S2_CLOUD_PROBABILITY";

/// How the imagery service should reduce a collection into one image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum CompositeRecipe {
    /// Mask pixels whose cloud probability exceeds the threshold, then take
    /// the per-pixel median of what is left
    MaskedMedian {
        collection: String,
        cloud_probability_collection: String,
        max_cloud_probability: u8,
    },
    /// Score every image for cloud and shadow, then keep the best-scoring
    /// pixel across the collection
    QualityMosaic {
        collection: String,
        cloud_score_threshold: f64,
        shadow_ir_sum_threshold: f64,
        dilation_pixels: u32,
    },
}

/// One mosaic to materialise: a recipe applied over a region and time window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeRequest {
    /// Region the mosaic is clipped to
    pub region: Polygon,

    /// Imagery acquired within this window is reduced
    pub window: TimeWindow,

    /// Reduction applied to the collection
    pub recipe: CompositeRecipe,

    /// Bands to keep, in output order
    pub bands: Vec<String>,
}

/// Raster export parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportOptions {
    /// Destination bucket in durable storage
    pub bucket: String,

    /// Output resolution in metres per pixel
    pub scale: f64,

    /// Upper bound on the number of exported pixels
    pub max_pixels: f64,

    /// Optional tile size of the written files, in pixels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_dimensions: Option<u32>,
}

impl ExportOptions {
    /// Options writing to `bucket` with the default 10 m scale
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            scale: 10.0,
            max_pixels: 1e13,
            file_dimensions: None,
        }
    }
}

/// Trait for remote imagery services
///
/// Implementations must be shareable across tasks; every method takes `&self`.
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
///
/// for job in service.list_active_jobs().await? {
///     println!("{} {}", job.id, job.state);
/// }
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait ImageryService: Send + Sync {
    /// Verify that credentials are present and accepted
    ///
    /// # Errors
    ///
    /// Returns `AuthenticationRequired` if credentials are missing or rejected.
    async fn authenticate(&self) -> Result<()>;

    /// Materialise one mosaic
    ///
    /// # Errors
    ///
    /// Returns `UpstreamUnavailable` if the service rejects the request.
    async fn composite(&self, request: &CompositeRequest) -> Result<MosaicHandle>;

    /// Start an export job writing `image`, clipped to `region`, to
    /// `destination` (a path prefix without extension)
    async fn submit_export(
        &self,
        image: &MosaicHandle,
        region: &Polygon,
        destination: &str,
        description: &str,
        options: &ExportOptions,
    ) -> Result<JobHandle>;

    /// Current state of a job
    async fn job_state(&self, job: &JobHandle) -> Result<JobState>;

    /// Jobs that are queued or running
    async fn list_active_jobs(&self) -> Result<Vec<ActiveJob>>;

    /// Cancel a queued or running job
    async fn cancel_job(&self, job: &JobHandle) -> Result<()>;
}
