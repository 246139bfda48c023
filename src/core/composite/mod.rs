//! Cloud-free compositing
//!
//! A [`Compositor`] turns a region and one time window into a single
//! cloud-masked mosaic with the fixed [`BANDS`] set. Two strategies share the
//! same output contract:
//!
//! - **Fast**: cloud-probability mask followed by a median reduction
//! - **Thorough**: per-image cloud and shadow scoring, best pixel wins
//!
//! Per-window mosaics are stacked with [`combine`] into one image whose band
//! groups follow window order.

pub mod fast;
pub mod thorough;

use crate::adapters::imagery::{CompositeRecipe, CompositeRequest, ImageryService};
use crate::domain::{GeoExportError, ImageRef, MosaicHandle, Polygon, Result, TimeWindow};
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub use fast::FastCompositor;
pub use thorough::ThoroughCompositor;

/// Sentinel-2 bands kept in every mosaic, in output order
pub const BANDS: [&str; 13] = [
    "B1", "B2", "B3", "B4", "B5", "B6", "B7", "B8", "B8A", "B9", "B10", "B11", "B12",
];

/// Band names as owned strings, in output order
pub fn band_names() -> Vec<String> {
    BANDS.iter().map(|b| b.to_string()).collect()
}

/// Compositing strategy selected by configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompositeStrategy {
    /// Single masked median pass
    #[default]
    Fast,
    /// Iterative best-score mosaic
    Thorough,
}

impl FromStr for CompositeStrategy {
    type Err = GeoExportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "thorough" | "slow" => Ok(Self::Thorough),
            _ => Err(GeoExportError::Configuration(format!(
                "Invalid compositing strategy: {s}. Expected 'fast' or 'thorough'"
            ))),
        }
    }
}

impl fmt::Display for CompositeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompositeStrategy::Fast => f.write_str("fast"),
            CompositeStrategy::Thorough => f.write_str("thorough"),
        }
    }
}

/// Builds one cloud-free mosaic for a region and time window
#[async_trait]
pub trait Compositor: Send + Sync {
    /// Request a mosaic with the [`BANDS`] set
    ///
    /// # Errors
    ///
    /// Returns `UpstreamUnavailable` if the imagery service rejects the request
    /// or returns a mosaic with an unexpected band layout.
    async fn composite(&self, region: &Polygon, window: &TimeWindow) -> Result<MosaicHandle>;

    /// Strategy implemented by this compositor
    fn strategy(&self) -> CompositeStrategy;
}

/// Creates the compositor for `strategy`
///
/// # Example
///
/// ```no_run
/// use geoexport::adapters::imagery::HttpImageryService;
/// use geoexport::config::ImageryConfig;
/// use geoexport::core::composite::{build_compositor, CompositeStrategy};
/// use std::sync::Arc;
///
/// # fn example() -> geoexport::domain::Result<()> {
/// let service = Arc::new(HttpImageryService::new(ImageryConfig::default())?);
/// let compositor = build_compositor(CompositeStrategy::Thorough, service);
/// assert_eq!(compositor.strategy(), CompositeStrategy::Thorough);
/// # Ok(())
/// # }
/// ```
pub fn build_compositor(
    strategy: CompositeStrategy,
    service: Arc<dyn ImageryService>,
) -> Arc<dyn Compositor> {
    match strategy {
        CompositeStrategy::Fast => Arc::new(FastCompositor::new(service)),
        CompositeStrategy::Thorough => Arc::new(ThoroughCompositor::new(service)),
    }
}

/// Sends `recipe` to the imagery service and checks the returned band layout
async fn materialise(
    service: &dyn ImageryService,
    region: &Polygon,
    window: &TimeWindow,
    recipe: CompositeRecipe,
) -> Result<MosaicHandle> {
    let request = CompositeRequest {
        region: region.clone(),
        window: *window,
        recipe,
        bands: band_names(),
    };

    let mosaic = service.composite(&request).await?;

    if mosaic.bands != request.bands {
        return Err(GeoExportError::UpstreamUnavailable(format!(
            "composite for {window} returned bands {:?}, expected {:?}",
            mosaic.bands, request.bands
        )));
    }

    tracing::debug!(window = %window, "Mosaic materialised");
    Ok(mosaic)
}

/// Stacks per-window mosaics into one multi-band image
///
/// Band groups keep window order. The first group keeps its names; group `i`
/// (counting from 0) has `_i` appended to each band so names stay unique.
///
/// # Errors
///
/// Returns `InvalidParameter` if `mosaics` is empty.
pub fn combine(mosaics: Vec<MosaicHandle>) -> Result<MosaicHandle> {
    if mosaics.is_empty() {
        return Err(GeoExportError::InvalidParameter(
            "cannot combine an empty list of mosaics".to_string(),
        ));
    }

    let mut bands = Vec::with_capacity(mosaics.iter().map(MosaicHandle::band_count).sum());
    let mut images = Vec::with_capacity(mosaics.len());

    for (i, mosaic) in mosaics.into_iter().enumerate() {
        if i == 0 {
            bands.extend(mosaic.bands);
        } else {
            bands.extend(mosaic.bands.into_iter().map(|b| format!("{b}_{i}")));
        }
        images.push(mosaic.image);
    }

    Ok(MosaicHandle {
        image: ImageRef::Stack(images),
        bands,
    })
}
