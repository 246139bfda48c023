//! Thorough compositing: per-image cloud and shadow scoring

use super::{materialise, CompositeStrategy, Compositor};
use crate::adapters::imagery::{CompositeRecipe, ImageryService, SENTINEL2_COLLECTION};
use crate::domain::{MosaicHandle, Polygon, Result, TimeWindow};
use async_trait::async_trait;
use std::sync::Arc;

/// Cloud score (0-100) above which a pixel counts as cloudy
pub const CLOUD_SCORE_THRESHOLD: f64 = 20.0;

/// Summed NIR and SWIR reflectance below which a pixel may be cloud shadow
pub const SHADOW_IR_SUM_THRESHOLD: f64 = 0.35;

/// Cloud and shadow masks are grown by this many pixels
pub const DILATION_PIXELS: u32 = 2;

/// Scores every image for cloud and shadow and keeps the best pixel
///
/// Slower than [`super::FastCompositor`] but leaves fewer masking artifacts.
pub struct ThoroughCompositor {
    service: Arc<dyn ImageryService>,
}

impl ThoroughCompositor {
    pub fn new(service: Arc<dyn ImageryService>) -> Self {
        Self { service }
    }

    fn recipe(&self) -> CompositeRecipe {
        CompositeRecipe::QualityMosaic {
            collection: SENTINEL2_COLLECTION.to_string(),
            cloud_score_threshold: CLOUD_SCORE_THRESHOLD,
            shadow_ir_sum_threshold: SHADOW_IR_SUM_THRESHOLD,
            dilation_pixels: DILATION_PIXELS,
        }
    }
}

#[async_trait]
impl Compositor for ThoroughCompositor {
    async fn composite(&self, region: &Polygon, window: &TimeWindow) -> Result<MosaicHandle> {
        materialise(self.service.as_ref(), region, window, self.recipe()).await
    }

    fn strategy(&self) -> CompositeStrategy {
        CompositeStrategy::Thorough
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{region, window, RecordingService};
    use super::*;

    #[tokio::test]
    async fn test_thorough_recipe() {
        let service = Arc::new(RecordingService::new());
        let compositor = ThoroughCompositor::new(service.clone());

        compositor.composite(&region(), &window()).await.unwrap();

        let requests = service.requests.lock().unwrap();
        match &requests[0].recipe {
            CompositeRecipe::QualityMosaic {
                dilation_pixels, ..
            } => assert_eq!(*dilation_pixels, DILATION_PIXELS),
            other => panic!("unexpected recipe {other:?}"),
        }
    }
}
