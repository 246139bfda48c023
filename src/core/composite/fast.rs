//! Fast compositing: cloud-probability mask and median reduction

use super::{materialise, CompositeStrategy, Compositor};
use crate::adapters::imagery::{
    CompositeRecipe, ImageryService, CLOUD_PROBABILITY_COLLECTION, SENTINEL2_COLLECTION,
};
use crate::domain::{MosaicHandle, Polygon, Result, TimeWindow};
use async_trait::async_trait;
use std::sync::Arc;

/// Pixels with a cloud probability above this percentage are masked
pub const MAX_CLOUD_PROBABILITY: u8 = 65;

/// Masks cloudy pixels in every image of the window, then takes the median
///
/// Cheap enough for large region runs. Thin cloud edges can survive the mask.
pub struct FastCompositor {
    service: Arc<dyn ImageryService>,
    max_cloud_probability: u8,
}

impl FastCompositor {
    pub fn new(service: Arc<dyn ImageryService>) -> Self {
        Self {
            service,
            max_cloud_probability: MAX_CLOUD_PROBABILITY,
        }
    }

    /// Overrides the masking threshold (0-100)
    pub fn with_max_cloud_probability(mut self, max_cloud_probability: u8) -> Self {
        self.max_cloud_probability = max_cloud_probability.min(100);
        self
    }

    fn recipe(&self) -> CompositeRecipe {
        CompositeRecipe::MaskedMedian {
            collection: SENTINEL2_COLLECTION.to_string(),
            cloud_probability_collection: CLOUD_PROBABILITY_COLLECTION.to_string(),
            max_cloud_probability: self.max_cloud_probability,
        }
    }
}

#[async_trait]
impl Compositor for FastCompositor {
    async fn composite(&self, region: &Polygon, window: &TimeWindow) -> Result<MosaicHandle> {
        materialise(self.service.as_ref(), region, window, self.recipe()).await
    }

    fn strategy(&self) -> CompositeStrategy {
        CompositeStrategy::Fast
    }
}
