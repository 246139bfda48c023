//! Imagery service integration
//!
//! - [`ImageryService`] - trait implemented by every imagery backend
//! - [`HttpImageryService`] - REST implementation

pub mod http;
pub mod traits;

pub use http::HttpImageryService;
pub use traits::{
    CompositeRecipe, CompositeRequest, ExportOptions, ImageryService,
    CLOUD_PROBABILITY_COLLECTION, SENTINEL2_COLLECTION,
};
