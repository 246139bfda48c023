//! Domain models and types for geoexport.
//!
//! This module contains the value types shared by every layer: geometry,
//! dates, identifiers, remote job types, export requests and their outcomes.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Geometry** ([`BoundingBox`], [`Polygon`])
//! - **Time** ([`DateRange`], [`TimeWindow`])
//! - **Strongly-typed identifiers** ([`ExportIdentifier`], [`JobHandle`])
//! - **Export model** ([`ExportRequest`], [`ExportOutcome`], [`ScheduleInput`])
//! - **Error types** ([`GeoExportError`]) and the [`Result`] alias
//!
//! # Idempotency
//!
//! The identifier of an export is a pure function of its rounded bounding
//! box and its dates:
//!
//! ```rust
//! use geoexport::domain::{BoundingBox, DateRange, ExportRequest};
//! use chrono::NaiveDate;
//!
//! # fn example() -> geoexport::domain::Result<()> {
//! let bbox = BoundingBox::from_centre(0.0, 36.8, 80.0)?;
//! let dates = DateRange::new(
//!     NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2021, 12, 27).unwrap(),
//! )?;
//!
//! let first = ExportRequest::new(bbox, dates, "tifs");
//! let second = ExportRequest::new(bbox, dates, "tifs");
//! assert_eq!(first.identifier, second.identifier);
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod export;
pub mod geometry;
pub mod ids;
pub mod imagery;
pub mod result;
pub mod time;

// Re-export commonly used types for convenience
pub use errors::GeoExportError;
pub use export::{ExportOutcome, ExportRequest, ScheduleInput};
pub use geometry::{BoundingBox, Polygon};
pub use ids::{ExportIdentifier, JobHandle};
pub use imagery::{ActiveJob, ImageRef, JobState, MosaicHandle};
pub use result::Result;
pub use time::{DateRange, TimeWindow};
