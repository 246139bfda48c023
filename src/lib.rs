// geoexport - Satellite Imagery Export Scheduler
// Copyright (c) 2025 geoexport Contributors
// Licensed under the MIT License

//! # geoexport - Satellite Imagery Export Scheduler
//!
//! geoexport schedules bulk cloud-free Sentinel-2 exports on a remote imagery
//! service and makes sure the same export is never submitted twice.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Tiling** large regions into polygons of a target edge length
//! - **Windowing** date ranges into fixed-length time steps
//! - **Compositing** one cloud-free mosaic per time step (fast or thorough)
//! - **Deduplicating** against outputs in storage and jobs already queued
//! - **Submitting** and optionally monitoring the remaining export jobs
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Tiling, windowing, compositing, ledger and scheduler
//! - [`adapters`] - Imagery service, output storage and label files
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Idempotency
//!
//! Every export is keyed by an identifier derived from its bounding box,
//! rounded to four decimals, and its dates:
//!
//! ```rust
//! use geoexport::domain::{BoundingBox, DateRange, ExportRequest};
//! use chrono::NaiveDate;
//!
//! # fn example() -> geoexport::domain::Result<()> {
//! let dates = DateRange::new(
//!     NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2021, 12, 27).unwrap(),
//! )?;
//! let request = ExportRequest::new(BoundingBox::new(0.0, 0.1, 36.0, 36.1)?, dates, "tifs");
//!
//! assert_eq!(
//!     request.output_path(),
//!     "tifs/min_lat=0.0_min_lon=36.0_max_lat=0.1_max_lon=36.1_dates=2021-01-01_2021-12-27.tif"
//! );
//! # Ok(())
//! # }
//! ```
//!
//! A scheduling pass skips a request when that path already exists in
//! storage or a job with the matching description is queued or running, so
//! re-running a command only submits what is missing.
//!
//! ## Tiling
//!
//! ```rust
//! use geoexport::core::tiling::{tile_with, GridRounding};
//! use geoexport::domain::BoundingBox;
//!
//! # fn example() -> geoexport::domain::Result<()> {
//! let region = BoundingBox::new(0.0, 1.0, 0.0, 1.0)?;
//! let tiles = tile_with(&region, 10_000.0, GridRounding::Truncate)?;
//! assert_eq!(tiles.len(), 121);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! geoexport uses the [`domain::GeoExportError`] type for all errors. Invalid
//! inputs reject a single request, missing credentials abort a pass and
//! rejected submissions are recorded as failed outcomes.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
