//! Core scheduling logic for geoexport.
//!
//! # Modules
//!
//! - [`tiling`] - Bounding box grids and point buffers
//! - [`windows`] - Fixed-length time steps
//! - [`composite`] - Cloud-free mosaics (fast and thorough strategies)
//! - [`ledger`] - Existing outputs and pending jobs
//! - [`scheduler`] - Expansion, gating, submission and monitoring
//! - [`season`] - Growing-season date ranges
//! - [`regions`] - Named region extents
//!
//! # Example
//!
//! ```rust,no_run
//! use geoexport::adapters::imagery::{HttpImageryService, ImageryService};
//! use geoexport::adapters::storage::create_output_store;
//! use geoexport::config::load_config;
//! use geoexport::core::composite::{build_compositor, CompositeStrategy};
//! use geoexport::core::ledger::ExportLedger;
//! use geoexport::core::scheduler::{ExportScheduler, SchedulerConfig};
//! use std::str::FromStr;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("geoexport.toml")?;
//!
//! let imagery: Arc<dyn ImageryService> =
//!     Arc::new(HttpImageryService::new(config.imagery.clone())?);
//! let store = create_output_store(&config.storage)?;
//! let strategy = CompositeStrategy::from_str(&config.export.strategy)?;
//!
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//! let scheduler = ExportScheduler::new(
//!     SchedulerConfig::from_config(&config)?,
//!     imagery.clone(),
//!     build_compositor(strategy, imagery.clone()),
//!     Arc::new(ExportLedger::new(imagery, store)),
//!     shutdown_rx,
//! );
//!
//! let report = scheduler.plan_and_submit(&[]).await?;
//! println!("Submitted: {}", report.submitted());
//! # Ok(())
//! # }
//! ```

pub mod composite;
pub mod ledger;
pub mod regions;
pub mod scheduler;
pub mod season;
pub mod tiling;
pub mod windows;
