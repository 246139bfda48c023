//! External system integrations for geoexport.
//!
//! This module provides adapters for integrating with external systems:
//!
//! - [`imagery`] - Remote imagery service (compositing, export jobs)
//! - [`storage`] - Durable output storage listing (Cloud Storage, local disk)
//! - [`labels`] - Label files driving point exports
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate external dependencies and
//! enable testing with in-memory implementations. The core only depends on the
//! [`imagery::ImageryService`] and [`storage::OutputStore`] traits.
//!
//! ```rust,no_run
//! use geoexport::adapters::imagery::HttpImageryService;
//! use geoexport::adapters::storage::create_output_store;
//! use geoexport::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("geoexport.toml")?;
//! let imagery = HttpImageryService::new(config.imagery.clone())?;
//! let store = create_output_store(&config.storage)?;
//! # Ok(())
//! # }
//! ```

pub mod imagery;
pub mod labels;
pub mod storage;
