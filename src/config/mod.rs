//! Configuration loading and management for yard billing.
//!
//! This module loads yard metadata, the recalculation policy and
//! effective-dated tax rates from YAML files.
//!
//! # Example
//!
//! ```no_run
//! use yard_billing::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/yard").unwrap();
//! println!("Loaded yard: {}", config.yard().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    PolicyConfig, ReconciliationPolicy, RecalculationPolicy, TaxRateConfig, YardConfig,
    YardMetadata,
};
