//! Application state for the yard billing API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use crate::calculation::RecalcOptions;
use crate::config::ConfigLoader;
use crate::error::BillingResult;

/// Shared application state.
///
/// Contains resources that are shared across all request handlers,
/// such as the loaded yard configuration.
#[derive(Clone)]
pub struct AppState {
    /// The loaded yard configuration.
    config: Arc<ConfigLoader>,
}

impl AppState {
    /// Creates a new application state with the given configuration loader.
    pub fn new(config: ConfigLoader) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Recalculation options for a bill date; today's rates when none is given.
    pub fn recalc_options(&self, bill_date: Option<NaiveDate>) -> BillingResult<RecalcOptions> {
        let date = bill_date.unwrap_or_else(|| Utc::now().date_naive());
        self.config.recalc_options(date)
    }
}
