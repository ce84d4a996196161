//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading yard
//! configuration from YAML files.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fs;
use std::path::Path;

use crate::calculation::RecalcOptions;
use crate::error::{BillingError, BillingResult};

use super::types::{PolicyConfig, TaxRateConfig, YardConfig, YardMetadata};

/// Loads and provides access to yard configuration.
///
/// The `ConfigLoader` reads YAML configuration files from a directory
/// and provides methods to query tax rates and recalculation policy.
///
/// # Directory Structure
///
/// The configuration directory should have the following structure:
/// ```text
/// config/yard/
/// ├── yard.yaml            # Yard metadata
/// ├── policy.yaml          # Guard policy, write-back, reconciliation bases
/// └── tax_rates/
///     └── 2017-07-01.yaml  # GST and TCS effective from this date
/// ```
///
/// # Example
///
/// ```no_run
/// use yard_billing::config::ConfigLoader;
/// use chrono::NaiveDate;
///
/// let loader = ConfigLoader::load("./config/yard").unwrap();
///
/// let date = NaiveDate::from_ymd_opt(2024, 8, 1).unwrap();
/// let rates = loader.get_tax_rates(date).unwrap();
/// println!("GST {}%, TCS {}", rates.gst_rate, rates.tcs_rate);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: YardConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration directory (e.g., "./config/yard")
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing
    /// - Any file contains invalid YAML
    /// - A tax rate is negative, or GST exceeds 100%, or TCS exceeds 100%
    ///
    /// # Example
    ///
    /// ```no_run
    /// use yard_billing::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::load("./config/yard")?;
    /// # Ok::<(), yard_billing::error::BillingError>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> BillingResult<Self> {
        let path = path.as_ref();

        let metadata = Self::load_yaml::<YardMetadata>(&path.join("yard.yaml"))?;
        let policy = Self::load_yaml::<PolicyConfig>(&path.join("policy.yaml"))?;
        let tax_rates = Self::load_tax_rates(&path.join("tax_rates"))?;

        Ok(Self {
            config: YardConfig::new(metadata, policy, tax_rates),
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> BillingResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| BillingError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| BillingError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads and validates all tax rate files from the tax_rates directory.
    fn load_tax_rates(rates_dir: &Path) -> BillingResult<Vec<TaxRateConfig>> {
        let rates_dir_str = rates_dir.display().to_string();

        let entries = fs::read_dir(rates_dir).map_err(|_| BillingError::ConfigNotFound {
            path: rates_dir_str.clone(),
        })?;

        let mut rates = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|_| BillingError::ConfigNotFound {
                path: rates_dir_str.clone(),
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                let rate_config = Self::load_yaml::<TaxRateConfig>(&path)?;
                Self::validate_tax_rates(&rate_config)?;
                rates.push(rate_config);
            }
        }

        if rates.is_empty() {
            return Err(BillingError::ConfigNotFound {
                path: format!("{} (no tax rate files found)", rates_dir_str),
            });
        }

        Ok(rates)
    }

    fn validate_tax_rates(rates: &TaxRateConfig) -> BillingResult<()> {
        if rates.gst_rate < Decimal::ZERO || rates.gst_rate > Decimal::ONE_HUNDRED {
            return Err(BillingError::InvalidConfig {
                field: format!("tax_rates/{}.gst_rate", rates.effective_date),
                message: format!("{} is not between 0 and 100", rates.gst_rate),
            });
        }
        if rates.tcs_rate < Decimal::ZERO || rates.tcs_rate > Decimal::ONE {
            return Err(BillingError::InvalidConfig {
                field: format!("tax_rates/{}.tcs_rate", rates.effective_date),
                message: format!("{} is not a fraction between 0 and 1", rates.tcs_rate),
            });
        }
        Ok(())
    }

    /// Returns the underlying yard configuration.
    pub fn config(&self) -> &YardConfig {
        &self.config
    }

    /// Returns the yard metadata.
    pub fn yard(&self) -> &YardMetadata {
        self.config.yard()
    }

    /// Returns the recalculation and reconciliation policy.
    pub fn policy(&self) -> &PolicyConfig {
        self.config.policy()
    }

    /// Gets the tax rates effective on a date.
    ///
    /// The most recent rate file effective on or before the date is used.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use yard_billing::config::ConfigLoader;
    /// use chrono::NaiveDate;
    ///
    /// let loader = ConfigLoader::load("./config/yard")?;
    /// let date = NaiveDate::from_ymd_opt(2024, 8, 1).unwrap();
    /// let rates = loader.get_tax_rates(date)?;
    /// println!("GST: {}%", rates.gst_rate);
    /// # Ok::<(), yard_billing::error::BillingError>(())
    /// ```
    pub fn get_tax_rates(&self, date: NaiveDate) -> BillingResult<&TaxRateConfig> {
        self.config
            .tax_rates()
            .iter()
            .rev()
            .find(|rc| rc.effective_date <= date)
            .ok_or(BillingError::TaxRatesNotFound { date })
    }

    /// Builds the recalculation options for a bill date.
    pub fn recalc_options(&self, date: NaiveDate) -> BillingResult<RecalcOptions> {
        let rates = self.get_tax_rates(date)?;
        let policy = self.policy();

        Ok(RecalcOptions {
            default_gst_rate: rates.gst_rate,
            tcs_rate: rates.tcs_rate,
            guard_policy: policy.recalculation.guard_policy,
            material_write_back: policy.recalculation.material_write_back,
            half_basis: policy.reconciliation.half,
            weight_basis: policy.reconciliation.weight,
            different_basis: policy.reconciliation.different,
        })
    }
}
