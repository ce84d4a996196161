//! Configuration types for yard billing.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::calculation::{GuardPolicy, ReconciliationBasis};

/// Metadata about the yard.
#[derive(Debug, Clone, Deserialize)]
pub struct YardMetadata {
    /// Short yard code printed on slips (e.g., "DHN-01").
    pub code: String,
    /// The human-readable name of the yard.
    pub name: String,
    /// Where the weighbridge is.
    pub location: String,
}

/// How the reducer treats derived values.
#[derive(Debug, Clone, Deserialize)]
pub struct RecalculationPolicy {
    /// What happens to half billing totals when the guard is not met.
    #[serde(default)]
    pub guard_policy: GuardPolicy,
    /// Whether material billing totals are written into the form.
    #[serde(default)]
    pub material_write_back: bool,
}

/// The amount each mode's payments are reconciled against.
#[derive(Debug, Clone, Deserialize)]
pub struct ReconciliationPolicy {
    /// Basis for half billing.
    pub half: ReconciliationBasis,
    /// Basis for weight billing.
    pub weight: ReconciliationBasis,
    /// Basis for material billing.
    pub different: ReconciliationBasis,
}

/// Policy configuration from policy.yaml.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyConfig {
    /// Recalculation behaviour.
    pub recalculation: RecalculationPolicy,
    /// Reconciliation bases per mode.
    pub reconciliation: ReconciliationPolicy,
}

/// Tax rates effective from a date.
#[derive(Debug, Clone, Deserialize)]
pub struct TaxRateConfig {
    /// The first day these rates apply.
    pub effective_date: NaiveDate,
    /// Default GST percentage for forms that leave it empty.
    pub gst_rate: Decimal,
    /// TCS as a fraction of the GST-inclusive total (0.01 = 1%).
    pub tcs_rate: Decimal,
}

/// Complete yard configuration combining all configuration files.
#[derive(Debug, Clone)]
pub struct YardConfig {
    /// Yard metadata.
    metadata: YardMetadata,
    /// Recalculation and reconciliation policy.
    policy: PolicyConfig,
    /// Tax rates, sorted by effective date.
    tax_rates: Vec<TaxRateConfig>,
}

impl YardConfig {
    /// Creates a new YardConfig from its component parts.
    pub fn new(metadata: YardMetadata, policy: PolicyConfig, tax_rates: Vec<TaxRateConfig>) -> Self {
        let mut sorted_rates = tax_rates;
        sorted_rates.sort_by(|a, b| a.effective_date.cmp(&b.effective_date));
        Self {
            metadata,
            policy,
            tax_rates: sorted_rates,
        }
    }

    /// Returns the yard metadata.
    pub fn yard(&self) -> &YardMetadata {
        &self.metadata
    }

    /// Returns the policy configuration.
    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    /// Returns all tax rate configurations, oldest first.
    pub fn tax_rates(&self) -> &[TaxRateConfig] {
        &self.tax_rates
    }
}
