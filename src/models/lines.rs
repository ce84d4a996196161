//! Line items for weight and material billing.

use serde::{Deserialize, Serialize};

use super::Material;
use super::raw_input::{optional_raw_input, raw_input};

/// A loading line in weight billing, as entered by the operator.
///
/// # Example
///
/// ```
/// use yard_billing::models::WeightLine;
///
/// let line: WeightLine = serde_json::from_str(
///     r#"{"loading": "50", "billingRate": 40, "actualRate": "45"}"#,
/// ).unwrap();
/// assert_eq!(line.billing_rate, "40");
/// assert_eq!(line.gst_rate, None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightLine {
    /// Loaded weight in MT.
    #[serde(default, deserialize_with = "raw_input")]
    pub loading: String,
    /// Invoice rate per MT.
    #[serde(default, deserialize_with = "raw_input")]
    pub billing_rate: String,
    /// Transacted rate per MT.
    #[serde(default, deserialize_with = "raw_input")]
    pub actual_rate: String,
    /// Line GST percentage; the form rate applies when absent or empty.
    #[serde(
        default,
        deserialize_with = "optional_raw_input",
        skip_serializing_if = "Option::is_none"
    )]
    pub gst_rate: Option<String>,
}

impl WeightLine {
    /// Creates a line from raw inputs.
    pub fn new(
        loading: impl Into<String>,
        billing_rate: impl Into<String>,
        actual_rate: impl Into<String>,
    ) -> Self {
        Self {
            loading: loading.into(),
            billing_rate: billing_rate.into(),
            actual_rate: actual_rate.into(),
            gst_rate: None,
        }
    }

    /// Sets a per-line GST rate.
    pub fn with_gst_rate(mut self, gst_rate: impl Into<String>) -> Self {
        self.gst_rate = Some(gst_rate.into());
        self
    }
}

/// A material line in multi-material billing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialLine {
    /// The material loaded.
    #[serde(default)]
    pub name: Material,
    /// Quantity in MT.
    #[serde(default, deserialize_with = "raw_input")]
    pub quantity: String,
    /// Invoice rate per MT.
    #[serde(default, deserialize_with = "raw_input")]
    pub billing_rate: String,
    /// Transacted rate per MT.
    #[serde(default, deserialize_with = "raw_input")]
    pub actual_rate: String,
}

impl MaterialLine {
    /// Creates a line from raw inputs.
    pub fn new(
        name: Material,
        quantity: impl Into<String>,
        billing_rate: impl Into<String>,
        actual_rate: impl Into<String>,
    ) -> Self {
        Self {
            name,
            quantity: quantity.into(),
            billing_rate: billing_rate.into(),
            actual_rate: actual_rate.into(),
        }
    }
}
