//! Request types for the yard billing API.
//!
//! `/billing/calculate` takes a [`BillingForm`] as its body directly; the
//! other endpoints use the structures below.

use serde::{Deserialize, Serialize};

use crate::form::FormPatch;
use crate::models::BillingForm;
use crate::models::raw_input::{optional_raw_input, raw_input};

/// Request body for the `/billing/patch` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchRequest {
    /// The form as it currently stands.
    #[serde(default)]
    pub form: BillingForm,
    /// Edits to apply, in order.
    #[serde(default)]
    pub patches: Vec<FormPatch>,
}

/// Request body for the `/billing/reconcile` endpoint.
///
/// Amounts are raw input and are coerced the same way form fields are.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileRequest {
    /// The amount payments are measured against.
    #[serde(default, deserialize_with = "raw_input")]
    pub calculated_amount: String,
    /// Account payment including GST.
    #[serde(default, deserialize_with = "raw_input")]
    pub account_with_gst: String,
    /// Cash payment.
    #[serde(default, deserialize_with = "raw_input")]
    pub cash: String,
    /// GST percentage; the configured default applies when absent or empty.
    #[serde(
        default,
        deserialize_with = "optional_raw_input",
        skip_serializing_if = "Option::is_none"
    )]
    pub gst_rate: Option<String>,
}
