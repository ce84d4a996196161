//! The billing form record and its per-mode details.
//!
//! On the wire a form lists its active modes in `billingMethods` and carries
//! one detail object per active mode (`halfBilling`, `weightBilling`,
//! `differentBilling`). In memory the details are held as [`BillingMethod`]
//! variants, so a mode is active exactly when its details exist. The wire
//! record is validated when converted.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::raw_input::raw_input;
use super::{BalanceSummary, BillingMode, BillingTotals, Material, MaterialLine, WeightLine};
use crate::error::{BillingError, BillingResult};

/// Half billing details: one aggregate weight billed at a single rate.
///
/// The weight comes from the form's `netWeight`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HalfBilling {
    /// Invoice rate per MT.
    #[serde(default, deserialize_with = "raw_input")]
    pub billing_rate: String,
    /// Transacted rate per MT.
    #[serde(default, deserialize_with = "raw_input")]
    pub actual_rate: String,
    /// Amount paid to account, GST included.
    #[serde(default, deserialize_with = "raw_input")]
    pub account_with_gst: String,
    /// Amount paid in cash.
    #[serde(default, deserialize_with = "raw_input")]
    pub cash: String,
    /// Derived invoice totals.
    #[serde(flatten)]
    pub totals: BillingTotals,
    /// Derived payment balance.
    #[serde(flatten)]
    pub balance: BalanceSummary,
}

/// Weight billing details: several loading lines on one invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightBilling {
    /// Loading lines, in entry order.
    #[serde(default = "default_weight_lines")]
    pub lines: Vec<WeightLine>,
    /// Amount paid to account, GST included.
    #[serde(default, deserialize_with = "raw_input")]
    pub account_with_gst: String,
    /// Amount paid in cash.
    #[serde(default, deserialize_with = "raw_input")]
    pub cash: String,
    /// Derived invoice totals.
    #[serde(flatten)]
    pub totals: BillingTotals,
    /// Derived payment balance.
    #[serde(flatten)]
    pub balance: BalanceSummary,
}

impl Default for WeightBilling {
    fn default() -> Self {
        Self {
            lines: default_weight_lines(),
            account_with_gst: String::new(),
            cash: String::new(),
            totals: BillingTotals::default(),
            balance: BalanceSummary::default(),
        }
    }
}

fn default_weight_lines() -> Vec<WeightLine> {
    vec![WeightLine::default()]
}

/// Multi-material billing details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialBilling {
    /// Material lines, in entry order.
    #[serde(default = "default_material_lines")]
    pub lines: Vec<MaterialLine>,
    /// Amount paid to account, GST included.
    #[serde(default, deserialize_with = "raw_input")]
    pub account_with_gst: String,
    /// Amount paid in cash.
    #[serde(default, deserialize_with = "raw_input")]
    pub cash: String,
    /// Derived invoice totals; only written when material write-back is on.
    #[serde(flatten)]
    pub totals: BillingTotals,
    /// Derived payment balance.
    #[serde(flatten)]
    pub balance: BalanceSummary,
}

impl Default for MaterialBilling {
    fn default() -> Self {
        Self {
            lines: default_material_lines(),
            account_with_gst: String::new(),
            cash: String::new(),
            totals: BillingTotals::default(),
            balance: BalanceSummary::default(),
        }
    }
}

fn default_material_lines() -> Vec<MaterialLine> {
    vec![MaterialLine {
        name: Material::ERom,
        ..MaterialLine::default()
    }]
}

/// The details of one active billing mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillingMethod {
    /// Half billing.
    Half(HalfBilling),
    /// Weight-line billing.
    Weight(WeightBilling),
    /// Material-line billing.
    Different(MaterialBilling),
}

impl BillingMethod {
    /// Creates the default details a freshly activated mode starts with.
    pub fn new_default(mode: BillingMode) -> Self {
        match mode {
            BillingMode::Half => BillingMethod::Half(HalfBilling::default()),
            BillingMode::Weight => BillingMethod::Weight(WeightBilling::default()),
            BillingMode::Different => BillingMethod::Different(MaterialBilling::default()),
        }
    }

    /// Returns the tag of this method.
    pub fn mode(&self) -> BillingMode {
        match self {
            BillingMethod::Half(_) => BillingMode::Half,
            BillingMethod::Weight(_) => BillingMode::Weight,
            BillingMethod::Different(_) => BillingMode::Different,
        }
    }

    /// Returns the derived invoice totals.
    pub fn totals(&self) -> &BillingTotals {
        match self {
            BillingMethod::Half(half) => &half.totals,
            BillingMethod::Weight(weight) => &weight.totals,
            BillingMethod::Different(different) => &different.totals,
        }
    }

    /// Returns the derived payment balance.
    pub fn balance(&self) -> &BalanceSummary {
        match self {
            BillingMethod::Half(half) => &half.balance,
            BillingMethod::Weight(weight) => &weight.balance,
            BillingMethod::Different(different) => &different.balance,
        }
    }

    /// Returns the number of line items, or `None` for half billing.
    pub fn line_count(&self) -> Option<usize> {
        match self {
            BillingMethod::Half(_) => None,
            BillingMethod::Weight(weight) => Some(weight.lines.len()),
            BillingMethod::Different(different) => Some(different.lines.len()),
        }
    }

    fn validate(&self) -> BillingResult<()> {
        if self.line_count() == Some(0) {
            return Err(BillingError::InconsistentMethod {
                mode: self.mode().to_string(),
                message: "at least one line is required".to_string(),
            });
        }
        Ok(())
    }
}

/// A vehicle's billing form.
///
/// Raw inputs are kept as typed; derived fields live inside each method's
/// details and are refreshed by [`crate::calculation::recalculate`].
///
/// # Example
///
/// ```
/// use yard_billing::models::{BillingForm, BillingMode};
///
/// let form: BillingForm = serde_json::from_str(r#"{
///     "netWeight": "100",
///     "billingMethods": ["half"],
///     "halfBilling": {"billingRate": "50", "actualRate": "55"}
/// }"#).unwrap();
///
/// assert_eq!(form.billing_methods(), vec![BillingMode::Half]);
/// assert_eq!(form.half().unwrap().billing_rate, "50");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FormRecord", into = "FormRecord")]
pub struct BillingForm {
    /// Loaded vehicle weight in MT.
    pub gross_weight: String,
    /// Empty vehicle weight in MT.
    pub tare_weight: String,
    /// Billable weight in MT; the basis for half billing.
    pub net_weight: String,
    /// Form GST percentage; empty means the configured default.
    pub gst_rate: String,
    /// Date used to select effective tax rates.
    pub bill_date: Option<NaiveDate>,
    methods: Vec<BillingMethod>,
}

impl BillingForm {
    /// Creates an empty form with no active billing methods.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the active mode tags in activation order.
    pub fn billing_methods(&self) -> Vec<BillingMode> {
        self.methods.iter().map(BillingMethod::mode).collect()
    }

    /// Returns the details of all active modes.
    pub fn methods(&self) -> &[BillingMethod] {
        &self.methods
    }

    /// Returns true if the mode is active.
    pub fn is_active(&self, mode: BillingMode) -> bool {
        self.method(mode).is_some()
    }

    /// Returns the details of a mode if it is active.
    pub fn method(&self, mode: BillingMode) -> Option<&BillingMethod> {
        self.methods.iter().find(|m| m.mode() == mode)
    }

    /// Returns the half billing details if active.
    pub fn half(&self) -> Option<&HalfBilling> {
        match self.method(BillingMode::Half) {
            Some(BillingMethod::Half(half)) => Some(half),
            _ => None,
        }
    }

    /// Returns the weight billing details if active.
    pub fn weight(&self) -> Option<&WeightBilling> {
        match self.method(BillingMode::Weight) {
            Some(BillingMethod::Weight(weight)) => Some(weight),
            _ => None,
        }
    }

    /// Returns the material billing details if active.
    pub fn different(&self) -> Option<&MaterialBilling> {
        match self.method(BillingMode::Different) {
            Some(BillingMethod::Different(different)) => Some(different),
            _ => None,
        }
    }

    pub(crate) fn method_mut(&mut self, mode: BillingMode) -> Option<&mut BillingMethod> {
        self.methods.iter_mut().find(|m| m.mode() == mode)
    }

    pub(crate) fn methods_mut(&mut self) -> impl Iterator<Item = &mut BillingMethod> {
        self.methods.iter_mut()
    }

    /// Appends a method; the caller guarantees its mode is not yet active.
    pub(crate) fn push_method(&mut self, method: BillingMethod) {
        debug_assert!(!self.is_active(method.mode()));
        self.methods.push(method);
    }

    pub(crate) fn take_method(&mut self, mode: BillingMode) -> Option<BillingMethod> {
        let index = self.methods.iter().position(|m| m.mode() == mode)?;
        Some(self.methods.remove(index))
    }
}

/// The wire shape of a [`BillingForm`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormRecord {
    /// Loaded vehicle weight.
    #[serde(default, deserialize_with = "raw_input")]
    pub gross_weight: String,
    /// Empty vehicle weight.
    #[serde(default, deserialize_with = "raw_input")]
    pub tare_weight: String,
    /// Billable weight.
    #[serde(default, deserialize_with = "raw_input")]
    pub net_weight: String,
    /// Form GST percentage.
    #[serde(default, deserialize_with = "raw_input")]
    pub gst_rate: String,
    /// Bill date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bill_date: Option<NaiveDate>,
    /// Active mode tags.
    #[serde(default)]
    pub billing_methods: Vec<String>,
    /// Half billing details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub half_billing: Option<HalfBilling>,
    /// Weight billing details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_billing: Option<WeightBilling>,
    /// Material billing details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub different_billing: Option<MaterialBilling>,
}

impl TryFrom<FormRecord> for BillingForm {
    type Error = BillingError;

    fn try_from(record: FormRecord) -> BillingResult<Self> {
        let mut half = record.half_billing;
        let mut weight = record.weight_billing;
        let mut different = record.different_billing;
        let mut methods: Vec<BillingMethod> = Vec::with_capacity(record.billing_methods.len());

        for tag in &record.billing_methods {
            let mode: BillingMode = tag.parse()?;
            if methods.iter().any(|m| m.mode() == mode) {
                return Err(BillingError::InconsistentMethod {
                    mode: mode.to_string(),
                    message: "listed more than once".to_string(),
                });
            }

            let method = match mode {
                BillingMode::Half => half.take().map(BillingMethod::Half),
                BillingMode::Weight => weight.take().map(BillingMethod::Weight),
                BillingMode::Different => different.take().map(BillingMethod::Different),
            }
            .ok_or_else(|| BillingError::InconsistentMethod {
                mode: mode.to_string(),
                message: "active but its details are missing".to_string(),
            })?;

            method.validate()?;
            methods.push(method);
        }

        let orphans = [
            (BillingMode::Half, half.is_some()),
            (BillingMode::Weight, weight.is_some()),
            (BillingMode::Different, different.is_some()),
        ];
        if let Some((mode, _)) = orphans.into_iter().find(|(_, present)| *present) {
            return Err(BillingError::InconsistentMethod {
                mode: mode.to_string(),
                message: "details present but the method is not active".to_string(),
            });
        }

        Ok(BillingForm {
            gross_weight: record.gross_weight,
            tare_weight: record.tare_weight,
            net_weight: record.net_weight,
            gst_rate: record.gst_rate,
            bill_date: record.bill_date,
            methods,
        })
    }
}

impl From<BillingForm> for FormRecord {
    fn from(form: BillingForm) -> Self {
        let mut record = FormRecord {
            gross_weight: form.gross_weight,
            tare_weight: form.tare_weight,
            net_weight: form.net_weight,
            gst_rate: form.gst_rate,
            bill_date: form.bill_date,
            ..FormRecord::default()
        };

        for method in form.methods {
            record.billing_methods.push(method.mode().to_string());
            match method {
                BillingMethod::Half(half) => record.half_billing = Some(half),
                BillingMethod::Weight(weight) => record.weight_billing = Some(weight),
                BillingMethod::Different(different) => record.different_billing = Some(different),
            }
        }

        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn parse(json: &str) -> Result<BillingForm, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[test]
    fn test_deserialize_form_with_all_modes() {
        let form = parse(
            r#"{
                "netWeight": "100",
                "gstRate": "18",
                "billingMethods": ["weight", "half", "different"],
                "halfBilling": {"billingRate": "50", "actualRate": "55"},
                "weightBilling": {"lines": [{"loading": "50", "billingRate": "40", "actualRate": "45"}]},
                "differentBilling": {"lines": [{"name": "F-STEAM", "quantity": "10"}]}
            }"#,
        )
        .unwrap();

        assert_eq!(
            form.billing_methods(),
            vec![BillingMode::Weight, BillingMode::Half, BillingMode::Different]
        );
        assert_eq!(form.weight().unwrap().lines[0].loading, "50");
        assert_eq!(form.different().unwrap().lines[0].name, Material::FSteam);
    }

    #[test]
    fn test_tag_without_details_is_rejected() {
        let err = parse(r#"{"billingMethods": ["half"]}"#).unwrap_err();
        assert!(err.to_string().contains("details are missing"), "{}", err);
    }

    #[test]
    fn test_details_without_tag_are_rejected() {
        let err = parse(r#"{"billingMethods": [], "weightBilling": {}}"#).unwrap_err();
        assert!(err.to_string().contains("not active"), "{}", err);
    }

    #[test]
    fn test_duplicate_tag_is_rejected() {
        let err = parse(r#"{"billingMethods": ["half", "half"], "halfBilling": {}}"#).unwrap_err();
        assert!(err.to_string().contains("more than once"), "{}", err);
    }

    #[test]
    fn test_unknown_tag_is_rejected() {
        let err = parse(r#"{"billingMethods": ["quarter"]}"#).unwrap_err();
        assert!(err.to_string().contains("Unknown billing method"), "{}", err);
    }

    #[test]
    fn test_empty_line_list_is_rejected() {
        let err = parse(r#"{"billingMethods": ["weight"], "weightBilling": {"lines": []}}"#)
            .unwrap_err();
        assert!(err.to_string().contains("at least one line"), "{}", err);
    }

    #[test]
    fn test_missing_lines_default_to_one_blank_line() {
        let form = parse(r#"{"billingMethods": ["weight"], "weightBilling": {}}"#).unwrap();
        assert_eq!(form.weight().unwrap().lines, vec![WeightLine::default()]);
    }

    #[test]
    fn test_serialize_omits_inactive_modes() {
        let mut form = BillingForm::new();
        form.push_method(BillingMethod::new_default(BillingMode::Half));

        let json = serde_json::to_value(&form).unwrap();
        assert_eq!(json["billingMethods"], serde_json::json!(["half"]));
        assert!(json.get("halfBilling").is_some());
        assert!(json.get("weightBilling").is_none());
        assert!(json.get("differentBilling").is_none());
    }

    #[test]
    fn test_derived_fields_are_flattened_into_details() {
        let mut form = BillingForm::new();
        let mut half = HalfBilling::default();
        half.totals = BillingTotals::from_amounts(
            Decimal::from(500),
            Decimal::from(5900),
            Decimal::from(959),
        );
        form.push_method(BillingMethod::Half(half));

        let json = serde_json::to_value(&form).unwrap();
        assert_eq!(json["halfBilling"]["billingTotalAmount"], "5900.00");
        assert_eq!(json["halfBilling"]["cashAmount"], "500.00");
        assert_eq!(json["halfBilling"]["tax"], "959.00");

        let back: BillingForm = serde_json::from_value(json).unwrap();
        assert_eq!(back, form);
    }

    #[test]
    fn test_take_method_removes_details_and_tag() {
        let mut form = BillingForm::new();
        form.push_method(BillingMethod::new_default(BillingMode::Weight));
        form.push_method(BillingMethod::new_default(BillingMode::Different));

        let taken = form.take_method(BillingMode::Weight);
        assert!(matches!(taken, Some(BillingMethod::Weight(_))));
        assert_eq!(form.billing_methods(), vec![BillingMode::Different]);
        assert!(form.take_method(BillingMode::Weight).is_none());
    }
}
