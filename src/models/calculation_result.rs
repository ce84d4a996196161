//! Calculation result models for the yard billing engine.
//!
//! This module contains the [`CalculationResult`] returned for a recalculated
//! form, the formatted per-mode [`ModeDisplay`], and the audit trace types
//! that record every formula applied and every input that had to be coerced.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{BillingForm, BillingMethod, BillingMode};
use crate::calculation::BalanceStatus;
use crate::formatting::display_amount;

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a formula.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings never stop a calculation. They flag inputs that were silently
/// replaced (a typo'd rate that became zero, an out-of-range GST rate).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

/// The complete audit trace for a calculation.
///
/// # Example
///
/// ```
/// use yard_billing::models::AuditTrace;
///
/// let trace = AuditTrace {
///     steps: vec![],
///     warnings: vec![],
///     duration_us: 1234,
/// };
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
    /// The total calculation duration in microseconds.
    pub duration_us: u64,
}

/// Display strings for one active billing mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeDisplay {
    /// The billing mode.
    pub mode: BillingMode,
    /// Human-readable mode name.
    pub label: String,
    /// GST-inclusive total, e.g. `₹5,900.00`, or `—`.
    pub billing_total_amount: String,
    /// Cash settlement, or `—`.
    pub cash_amount: String,
    /// GST plus TCS, or `—`.
    pub tax: String,
    /// Balance classification, e.g. `Remaining to Pay: ₹300.00`.
    pub balance: String,
}

impl ModeDisplay {
    /// Formats the derived fields of a method for display.
    ///
    /// # Example
    ///
    /// ```
    /// use yard_billing::models::{BillingMethod, BillingMode, ModeDisplay};
    ///
    /// let display = ModeDisplay::from_method(&BillingMethod::new_default(BillingMode::Weight));
    /// assert_eq!(display.label, "Weight Billing");
    /// assert_eq!(display.billing_total_amount, "—");
    /// assert_eq!(display.balance, "—");
    /// ```
    pub fn from_method(method: &BillingMethod) -> Self {
        let mode = method.mode();
        let totals = method.totals();

        Self {
            mode,
            label: mode.label().to_string(),
            billing_total_amount: display_amount(totals.billing_total_amount),
            cash_amount: display_amount(totals.cash_amount),
            tax: display_amount(totals.tax),
            balance: BalanceStatus::classify(method.balance().remaining).to_string(),
        }
    }
}

/// The complete result of recalculating a billing form.
///
/// `form` carries every derived field written back into its mode details;
/// `displays` holds the same values formatted for the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// Unique identifier for this calculation.
    pub calculation_id: Uuid,
    /// When the calculation was performed.
    pub timestamp: DateTime<Utc>,
    /// The version of the engine that performed the calculation.
    pub engine_version: String,
    /// The recalculated form.
    pub form: BillingForm,
    /// Formatted totals per active mode, in activation order.
    pub displays: Vec<ModeDisplay>,
    /// Complete audit trace of calculation decisions.
    pub audit_trace: AuditTrace,
}
