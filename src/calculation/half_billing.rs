//! Half billing calculation.
//!
//! Half billing invoices the vehicle's whole net weight at the billing rate
//! and settles the difference to the actual rate in cash.

use rust_decimal::Decimal;

use super::line_tax::{LineTax, calculate_line_tax, tcs_amount};
use crate::models::{AuditStep, BillingTotals};

/// Numeric inputs to half billing, already coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalfBillingInput {
    /// Net weight of the vehicle in MT.
    pub net_weight: Decimal,
    /// Invoice rate per MT.
    pub billing_rate: Decimal,
    /// Transacted rate per MT.
    pub actual_rate: Decimal,
    /// GST percentage.
    pub gst_rate: Decimal,
    /// TCS fraction of the GST-inclusive total.
    pub tcs_rate: Decimal,
}

/// The full, unrounded half billing breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalfBillingBreakdown {
    /// Base, GST and cash for the net weight.
    pub line: LineTax,
    /// TCS on the GST-inclusive total.
    pub tcs_amount: Decimal,
    /// GST plus TCS.
    pub total_tax: Decimal,
}

impl HalfBillingBreakdown {
    /// Returns the rounded totals written back into the form.
    pub fn totals(&self) -> BillingTotals {
        BillingTotals::from_amounts(self.line.cash_amount, self.line.with_gst, self.total_tax)
    }
}

/// The result of half billing, including the breakdown and audit step.
#[derive(Debug, Clone)]
pub struct HalfBillingResult {
    /// The breakdown, or `None` when the weight or billing rate is not positive.
    pub breakdown: Option<HalfBillingBreakdown>,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates half billing for a net weight.
///
/// Nothing is computed unless both the net weight and the billing rate are
/// greater than zero. What happens to a previously written result in that
/// case is decided by the caller's guard policy.
///
/// # Examples
///
/// ```
/// use yard_billing::calculation::{HalfBillingInput, calculate_half_billing};
/// use rust_decimal::Decimal;
///
/// let input = HalfBillingInput {
///     net_weight: Decimal::from(100),
///     billing_rate: Decimal::from(50),
///     actual_rate: Decimal::from(55),
///     gst_rate: Decimal::from(18),
///     tcs_rate: Decimal::new(1, 2),
/// };
///
/// let result = calculate_half_billing(&input, 1);
/// let totals = result.breakdown.unwrap().totals();
/// assert_eq!(totals.billing_total_amount.unwrap().to_string(), "5900.00");
/// assert_eq!(totals.cash_amount.unwrap().to_string(), "500.00");
/// assert_eq!(totals.tax.unwrap().to_string(), "959.00");
/// ```
pub fn calculate_half_billing(input: &HalfBillingInput, step_number: u32) -> HalfBillingResult {
    let audit_input = serde_json::json!({
        "net_weight": input.net_weight.normalize().to_string(),
        "billing_rate": input.billing_rate.normalize().to_string(),
        "actual_rate": input.actual_rate.normalize().to_string(),
        "gst_rate": input.gst_rate.normalize().to_string(),
        "tcs_rate": input.tcs_rate.normalize().to_string()
    });

    if input.net_weight <= Decimal::ZERO || input.billing_rate <= Decimal::ZERO {
        let audit_step = AuditStep {
            step_number,
            rule_id: "half_billing".to_string(),
            rule_name: "Half Billing".to_string(),
            input: audit_input,
            output: serde_json::json!({
                "calculated": false
            }),
            reasoning: "Net weight and billing rate must both be greater than zero - not calculated"
                .to_string(),
        };

        return HalfBillingResult {
            breakdown: None,
            audit_step,
        };
    }

    let line = calculate_line_tax(
        input.net_weight,
        input.billing_rate,
        input.actual_rate,
        input.gst_rate,
    );
    let tcs = tcs_amount(line.with_gst, input.tcs_rate);
    let breakdown = HalfBillingBreakdown {
        line,
        tcs_amount: tcs,
        total_tax: line.gst_amount + tcs,
    };
    let totals = breakdown.totals();

    let audit_step = AuditStep {
        step_number,
        rule_id: "half_billing".to_string(),
        rule_name: "Half Billing".to_string(),
        input: audit_input,
        output: serde_json::json!({
            "calculated": true,
            "base": line.base.normalize().to_string(),
            "gst_amount": line.gst_amount.normalize().to_string(),
            "tcs_amount": tcs.normalize().to_string(),
            "billing_total_amount": totals.billing_total_amount.map(|d| d.to_string()),
            "cash_amount": totals.cash_amount.map(|d| d.to_string()),
            "tax": totals.tax.map(|d| d.to_string())
        }),
        reasoning: format!(
            "{} MT × ₹{} = ₹{} + {}% GST = ₹{}; cash {} MT × (₹{} − ₹{}) = ₹{}",
            input.net_weight.normalize(),
            input.billing_rate.normalize(),
            line.base.normalize(),
            input.gst_rate.normalize(),
            line.with_gst.normalize(),
            input.net_weight.normalize(),
            input.actual_rate.normalize(),
            input.billing_rate.normalize(),
            line.cash_amount.normalize()
        ),
    };

    HalfBillingResult {
        breakdown: Some(breakdown),
        audit_step,
    }
}
