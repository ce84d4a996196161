//! Weight-line billing calculation.
//!
//! A vehicle loaded in several lots is billed as one invoice: each loading
//! line has its own rates and optionally its own GST percentage.

use rust_decimal::Decimal;

use super::aggregate::{AggregateBreakdown, LineFigures, aggregate_lines};
use crate::models::AuditStep;

/// The result of weight billing, including the breakdown and audit step.
#[derive(Debug, Clone)]
pub struct WeightBillingResult {
    /// Per-line and aggregate figures; `None` if the totals overflowed.
    pub breakdown: Option<AggregateBreakdown>,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Aggregates loading lines into one invoice.
///
/// Lines whose loading is zero or less are skipped. Each line's
/// `gst_rate` is expected to already hold either the line's own rate or the
/// form rate.
///
/// # Examples
///
/// ```
/// use yard_billing::calculation::{DEFAULT_TCS_RATE, LineFigures, calculate_weight_billing};
/// use rust_decimal::Decimal;
///
/// let line = |loading: i64, billing: i64, actual: i64| LineFigures {
///     quantity: Decimal::from(loading),
///     billing_rate: Decimal::from(billing),
///     actual_rate: Decimal::from(actual),
///     gst_rate: Decimal::from(18),
/// };
///
/// let result = calculate_weight_billing(
///     &[line(50, 40, 45), line(0, 999, 999), line(30, 40, 42)],
///     DEFAULT_TCS_RATE,
///     1,
/// );
///
/// let totals = result.breakdown.unwrap().totals();
/// assert_eq!(totals.billing_total_amount.unwrap().to_string(), "3776.00");
/// assert_eq!(totals.cash_amount.unwrap().to_string(), "310.00");
/// ```
pub fn calculate_weight_billing(
    lines: &[LineFigures],
    tcs_rate: Decimal,
    step_number: u32,
) -> WeightBillingResult {
    let breakdown = aggregate_lines(lines.iter().copied(), tcs_rate);

    let skipped: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.quantity <= Decimal::ZERO)
        .map(|(index, _)| index)
        .collect();
    let tcs_percent = (tcs_rate * Decimal::ONE_HUNDRED).normalize();

    let (output, reasoning) = match &breakdown {
        Some(breakdown) => {
            let totals = breakdown.totals();
            let mut reasoning = format!(
                "{} loading lines totalling ₹{} with GST; TCS {}%",
                breakdown.contributing_lines(),
                breakdown.total_billing.normalize(),
                tcs_percent
            );
            if !skipped.is_empty() {
                reasoning.push_str(&format!("; lines {:?} skipped (no loading)", skipped));
            }

            let output = serde_json::json!({
                "contributing_lines": breakdown.contributing_lines(),
                "skipped_lines": skipped,
                "total_gst": breakdown.total_gst.normalize().to_string(),
                "tcs_amount": breakdown.tcs_amount.normalize().to_string(),
                "billing_total_amount": totals.billing_total_amount.map(|d| d.to_string()),
                "cash_amount": totals.cash_amount.map(|d| d.to_string()),
                "tax": totals.tax.map(|d| d.to_string())
            });
            (output, reasoning)
        }
        None => (
            serde_json::json!({
                "calculated": false,
                "skipped_lines": skipped
            }),
            format!(
                "{} loading lines total more than can be represented - not calculated",
                lines.len() - skipped.len()
            ),
        ),
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "weight_billing".to_string(),
        rule_name: "Weight Billing".to_string(),
        input: serde_json::json!({
            "lines": lines.iter().map(|line| serde_json::json!({
                "loading": line.quantity.normalize().to_string(),
                "billing_rate": line.billing_rate.normalize().to_string(),
                "actual_rate": line.actual_rate.normalize().to_string(),
                "gst_rate": line.gst_rate.normalize().to_string()
            })).collect::<Vec<_>>(),
            "tcs_rate": tcs_rate.normalize().to_string()
        }),
        output,
        reasoning,
    };

    WeightBillingResult {
        breakdown,
        audit_step,
    }
}
