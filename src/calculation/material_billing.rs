//! Multi-material billing calculation.
//!
//! Same aggregation as weight billing, over material lines billed at the
//! form GST rate. Also summarises the contributing quantity per material.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use super::aggregate::{AggregateBreakdown, LineFigures, aggregate_lines};
use crate::models::{AuditStep, Material};

/// Coerced figures of one material line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterialLineInput {
    /// The material loaded.
    pub material: Material,
    /// Quantity in MT.
    pub quantity: Decimal,
    /// Invoice rate per MT.
    pub billing_rate: Decimal,
    /// Transacted rate per MT.
    pub actual_rate: Decimal,
}

/// The result of material billing.
#[derive(Debug, Clone)]
pub struct MaterialBillingResult {
    /// Per-line and aggregate figures; `None` if the totals overflowed.
    pub breakdown: Option<AggregateBreakdown>,
    /// Contributing quantity per material; materials with no positive line are absent.
    pub quantity_by_material: BTreeMap<Material, Decimal>,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Aggregates material lines into one invoice at the form GST rate.
///
/// # Examples
///
/// ```
/// use yard_billing::calculation::{DEFAULT_TCS_RATE, MaterialLineInput, calculate_material_billing};
/// use yard_billing::models::Material;
/// use rust_decimal::Decimal;
///
/// let lines = [
///     MaterialLineInput {
///         material: Material::ERom,
///         quantity: Decimal::from(20),
///         billing_rate: Decimal::from(100),
///         actual_rate: Decimal::from(110),
///     },
///     MaterialLineInput {
///         material: Material::FSteam,
///         quantity: Decimal::from(10),
///         billing_rate: Decimal::from(200),
///         actual_rate: Decimal::from(200),
///     },
/// ];
///
/// let result = calculate_material_billing(&lines, Decimal::from(18), DEFAULT_TCS_RATE, 1);
/// let totals = result.breakdown.unwrap().totals();
/// assert_eq!(totals.billing_total_amount.unwrap().to_string(), "4720.00");
/// assert_eq!(totals.cash_amount.unwrap().to_string(), "200.00");
/// assert_eq!(result.quantity_by_material[&Material::FSteam], Decimal::from(10));
/// ```
pub fn calculate_material_billing(
    lines: &[MaterialLineInput],
    gst_rate: Decimal,
    tcs_rate: Decimal,
    step_number: u32,
) -> MaterialBillingResult {
    let breakdown = aggregate_lines(
        lines.iter().map(|line| LineFigures {
            quantity: line.quantity,
            billing_rate: line.billing_rate,
            actual_rate: line.actual_rate,
            gst_rate,
        }),
        tcs_rate,
    );

    let mut quantity_by_material: BTreeMap<Material, Decimal> = BTreeMap::new();
    for line in lines.iter().filter(|line| line.quantity > Decimal::ZERO) {
        let total = quantity_by_material.entry(line.material).or_insert(Decimal::ZERO);
        *total = total.saturating_add(line.quantity);
    }

    let summary: serde_json::Map<String, serde_json::Value> = quantity_by_material
        .iter()
        .map(|(material, quantity)| {
            (
                material.as_str().to_string(),
                serde_json::Value::String(quantity.normalize().to_string()),
            )
        })
        .collect();

    let (output, reasoning) = match &breakdown {
        Some(breakdown) => {
            let totals = breakdown.totals();
            let output = serde_json::json!({
                "contributing_lines": breakdown.contributing_lines(),
                "quantity_by_material": summary,
                "total_gst": breakdown.total_gst.normalize().to_string(),
                "tcs_amount": breakdown.tcs_amount.normalize().to_string(),
                "billing_total_amount": totals.billing_total_amount.map(|d| d.to_string()),
                "cash_amount": totals.cash_amount.map(|d| d.to_string()),
                "tax": totals.tax.map(|d| d.to_string())
            });
            let reasoning = format!(
                "{} of {} material lines at {}% GST totalling ₹{}",
                breakdown.contributing_lines(),
                lines.len(),
                gst_rate.normalize(),
                breakdown.total_billing.normalize()
            );
            (output, reasoning)
        }
        None => (
            serde_json::json!({
                "calculated": false,
                "quantity_by_material": summary
            }),
            format!(
                "{} material lines total more than can be represented - not calculated",
                lines.len()
            ),
        ),
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "material_billing".to_string(),
        rule_name: "Different Material Billing".to_string(),
        input: serde_json::json!({
            "lines": lines.iter().map(|line| serde_json::json!({
                "name": line.material.as_str(),
                "quantity": line.quantity.normalize().to_string(),
                "billing_rate": line.billing_rate.normalize().to_string(),
                "actual_rate": line.actual_rate.normalize().to_string()
            })).collect::<Vec<_>>(),
            "gst_rate": gst_rate.normalize().to_string(),
            "tcs_rate": tcs_rate.normalize().to_string()
        }),
        output,
        reasoning,
    };

    MaterialBillingResult {
        breakdown,
        quantity_by_material,
        audit_step,
    }
}
