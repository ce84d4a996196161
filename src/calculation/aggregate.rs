//! Aggregation of line items into one invoice.
//!
//! Used by both weight and material billing. Lines with a quantity of zero
//! or less stay in the breakdown as `None` so indices keep matching the
//! editable line list, but they contribute nothing to any total.
//!
//! Each line is bounded by the input cap, but a long enough list can still
//! carry a running total past the range of `Decimal`. The sums are checked
//! and an invoice that overflows has no breakdown at all.

use rust_decimal::Decimal;

use super::line_tax::{LineTax, calculate_line_tax};
use crate::models::BillingTotals;

/// Coerced figures of one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineFigures {
    /// Quantity in MT.
    pub quantity: Decimal,
    /// Invoice rate per MT.
    pub billing_rate: Decimal,
    /// Transacted rate per MT.
    pub actual_rate: Decimal,
    /// GST percentage for this line.
    pub gst_rate: Decimal,
}

/// The unrounded breakdown of an aggregated invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateBreakdown {
    /// Per-line breakdowns, index-aligned with the input; `None` for skipped lines.
    pub lines: Vec<Option<LineTax>>,
    /// Sum of pre-tax bases.
    pub total_base: Decimal,
    /// Sum of GST.
    pub total_gst: Decimal,
    /// Sum of GST-inclusive amounts.
    pub total_billing: Decimal,
    /// Sum of cash settlements.
    pub total_cash: Decimal,
    /// TCS on `total_billing`.
    pub tcs_amount: Decimal,
    /// `total_gst + tcs_amount`.
    pub total_tax: Decimal,
}

impl AggregateBreakdown {
    /// Returns the number of lines that contributed to the totals.
    pub fn contributing_lines(&self) -> usize {
        self.lines.iter().flatten().count()
    }

    /// Returns the rounded totals written back into the form.
    pub fn totals(&self) -> BillingTotals {
        BillingTotals::from_amounts(self.total_cash, self.total_billing, self.total_tax)
    }
}

/// Sums the line formula over every line with a positive quantity.
///
/// Returns `None` if any total leaves the range of `Decimal`.
pub fn aggregate_lines<I>(lines: I, tcs_rate: Decimal) -> Option<AggregateBreakdown>
where
    I: IntoIterator<Item = LineFigures>,
{
    let mut breakdown = AggregateBreakdown {
        lines: Vec::new(),
        total_base: Decimal::ZERO,
        total_gst: Decimal::ZERO,
        total_billing: Decimal::ZERO,
        total_cash: Decimal::ZERO,
        tcs_amount: Decimal::ZERO,
        total_tax: Decimal::ZERO,
    };

    for figures in lines {
        if figures.quantity <= Decimal::ZERO {
            breakdown.lines.push(None);
            continue;
        }

        let line = calculate_line_tax(
            figures.quantity,
            figures.billing_rate,
            figures.actual_rate,
            figures.gst_rate,
        );
        breakdown.total_base = breakdown.total_base.checked_add(line.base)?;
        breakdown.total_gst = breakdown.total_gst.checked_add(line.gst_amount)?;
        breakdown.total_billing = breakdown.total_billing.checked_add(line.with_gst)?;
        breakdown.total_cash = breakdown.total_cash.checked_add(line.cash_amount)?;
        breakdown.lines.push(Some(line));
    }

    breakdown.tcs_amount = breakdown.total_billing.checked_mul(tcs_rate)?;
    breakdown.total_tax = breakdown.total_gst.checked_add(breakdown.tcs_amount)?;
    Some(breakdown)
}
