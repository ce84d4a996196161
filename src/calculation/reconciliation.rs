//! Reconciliation of a calculated amount against the payments entered.
//!
//! The account payment is entered GST-inclusive; its GST is stripped before
//! it is added to the cash payment:
//!
//! ```text
//! account_base = gst_rate > 0 ? account_with_gst / (1 + gst_rate / 100) : account_with_gst
//! total_paying = account_base + cash
//! remaining    = calculated_amount − total_paying
//! ```

use std::fmt;

use rust_decimal::Decimal;

use super::line_tax::gst_fraction;
use crate::formatting::{EMPTY_DISPLAY, format_inr, round_currency};
use crate::models::{AuditStep, BalanceSummary, BillingMode};

/// The unrounded reconciliation of one billing method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciliation {
    /// The amount the payments are measured against.
    pub calculated_amount: Decimal,
    /// Account payment with GST stripped; `None` if it cannot be computed.
    pub account_base: Option<Decimal>,
    /// Account base plus cash.
    pub total_paying: Option<Decimal>,
    /// Calculated amount minus total paying.
    pub remaining: Option<Decimal>,
}

impl Reconciliation {
    /// Returns the classification of the remaining amount.
    pub fn status(&self) -> BalanceStatus {
        BalanceStatus::classify(self.remaining)
    }

    /// Returns the rounded balance written back into the form.
    pub fn summary(&self) -> BalanceSummary {
        BalanceSummary {
            total_amount: Some(round_currency(self.calculated_amount)),
            total_paying: self.total_paying.map(round_currency),
            remaining: self.remaining.map(round_currency),
        }
    }
}

/// Reconciles payments against a calculated amount.
///
/// Never produces an undefined number: if a step cannot be computed the
/// affected fields are `None`.
///
/// # Examples
///
/// ```
/// use yard_billing::calculation::{BalanceStatus, reconcile};
/// use rust_decimal::Decimal;
///
/// let r = reconcile(Decimal::from(1000), Decimal::from(590), Decimal::from(200), Decimal::from(18));
/// assert_eq!(r.account_base, Some(Decimal::from(500)));
/// assert_eq!(r.total_paying, Some(Decimal::from(700)));
/// assert_eq!(r.remaining, Some(Decimal::from(300)));
/// assert_eq!(r.status().to_string(), "Remaining to Pay: ₹300.00");
/// ```
pub fn reconcile(
    calculated_amount: Decimal,
    account_with_gst: Decimal,
    cash: Decimal,
    gst_rate: Decimal,
) -> Reconciliation {
    let account_base = if gst_rate > Decimal::ZERO {
        account_with_gst.checked_div(Decimal::ONE + gst_fraction(gst_rate))
    } else {
        Some(account_with_gst)
    };
    let total_paying = account_base.and_then(|base| base.checked_add(cash));
    let remaining = total_paying.and_then(|paying| calculated_amount.checked_sub(paying));

    Reconciliation {
        calculated_amount,
        account_base,
        total_paying,
        remaining,
    }
}

/// Which way a balance leans.
///
/// # Examples
///
/// ```
/// use yard_billing::calculation::BalanceStatus;
/// use rust_decimal::Decimal;
///
/// assert_eq!(BalanceStatus::classify(Some(Decimal::from(-200))).to_string(), "Excess/Advance: ₹200.00");
/// assert_eq!(BalanceStatus::classify(Some(Decimal::new(-4, 3))).to_string(), "Balanced");
/// assert_eq!(BalanceStatus::classify(None).to_string(), "—");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceStatus {
    /// Money is still owed; holds the rounded amount.
    RemainingToPay(Decimal),
    /// More was paid than owed; holds the rounded excess as a positive amount.
    ExcessAdvance(Decimal),
    /// Nothing owed either way after rounding.
    Balanced,
    /// No balance has been computed.
    Unavailable,
}

impl BalanceStatus {
    /// Classifies a remaining amount after rounding it to two places.
    pub fn classify(remaining: Option<Decimal>) -> Self {
        let Some(remaining) = remaining else {
            return BalanceStatus::Unavailable;
        };

        let rounded = round_currency(remaining);
        if rounded > Decimal::ZERO {
            BalanceStatus::RemainingToPay(rounded)
        } else if rounded < Decimal::ZERO {
            BalanceStatus::ExcessAdvance(rounded.abs())
        } else {
            BalanceStatus::Balanced
        }
    }
}

impl fmt::Display for BalanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BalanceStatus::RemainingToPay(amount) => {
                write!(f, "Remaining to Pay: {}", format_inr(*amount))
            }
            BalanceStatus::ExcessAdvance(amount) => {
                write!(f, "Excess/Advance: {}", format_inr(*amount))
            }
            BalanceStatus::Balanced => f.write_str("Balanced"),
            BalanceStatus::Unavailable => f.write_str(EMPTY_DISPLAY),
        }
    }
}

/// Builds the audit step recording a method's reconciliation.
pub(crate) fn reconciliation_step(
    mode: BillingMode,
    basis: &str,
    gst_rate: Decimal,
    account_with_gst: Decimal,
    cash: Decimal,
    reconciliation: &Reconciliation,
    step_number: u32,
) -> AuditStep {
    let summary = reconciliation.summary();
    let status = reconciliation.status();

    AuditStep {
        step_number,
        rule_id: format!("{}_reconciliation", mode),
        rule_name: format!("{} Reconciliation", mode.label()),
        input: serde_json::json!({
            "basis": basis,
            "calculated_amount": reconciliation.calculated_amount.normalize().to_string(),
            "account_with_gst": account_with_gst.normalize().to_string(),
            "cash": cash.normalize().to_string(),
            "gst_rate": gst_rate.normalize().to_string()
        }),
        output: serde_json::json!({
            "account_base": reconciliation.account_base.map(|d| round_currency(d).to_string()),
            "total_paying": summary.total_paying.map(|d| d.to_string()),
            "remaining": summary.remaining.map(|d| d.to_string()),
            "status": status.to_string()
        }),
        reasoning: format!(
            "₹{} ({}) against ₹{} paid: {}",
            round_currency(reconciliation.calculated_amount),
            basis,
            summary
                .total_paying
                .map(|d| d.to_string())
                .unwrap_or_else(|| EMPTY_DISPLAY.to_string()),
            status
        ),
    }
}
