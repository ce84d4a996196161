//! Derived totals written back into each billing method.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::formatting::round_currency;

/// The invoice totals of a billing method.
///
/// Every field is empty until the method has been calculated. Values are
/// always fixed at two decimal places and serialize as strings.
///
/// # Example
///
/// ```
/// use yard_billing::models::BillingTotals;
/// use rust_decimal::Decimal;
///
/// let totals = BillingTotals::from_amounts(Decimal::from(500), Decimal::from(5900), Decimal::from(959));
/// let json = serde_json::to_value(&totals).unwrap();
/// assert_eq!(json["billingTotalAmount"], "5900.00");
/// assert_eq!(json["cashAmount"], "500.00");
/// assert_eq!(json["tax"], "959.00");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingTotals {
    /// Cash settlement from the rate differential; may be negative.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cash_amount: Option<Decimal>,
    /// GST-inclusive invoice total.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_total_amount: Option<Decimal>,
    /// GST plus TCS.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax: Option<Decimal>,
}

impl BillingTotals {
    /// Builds totals from unrounded amounts.
    pub fn from_amounts(cash_amount: Decimal, billing_total_amount: Decimal, tax: Decimal) -> Self {
        Self {
            cash_amount: Some(round_currency(cash_amount)),
            billing_total_amount: Some(round_currency(billing_total_amount)),
            tax: Some(round_currency(tax)),
        }
    }

    /// Returns true if nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.cash_amount.is_none() && self.billing_total_amount.is_none() && self.tax.is_none()
    }
}

/// Balance of a billing method against the payments entered for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSummary {
    /// The amount the payments are reconciled against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<Decimal>,
    /// Account portion without GST plus cash.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_paying: Option<Decimal>,
    /// Positive when money is still owed, negative for an advance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining: Option<Decimal>,
}

impl BalanceSummary {
    /// Returns true if nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.total_amount.is_none() && self.total_paying.is_none() && self.remaining.is_none()
    }
}
