//! The single-line tax formula shared by every billing mode.
//!
//! For one quantity billed at one rate:
//!
//! ```text
//! base     = quantity × billing_rate
//! gst      = base × (gst_rate / 100)
//! with_gst = base + gst
//! cash     = quantity × (actual_rate − billing_rate)
//! ```
//!
//! TCS is charged on the GST-inclusive total of the whole invoice, so it is
//! applied by the caller after aggregation (see [`tcs_amount`]).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// GST percentage used when none is given (18%).
pub const DEFAULT_GST_RATE: Decimal = Decimal::from_parts(18, 0, 0, false, 0);

/// TCS rate as a fraction of the GST-inclusive total (1%).
pub const DEFAULT_TCS_RATE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// The unrounded tax breakdown of a single line.
///
/// # Example
///
/// ```
/// use yard_billing::calculation::calculate_line_tax;
/// use rust_decimal::Decimal;
///
/// let line = calculate_line_tax(
///     Decimal::from(100),
///     Decimal::from(50),
///     Decimal::from(55),
///     Decimal::from(18),
/// );
/// assert_eq!(line.base, Decimal::from(5000));
/// assert_eq!(line.gst_amount, Decimal::from(900));
/// assert_eq!(line.with_gst, Decimal::from(5900));
/// assert_eq!(line.cash_amount, Decimal::from(500));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineTax {
    /// Quantity in MT.
    pub quantity: Decimal,
    /// Invoice rate per MT.
    pub billing_rate: Decimal,
    /// Transacted rate per MT.
    pub actual_rate: Decimal,
    /// GST percentage applied.
    pub gst_rate: Decimal,
    /// Pre-tax amount.
    pub base: Decimal,
    /// GST on the base.
    pub gst_amount: Decimal,
    /// Base plus GST.
    pub with_gst: Decimal,
    /// Rate-differential cash settlement; negative when the actual rate is lower.
    pub cash_amount: Decimal,
}

/// Applies the line formula.
pub fn calculate_line_tax(
    quantity: Decimal,
    billing_rate: Decimal,
    actual_rate: Decimal,
    gst_rate: Decimal,
) -> LineTax {
    let base = quantity * billing_rate;
    let gst_amount = base * gst_fraction(gst_rate);

    LineTax {
        quantity,
        billing_rate,
        actual_rate,
        gst_rate,
        base,
        gst_amount,
        with_gst: base + gst_amount,
        cash_amount: quantity * (actual_rate - billing_rate),
    }
}

/// Converts a GST percentage to a fraction (18 → 0.18).
pub fn gst_fraction(gst_rate: Decimal) -> Decimal {
    gst_rate / Decimal::ONE_HUNDRED
}

/// TCS on a GST-inclusive billing total.
///
/// # Example
///
/// ```
/// use yard_billing::calculation::{DEFAULT_TCS_RATE, tcs_amount};
/// use rust_decimal::Decimal;
///
/// assert_eq!(tcs_amount(Decimal::from(5900), DEFAULT_TCS_RATE), Decimal::from(59));
/// ```
pub fn tcs_amount(billing_total: Decimal, tcs_rate: Decimal) -> Decimal {
    billing_total * tcs_rate
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_default_rates() {
        assert_eq!(DEFAULT_GST_RATE, dec("18"));
        assert_eq!(DEFAULT_TCS_RATE, dec("0.01"));
    }

    #[test]
    fn test_line_formula() {
        let line = calculate_line_tax(dec("50"), dec("40"), dec("45"), dec("18"));

        assert_eq!(line.base, dec("2000"));
        assert_eq!(line.gst_amount, dec("360"));
        assert_eq!(line.with_gst, dec("2360"));
        assert_eq!(line.cash_amount, dec("250"));
    }

    #[test]
    fn test_cash_is_negative_when_actual_rate_is_lower() {
        let line = calculate_line_tax(dec("10"), dec("50"), dec("45"), dec("18"));
        assert_eq!(line.cash_amount, dec("-50"));
    }

    #[test]
    fn test_zero_gst_rate_leaves_base_untaxed() {
        let line = calculate_line_tax(dec("12.5"), dec("800"), dec("800"), Decimal::ZERO);
        assert_eq!(line.gst_amount, Decimal::ZERO);
        assert_eq!(line.with_gst, dec("10000"));
        assert_eq!(line.cash_amount, Decimal::ZERO);
    }

    #[test]
    fn test_fractional_weights_keep_full_precision() {
        let line = calculate_line_tax(dec("12.345"), dec("1234.5"), dec("1300"), dec("5"));
        assert_eq!(line.base, dec("15239.9025"));
        assert_eq!(line.gst_amount, dec("761.995125"));
        assert_eq!(line.cash_amount, dec("808.5975"));
    }

    #[test]
    fn test_tcs_is_one_percent_of_total() {
        assert_eq!(tcs_amount(dec("3776"), DEFAULT_TCS_RATE), dec("37.76"));
    }
}
