//! Currency rounding and display formatting.
//!
//! Stored values are plain decimals fixed at two places (`"5900.00"`). The
//! rupee strings produced here, with lakh/crore digit grouping, are for
//! display only and are never parsed back.

use rust_decimal::{Decimal, RoundingStrategy};

/// Shown in place of a value that could not be computed.
pub const EMPTY_DISPLAY: &str = "—";

/// Rounds to exactly two decimal places, half away from zero.
///
/// The result always carries a scale of two so it serializes as `"5900.00"`.
///
/// # Examples
///
/// ```
/// use yard_billing::formatting::round_currency;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_currency(Decimal::from(5900)).to_string(), "5900.00");
/// assert_eq!(round_currency(Decimal::from_str("2.345").unwrap()).to_string(), "2.35");
/// assert_eq!(round_currency(Decimal::from_str("-2.345").unwrap()).to_string(), "-2.35");
/// ```
pub fn round_currency(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded
}

/// Formats an amount as rupees with Indian digit grouping.
///
/// # Examples
///
/// ```
/// use yard_billing::formatting::format_inr;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(format_inr(Decimal::from_str("1234567.891").unwrap()), "₹12,34,567.89");
/// assert_eq!(format_inr(Decimal::from(-200)), "-₹200.00");
/// ```
pub fn format_inr(amount: Decimal) -> String {
    let rounded = round_currency(amount);
    let sign = if rounded.is_sign_negative() { "-" } else { "" };
    let text = rounded.abs().to_string();
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    format!("{}₹{}.{}", sign, group_indian(whole), fraction)
}

/// Formats an optional amount, falling back to [`EMPTY_DISPLAY`].
pub fn display_amount(amount: Option<Decimal>) -> String {
    amount.map(format_inr).unwrap_or_else(|| EMPTY_DISPLAY.to_string())
}

/// Groups integer digits as thousands, then lakhs and crores (pairs).
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    let mut end = head.len();
    while end > 2 {
        groups.push(&head[end - 2..end]);
        end -= 2;
    }
    groups.push(&head[..end]);
    groups.reverse();

    format!("{},{}", groups.join(","), tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_round_currency_pads_to_two_places() {
        assert_eq!(round_currency(dec("959")).to_string(), "959.00");
        assert_eq!(round_currency(dec("59.5")).to_string(), "59.50");
    }

    #[test]
    fn test_round_currency_midpoint_goes_away_from_zero() {
        assert_eq!(round_currency(dec("0.125")).to_string(), "0.13");
        assert_eq!(round_currency(dec("-0.125")).to_string(), "-0.13");
        assert_eq!(round_currency(dec("0.124999")).to_string(), "0.12");
    }

    #[test]
    fn test_round_currency_has_no_negative_zero() {
        assert_eq!(round_currency(dec("-0.001")).to_string(), "0.00");
    }

    #[test]
    fn test_group_indian_digits() {
        assert_eq!(group_indian("7"), "7");
        assert_eq!(group_indian("999"), "999");
        assert_eq!(group_indian("1000"), "1,000");
        assert_eq!(group_indian("100000"), "1,00,000");
        assert_eq!(group_indian("12345678"), "1,23,45,678");
        assert_eq!(group_indian("123456789"), "12,34,56,789");
    }

    #[test]
    fn test_format_inr() {
        assert_eq!(format_inr(dec("300")), "₹300.00");
        assert_eq!(format_inr(dec("5900")), "₹5,900.00");
        assert_eq!(format_inr(dec("3776.004")), "₹3,776.00");
        assert_eq!(format_inr(dec("-1500000")), "-₹15,00,000.00");
        assert_eq!(format_inr(Decimal::ZERO), "₹0.00");
    }

    #[test]
    fn test_display_amount_uses_dash_for_missing_values() {
        assert_eq!(display_amount(None), "—");
        assert_eq!(display_amount(Some(dec("959"))), "₹959.00");
    }
}
