//! Coercion of raw form input into numbers.
//!
//! Form fields are coerced the way the yard's web form always has: anything
//! that is not a number counts as zero and never blocks the form. The
//! [`InputCoercer`] keeps a record of every value it had to replace so that
//! callers can surface it as a warning.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::models::AuditWarning;

/// Largest accepted input magnitude (10^12).
///
/// Keeps products of quantity, rate and GST within fixed-point range.
pub const MAX_INPUT_MAGNITUDE: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// Warning code for input that is not a number.
pub const NON_NUMERIC_INPUT: &str = "NON_NUMERIC_INPUT";

/// Warning code for input beyond [`MAX_INPUT_MAGNITUDE`].
pub const INPUT_OUT_OF_RANGE: &str = "INPUT_OUT_OF_RANGE";

/// Warning code for a GST rate that was replaced by the default.
pub const INVALID_GST_RATE: &str = "INVALID_GST_RATE";

/// Warning code for line totals too large to represent.
pub const AMOUNT_OUT_OF_RANGE: &str = "AMOUNT_OUT_OF_RANGE";

/// The outcome of reading one raw input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedInput {
    /// Nothing was entered (empty or whitespace).
    Empty,
    /// A number within range.
    Number(Decimal),
    /// A number beyond [`MAX_INPUT_MAGNITUDE`].
    OutOfRange,
    /// Text that is not a number.
    Invalid,
}

/// Reads a raw input field.
///
/// Accepts what a browser number conversion accepts for finite values:
/// surrounding whitespace, a sign, plain and exponent notation, and
/// `0x`/`0o`/`0b` integers.
///
/// # Examples
///
/// ```
/// use yard_billing::calculation::{ParsedInput, parse_input};
/// use rust_decimal::Decimal;
///
/// assert_eq!(parse_input(" 12.5 "), ParsedInput::Number(Decimal::new(125, 1)));
/// assert_eq!(parse_input("1e3"), ParsedInput::Number(Decimal::from(1000)));
/// assert_eq!(parse_input(""), ParsedInput::Empty);
/// assert_eq!(parse_input("12abc"), ParsedInput::Invalid);
/// ```
pub fn parse_input(raw: &str) -> ParsedInput {
    let text = raw.trim();
    if text.is_empty() {
        return ParsedInput::Empty;
    }

    match parse_number(text) {
        Some(value) if value.abs() > MAX_INPUT_MAGNITUDE => ParsedInput::OutOfRange,
        Some(value) => ParsedInput::Number(value),
        None => ParsedInput::Invalid,
    }
}

/// Coerces a raw input field to a number, with anything unusable as zero.
///
/// # Examples
///
/// ```
/// use yard_billing::calculation::coerce_number;
/// use rust_decimal::Decimal;
///
/// assert_eq!(coerce_number("45"), Decimal::from(45));
/// assert_eq!(coerce_number("forty"), Decimal::ZERO);
/// assert_eq!(coerce_number(""), Decimal::ZERO);
/// ```
pub fn coerce_number(raw: &str) -> Decimal {
    match parse_input(raw) {
        ParsedInput::Number(value) => value,
        _ => Decimal::ZERO,
    }
}

fn parse_number(text: &str) -> Option<Decimal> {
    if text.contains('_') {
        return None;
    }
    if let Some(value) = parse_radix_integer(text) {
        return Some(value);
    }

    let (negative, unsigned) = match text.as_bytes()[0] {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };

    let magnitude = parse_decimal(unsigned)?;
    Some(if negative { -magnitude } else { magnitude })
}

fn parse_radix_integer(text: &str) -> Option<Decimal> {
    let lower = text.to_ascii_lowercase();
    let (radix, digits) = if let Some(digits) = lower.strip_prefix("0x") {
        (16, digits)
    } else if let Some(digits) = lower.strip_prefix("0o") {
        (8, digits)
    } else if let Some(digits) = lower.strip_prefix("0b") {
        (2, digits)
    } else {
        return None;
    };

    // Radix literals are unsigned.
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return None;
    }
    i64::from_str_radix(digits, radix).ok().map(Decimal::from)
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    if text.is_empty() || text.starts_with(['+', '-']) {
        return None;
    }
    if !text.bytes().all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-')) {
        return None;
    }

    let lower = text.to_ascii_lowercase();
    if lower.contains('e') {
        let (mantissa, exponent) = lower.split_once('e')?;
        if mantissa.is_empty() || exponent.is_empty() {
            return None;
        }
        let mantissa = parse_plain(mantissa)?;
        let exponent: i32 = exponent.parse().ok()?;
        return Decimal::from_scientific(&format!("{}e{}", mantissa, exponent)).ok();
    }

    parse_plain(&lower)
}

/// Parses digits with at most one decimal point; `5.` and `.5` are accepted.
fn parse_plain(text: &str) -> Option<Decimal> {
    if text == "." || text.matches('.').count() > 1 || text.contains(['+', '-']) {
        return None;
    }
    let trimmed = text.strip_suffix('.').unwrap_or(text);
    let normalized = if trimmed.starts_with('.') {
        format!("0{}", trimmed)
    } else {
        trimmed.to_string()
    };
    Decimal::from_str(&normalized).ok()
}

/// Coerces form fields while collecting warnings for replaced values.
///
/// # Example
///
/// ```
/// use yard_billing::calculation::InputCoercer;
/// use rust_decimal::Decimal;
///
/// let mut coercer = InputCoercer::new();
/// assert_eq!(coercer.number("halfBilling.billingRate", "5O"), Decimal::ZERO);
/// assert_eq!(coercer.number("netWeight", ""), Decimal::ZERO);
///
/// let warnings = coercer.into_warnings();
/// assert_eq!(warnings.len(), 1);
/// assert_eq!(warnings[0].code, "NON_NUMERIC_INPUT");
/// ```
#[derive(Debug, Default)]
pub struct InputCoercer {
    warnings: Vec<AuditWarning>,
}

impl InputCoercer {
    /// Creates a coercer with no warnings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Coerces a field to a number, recording a warning if text was dropped.
    pub fn number(&mut self, field: &str, raw: &str) -> Decimal {
        match parse_input(raw) {
            ParsedInput::Number(value) => value,
            ParsedInput::Empty => Decimal::ZERO,
            ParsedInput::OutOfRange => {
                self.warn(
                    INPUT_OUT_OF_RANGE,
                    format!("{} '{}' exceeds {}; using 0", field, raw.trim(), MAX_INPUT_MAGNITUDE),
                );
                Decimal::ZERO
            }
            ParsedInput::Invalid => {
                self.warn(
                    NON_NUMERIC_INPUT,
                    format!("{} '{}' is not a number; using 0", field, raw.trim()),
                );
                Decimal::ZERO
            }
        }
    }

    /// Coerces a GST percentage.
    ///
    /// Empty input means `default`. Anything that is not a number between 0
    /// and 100 also falls back to `default`, with a warning.
    pub fn gst_rate(&mut self, field: &str, raw: &str, default: Decimal) -> Decimal {
        match parse_input(raw) {
            ParsedInput::Empty => default,
            ParsedInput::Number(rate) if rate >= Decimal::ZERO && rate <= Decimal::ONE_HUNDRED => {
                rate
            }
            _ => {
                self.warn(
                    INVALID_GST_RATE,
                    format!(
                        "{} '{}' is not a GST rate between 0 and 100; using {}%",
                        field,
                        raw.trim(),
                        default.normalize()
                    ),
                );
                default
            }
        }
    }

    /// Coerces an optional per-line GST rate, falling back to `form_rate`.
    pub fn line_gst_rate(&mut self, field: &str, raw: Option<&str>, form_rate: Decimal) -> Decimal {
        match raw {
            Some(raw) => self.gst_rate(field, raw, form_rate),
            None => form_rate,
        }
    }

    /// Records that the summed lines of a mode could not be represented.
    pub fn total_out_of_range(&mut self, field: &str) {
        self.warn(
            AMOUNT_OUT_OF_RANGE,
            format!("{} line totals are too large to represent; not calculated", field),
        );
    }

    /// Returns the warnings gathered so far.
    pub fn warnings(&self) -> &[AuditWarning] {
        &self.warnings
    }

    /// Consumes the coercer, returning its warnings.
    pub fn into_warnings(self) -> Vec<AuditWarning> {
        self.warnings
    }

    fn warn(&mut self, code: &str, message: String) {
        self.warnings.push(AuditWarning {
            code: code.to_string(),
            message,
            severity: "medium".to_string(),
        });
    }
}
