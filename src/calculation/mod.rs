//! Calculation logic for the yard billing engine.
//!
//! This module contains the numeric coercion of form input, the single-line
//! GST formula, the half, weight and material billing engines, payment
//! reconciliation, and the reducer that runs them over a whole form.

mod aggregate;
mod coercion;
mod half_billing;
mod line_tax;
mod material_billing;
mod recalculate;
mod reconciliation;
mod weight_billing;

pub use aggregate::{AggregateBreakdown, LineFigures, aggregate_lines};
pub use coercion::{
    AMOUNT_OUT_OF_RANGE, INPUT_OUT_OF_RANGE, INVALID_GST_RATE, InputCoercer, MAX_INPUT_MAGNITUDE,
    NON_NUMERIC_INPUT, ParsedInput, coerce_number, parse_input,
};
pub use half_billing::{
    HalfBillingBreakdown, HalfBillingInput, HalfBillingResult, calculate_half_billing,
};
pub use line_tax::{
    DEFAULT_GST_RATE, DEFAULT_TCS_RATE, LineTax, calculate_line_tax, gst_fraction, tcs_amount,
};
pub use material_billing::{MaterialBillingResult, MaterialLineInput, calculate_material_billing};
pub use recalculate::{
    GuardPolicy, RecalcOptions, Recalculation, ReconciliationBasis, calculate_form, recalculate,
};
pub use reconciliation::{BalanceStatus, Reconciliation, reconcile};
pub use weight_billing::{WeightBillingResult, calculate_weight_billing};
