//! Core data models for the yard billing engine.
//!
//! This module contains the billing form, its per-mode details and line
//! items, the derived totals, and the audit/result types.

mod billing_form;
mod billing_mode;
mod calculation_result;
mod lines;
pub(crate) mod raw_input;
mod totals;

pub use billing_form::{
    BillingForm, BillingMethod, FormRecord, HalfBilling, MaterialBilling, WeightBilling,
};
pub use billing_mode::{BillingMode, Material};
pub use calculation_result::{AuditStep, AuditTrace, AuditWarning, CalculationResult, ModeDisplay};
pub use lines::{MaterialLine, WeightLine};
pub use totals::{BalanceSummary, BillingTotals};
