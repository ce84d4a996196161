//! The recalculation reducer.
//!
//! [`recalculate`] takes a form as entered and returns a new form with every
//! derived field refreshed. It runs after every change, so it never fails:
//! unusable input is coerced and reported as a warning.

use std::time::Instant;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::aggregate::LineFigures;
use super::coercion::InputCoercer;
use super::half_billing::{HalfBillingInput, calculate_half_billing};
use super::line_tax::{DEFAULT_GST_RATE, DEFAULT_TCS_RATE};
use super::material_billing::{MaterialLineInput, calculate_material_billing};
use super::reconciliation::{reconcile, reconciliation_step};
use super::weight_billing::calculate_weight_billing;
use crate::models::{
    AuditStep, AuditTrace, AuditWarning, BalanceSummary, BillingForm, BillingMethod, BillingMode,
    BillingTotals, CalculationResult, HalfBilling, MaterialBilling, ModeDisplay, WeightBilling,
};

/// What happens to a half billing result when the guard prevents calculation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardPolicy {
    /// Leave the previously written result in place.
    #[default]
    KeepStale,
    /// Empty the result and its balance.
    Clear,
}

/// The amount a mode's payments are reconciled against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconciliationBasis {
    /// Sum of line bases before GST.
    PreTax,
    /// GST-inclusive billing total.
    PostTax,
}

impl ReconciliationBasis {
    /// Returns the configuration name of the basis.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReconciliationBasis::PreTax => "pre_tax",
            ReconciliationBasis::PostTax => "post_tax",
        }
    }

    fn select(&self, base: Decimal, with_gst: Decimal) -> Decimal {
        match self {
            ReconciliationBasis::PreTax => base,
            ReconciliationBasis::PostTax => with_gst,
        }
    }
}

/// Settings that shape a recalculation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecalcOptions {
    /// GST percentage used when the form leaves it empty.
    pub default_gst_rate: Decimal,
    /// TCS fraction of the GST-inclusive total.
    pub tcs_rate: Decimal,
    /// Half billing guard behaviour.
    pub guard_policy: GuardPolicy,
    /// Whether material billing totals are written into the form.
    pub material_write_back: bool,
    /// Reconciliation basis for half billing.
    pub half_basis: ReconciliationBasis,
    /// Reconciliation basis for weight billing.
    pub weight_basis: ReconciliationBasis,
    /// Reconciliation basis for material billing.
    pub different_basis: ReconciliationBasis,
}

impl Default for RecalcOptions {
    fn default() -> Self {
        Self {
            default_gst_rate: DEFAULT_GST_RATE,
            tcs_rate: DEFAULT_TCS_RATE,
            guard_policy: GuardPolicy::KeepStale,
            material_write_back: false,
            half_basis: ReconciliationBasis::PreTax,
            weight_basis: ReconciliationBasis::PostTax,
            different_basis: ReconciliationBasis::PreTax,
        }
    }
}

impl RecalcOptions {
    /// Returns the reconciliation basis configured for a mode.
    pub fn basis(&self, mode: BillingMode) -> ReconciliationBasis {
        match mode {
            BillingMode::Half => self.half_basis,
            BillingMode::Weight => self.weight_basis,
            BillingMode::Different => self.different_basis,
        }
    }
}

/// A recalculated form together with how it was derived.
#[derive(Debug, Clone)]
pub struct Recalculation {
    /// The form with refreshed derived fields.
    pub form: BillingForm,
    /// Every formula applied, in order.
    pub audit_steps: Vec<AuditStep>,
    /// Inputs that had to be coerced.
    pub warnings: Vec<AuditWarning>,
}

impl Recalculation {
    /// Wraps the recalculation into a [`CalculationResult`].
    pub fn into_result(self, duration_us: u64) -> CalculationResult {
        let displays = self.form.methods().iter().map(ModeDisplay::from_method).collect();

        CalculationResult {
            calculation_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            form: self.form,
            displays,
            audit_trace: AuditTrace {
                steps: self.audit_steps,
                warnings: self.warnings,
                duration_us,
            },
        }
    }
}

/// Recalculates and times a form, producing the full result.
pub fn calculate_form(form: &BillingForm, options: &RecalcOptions) -> CalculationResult {
    let start_time = Instant::now();
    let recalculation = recalculate(form, options);
    let duration_us = start_time.elapsed().as_micros() as u64;
    recalculation.into_result(duration_us)
}

struct Pass<'a> {
    options: &'a RecalcOptions,
    coercer: InputCoercer,
    steps: Vec<AuditStep>,
    gst_rate: Decimal,
}

impl Pass<'_> {
    fn next_step(&self) -> u32 {
        self.steps.len() as u32 + 1
    }

    fn reconcile_payments(
        &mut self,
        mode: BillingMode,
        base: Decimal,
        with_gst: Decimal,
        account_with_gst: &str,
        cash: &str,
    ) -> BalanceSummary {
        let prefix = detail_field(mode);
        let account = self
            .coercer
            .number(&format!("{}.accountWithGst", prefix), account_with_gst);
        let cash = self.coercer.number(&format!("{}.cash", prefix), cash);
        let basis = self.options.basis(mode);

        let reconciliation = reconcile(basis.select(base, with_gst), account, cash, self.gst_rate);
        let step = reconciliation_step(
            mode,
            basis.as_str(),
            self.gst_rate,
            account,
            cash,
            &reconciliation,
            self.next_step(),
        );
        self.steps.push(step);
        reconciliation.summary()
    }

    fn half(&mut self, half: &mut HalfBilling, net_weight: Decimal) {
        let input = HalfBillingInput {
            net_weight,
            billing_rate: self.coercer.number("halfBilling.billingRate", &half.billing_rate),
            actual_rate: self.coercer.number("halfBilling.actualRate", &half.actual_rate),
            gst_rate: self.gst_rate,
            tcs_rate: self.options.tcs_rate,
        };

        let result = calculate_half_billing(&input, self.next_step());
        self.steps.push(result.audit_step);

        match result.breakdown {
            Some(breakdown) => {
                half.totals = breakdown.totals();
                half.balance = self.reconcile_payments(
                    BillingMode::Half,
                    breakdown.line.base,
                    breakdown.line.with_gst,
                    &half.account_with_gst,
                    &half.cash,
                );
            }
            None => {
                debug!(
                    net_weight = %input.net_weight,
                    billing_rate = %input.billing_rate,
                    policy = ?self.options.guard_policy,
                    "Half billing guard not met"
                );
                if self.options.guard_policy == GuardPolicy::Clear {
                    half.totals = BillingTotals::default();
                    half.balance = BalanceSummary::default();
                }
            }
        }
    }

    fn weight(&mut self, weight: &mut WeightBilling) {
        let lines: Vec<LineFigures> = weight
            .lines
            .iter()
            .enumerate()
            .map(|(index, line)| {
                let field = |name: &str| format!("weightBilling.lines[{}].{}", index, name);
                LineFigures {
                    quantity: self.coercer.number(&field("loading"), &line.loading),
                    billing_rate: self.coercer.number(&field("billingRate"), &line.billing_rate),
                    actual_rate: self.coercer.number(&field("actualRate"), &line.actual_rate),
                    gst_rate: self.coercer.line_gst_rate(
                        &field("gstRate"),
                        line.gst_rate.as_deref(),
                        self.gst_rate,
                    ),
                }
            })
            .collect();

        let result = calculate_weight_billing(&lines, self.options.tcs_rate, self.next_step());
        self.steps.push(result.audit_step);

        match result.breakdown {
            Some(breakdown) => {
                weight.totals = breakdown.totals();
                weight.balance = self.reconcile_payments(
                    BillingMode::Weight,
                    breakdown.total_base,
                    breakdown.total_billing,
                    &weight.account_with_gst,
                    &weight.cash,
                );
            }
            None => {
                self.totals_out_of_range(BillingMode::Weight, weight.lines.len());
                weight.totals = BillingTotals::default();
                weight.balance = BalanceSummary::default();
            }
        }
    }

    fn different(&mut self, different: &mut MaterialBilling) {
        let lines: Vec<MaterialLineInput> = different
            .lines
            .iter()
            .enumerate()
            .map(|(index, line)| {
                let field = |name: &str| format!("differentBilling.lines[{}].{}", index, name);
                MaterialLineInput {
                    material: line.name,
                    quantity: self.coercer.number(&field("quantity"), &line.quantity),
                    billing_rate: self.coercer.number(&field("billingRate"), &line.billing_rate),
                    actual_rate: self.coercer.number(&field("actualRate"), &line.actual_rate),
                }
            })
            .collect();

        let result = calculate_material_billing(
            &lines,
            self.gst_rate,
            self.options.tcs_rate,
            self.next_step(),
        );
        self.steps.push(result.audit_step);

        match result.breakdown {
            Some(breakdown) => {
                if self.options.material_write_back {
                    different.totals = breakdown.totals();
                }
                different.balance = self.reconcile_payments(
                    BillingMode::Different,
                    breakdown.total_base,
                    breakdown.total_billing,
                    &different.account_with_gst,
                    &different.cash,
                );
            }
            None => {
                self.totals_out_of_range(BillingMode::Different, different.lines.len());
                if self.options.material_write_back {
                    different.totals = BillingTotals::default();
                }
                different.balance = BalanceSummary::default();
            }
        }
    }

    fn totals_out_of_range(&mut self, mode: BillingMode, line_count: usize) {
        debug!(mode = %mode, line_count, "Line totals out of range");
        self.coercer.total_out_of_range(detail_field(mode));
    }
}

fn detail_field(mode: BillingMode) -> &'static str {
    match mode {
        BillingMode::Half => "halfBilling",
        BillingMode::Weight => "weightBilling",
        BillingMode::Different => "differentBilling",
    }
}

/// Refreshes every derived field of a form.
///
/// Each active mode is calculated in activation order and then reconciled
/// against its payments. Inactive modes are untouched.
///
/// # Examples
///
/// ```
/// use yard_billing::calculation::{RecalcOptions, recalculate};
/// use yard_billing::models::BillingForm;
///
/// let form: BillingForm = serde_json::from_str(r#"{
///     "netWeight": "100",
///     "gstRate": "18",
///     "billingMethods": ["half"],
///     "halfBilling": {"billingRate": "50", "actualRate": "55", "accountWithGst": "5900"}
/// }"#).unwrap();
///
/// let recalculation = recalculate(&form, &RecalcOptions::default());
/// let half = recalculation.form.half().unwrap();
/// assert_eq!(half.totals.billing_total_amount.unwrap().to_string(), "5900.00");
/// assert_eq!(half.balance.remaining.unwrap().to_string(), "0.00");
/// ```
pub fn recalculate(form: &BillingForm, options: &RecalcOptions) -> Recalculation {
    let mut next = form.clone();
    let mut coercer = InputCoercer::new();

    let gst_rate = coercer.gst_rate("gstRate", &form.gst_rate, options.default_gst_rate);
    let net_weight = if form.is_active(BillingMode::Half) {
        coercer.number("netWeight", &form.net_weight)
    } else {
        Decimal::ZERO
    };

    let mut pass = Pass {
        options,
        coercer,
        steps: Vec::new(),
        gst_rate,
    };

    for method in next.methods_mut() {
        match method {
            BillingMethod::Half(half) => pass.half(half, net_weight),
            BillingMethod::Weight(weight) => pass.weight(weight),
            BillingMethod::Different(different) => pass.different(different),
        }
    }

    Recalculation {
        form: next,
        audit_steps: pass.steps,
        warnings: pass.coercer.into_warnings(),
    }
}
