//! Form patches: the single entry point for changing a form.
//!
//! A patch describes one edit the operator made. [`apply_patch`] produces the
//! edited form; [`apply_patches`] applies a sequence and recalculates after
//! each one, the way the form refreshes after every keystroke.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::lines::{add_line, line_method, remove_line};
use super::methods::{add_method, remove_method};
use crate::calculation::{
    ParsedInput, RecalcOptions, Recalculation, coerce_number, parse_input, recalculate,
};
use crate::error::{BillingError, BillingResult};
use crate::models::raw_input::raw_input;
use crate::models::{BillingForm, BillingMethod, BillingMode, Material};

/// An editable half billing rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HalfField {
    /// Invoice rate per MT.
    BillingRate,
    /// Transacted rate per MT.
    ActualRate,
}

/// An editable payment field, present on every mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaymentField {
    /// Account payment including GST.
    AccountWithGst,
    /// Cash payment.
    Cash,
}

/// An editable field of a line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LineField {
    /// Weight line loading.
    Loading,
    /// Material line quantity.
    Quantity,
    /// Invoice rate per MT.
    BillingRate,
    /// Transacted rate per MT.
    ActualRate,
    /// Weight line GST override; an empty value removes the override.
    GstRate,
}

impl LineField {
    fn as_str(&self) -> &'static str {
        match self {
            LineField::Loading => "loading",
            LineField::Quantity => "quantity",
            LineField::BillingRate => "billingRate",
            LineField::ActualRate => "actualRate",
            LineField::GstRate => "gstRate",
        }
    }
}

impl fmt::Display for LineField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One edit to a billing form.
///
/// Serialized with an `op` tag:
///
/// ```
/// use yard_billing::form::FormPatch;
/// use yard_billing::models::BillingMode;
///
/// let patch: FormPatch = serde_json::from_str(
///     r#"{"op": "set_line_field", "mode": "weight", "index": 0, "field": "loading", "value": 50}"#,
/// ).unwrap();
/// assert!(matches!(patch, FormPatch::SetLineField { mode: BillingMode::Weight, index: 0, .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum FormPatch {
    /// Sets the gross weight and recomputes the net weight.
    SetGrossWeight {
        /// Weight in MT, as entered.
        #[serde(default, deserialize_with = "raw_input")]
        value: String,
    },
    /// Sets the tare weight and recomputes the net weight.
    SetTareWeight {
        /// Weight in MT, as entered.
        #[serde(default, deserialize_with = "raw_input")]
        value: String,
    },
    /// Sets the net weight directly.
    SetNetWeight {
        /// Weight in MT, as entered.
        #[serde(default, deserialize_with = "raw_input")]
        value: String,
    },
    /// Sets the form GST rate.
    SetGstRate {
        /// Percentage, as entered.
        #[serde(default, deserialize_with = "raw_input")]
        value: String,
    },
    /// Sets or clears the bill date.
    SetBillDate {
        /// The new date; `null` clears it.
        #[serde(default)]
        value: Option<NaiveDate>,
    },
    /// Activates a billing mode.
    AddMethod {
        /// The mode to activate.
        mode: BillingMode,
    },
    /// Deactivates a billing mode.
    RemoveMethod {
        /// The mode to deactivate.
        mode: BillingMode,
    },
    /// Sets a half billing rate.
    SetHalfField {
        /// The rate to set.
        field: HalfField,
        /// Rate per MT, as entered.
        #[serde(default, deserialize_with = "raw_input")]
        value: String,
    },
    /// Sets a payment field of a mode.
    SetPayment {
        /// The mode whose payment changes.
        mode: BillingMode,
        /// The payment to set.
        field: PaymentField,
        /// Amount, as entered.
        #[serde(default, deserialize_with = "raw_input")]
        value: String,
    },
    /// Appends a blank line.
    AddLine {
        /// A line-based mode.
        mode: BillingMode,
    },
    /// Removes a line.
    RemoveLine {
        /// A line-based mode.
        mode: BillingMode,
        /// Position of the line.
        index: usize,
    },
    /// Sets a field of a line.
    SetLineField {
        /// A line-based mode.
        mode: BillingMode,
        /// Position of the line.
        index: usize,
        /// The field to set.
        field: LineField,
        /// New value, as entered.
        #[serde(default, deserialize_with = "raw_input")]
        value: String,
    },
    /// Changes the material of a material billing line.
    SetLineMaterial {
        /// Position of the line.
        index: usize,
        /// The new material.
        material: Material,
    },
}

/// Net weight from gross and tare, as entered text.
///
/// Returns an empty string if neither weight has been entered.
///
/// # Examples
///
/// ```
/// use yard_billing::form::net_weight;
///
/// assert_eq!(net_weight("42.5", "12.25"), "30.25");
/// assert_eq!(net_weight("42.5", ""), "42.5");
/// assert_eq!(net_weight("", ""), "");
/// ```
pub fn net_weight(gross: &str, tare: &str) -> String {
    if parse_input(gross) == ParsedInput::Empty && parse_input(tare) == ParsedInput::Empty {
        return String::new();
    }
    let net: Decimal = coerce_number(gross) - coerce_number(tare);
    net.normalize().to_string()
}

/// Applies one patch, returning the edited form.
///
/// Derived fields are left as they were; see [`apply_patches`].
///
/// # Errors
///
/// Fails if the patch addresses a mode that is not active, a line that does
/// not exist, or a field the mode's lines do not have.
pub fn apply_patch(form: &BillingForm, patch: &FormPatch) -> BillingResult<BillingForm> {
    match patch {
        FormPatch::AddMethod { mode } => return Ok(add_method(form, *mode)),
        FormPatch::RemoveMethod { mode } => return Ok(remove_method(form, *mode)),
        FormPatch::AddLine { mode } => return add_line(form, *mode),
        FormPatch::RemoveLine { mode, index } => return remove_line(form, *mode, *index),
        _ => {}
    }

    let mut next = form.clone();
    match patch {
        FormPatch::SetGrossWeight { value } => {
            next.gross_weight = value.clone();
            next.net_weight = net_weight(&next.gross_weight, &next.tare_weight);
        }
        FormPatch::SetTareWeight { value } => {
            next.tare_weight = value.clone();
            next.net_weight = net_weight(&next.gross_weight, &next.tare_weight);
        }
        FormPatch::SetNetWeight { value } => next.net_weight = value.clone(),
        FormPatch::SetGstRate { value } => next.gst_rate = value.clone(),
        FormPatch::SetBillDate { value } => next.bill_date = *value,
        FormPatch::SetHalfField { field, value } => {
            let Some(BillingMethod::Half(half)) = next.method_mut(BillingMode::Half) else {
                return Err(BillingError::MethodNotActive {
                    mode: BillingMode::Half,
                });
            };
            match field {
                HalfField::BillingRate => half.billing_rate = value.clone(),
                HalfField::ActualRate => half.actual_rate = value.clone(),
            }
        }
        FormPatch::SetPayment { mode, field, value } => {
            let method = next
                .method_mut(*mode)
                .ok_or(BillingError::MethodNotActive { mode: *mode })?;
            let (account_with_gst, cash) = match method {
                BillingMethod::Half(half) => (&mut half.account_with_gst, &mut half.cash),
                BillingMethod::Weight(weight) => (&mut weight.account_with_gst, &mut weight.cash),
                BillingMethod::Different(different) => {
                    (&mut different.account_with_gst, &mut different.cash)
                }
            };
            match field {
                PaymentField::AccountWithGst => *account_with_gst = value.clone(),
                PaymentField::Cash => *cash = value.clone(),
            }
        }
        FormPatch::SetLineField {
            mode,
            index,
            field,
            value,
        } => set_line_field(&mut next, *mode, *index, *field, value)?,
        FormPatch::SetLineMaterial { index, material } => {
            let mode = BillingMode::Different;
            if let BillingMethod::Different(different) = line_method(&mut next, mode)? {
                let len = different.lines.len();
                let line = different
                    .lines
                    .get_mut(*index)
                    .ok_or(BillingError::LineIndexOutOfRange {
                        mode,
                        index: *index,
                        len,
                    })?;
                line.name = *material;
            }
        }
        FormPatch::AddMethod { .. }
        | FormPatch::RemoveMethod { .. }
        | FormPatch::AddLine { .. }
        | FormPatch::RemoveLine { .. } => {}
    }
    Ok(next)
}

fn set_line_field(
    form: &mut BillingForm,
    mode: BillingMode,
    index: usize,
    field: LineField,
    value: &str,
) -> BillingResult<()> {
    let method = line_method(form, mode)?;
    let len = method.line_count().unwrap_or(0);
    let out_of_range = BillingError::LineIndexOutOfRange { mode, index, len };
    let unsupported = || BillingError::FieldNotSupported {
        mode,
        field: field.to_string(),
    };

    match method {
        BillingMethod::Weight(weight) => {
            let line = weight.lines.get_mut(index).ok_or(out_of_range)?;
            match field {
                LineField::Loading => line.loading = value.to_string(),
                LineField::BillingRate => line.billing_rate = value.to_string(),
                LineField::ActualRate => line.actual_rate = value.to_string(),
                LineField::GstRate if value.trim().is_empty() => line.gst_rate = None,
                LineField::GstRate => line.gst_rate = Some(value.to_string()),
                LineField::Quantity => return Err(unsupported()),
            }
        }
        BillingMethod::Different(different) => {
            let line = different.lines.get_mut(index).ok_or(out_of_range)?;
            match field {
                LineField::Quantity => line.quantity = value.to_string(),
                LineField::BillingRate => line.billing_rate = value.to_string(),
                LineField::ActualRate => line.actual_rate = value.to_string(),
                LineField::Loading | LineField::GstRate => return Err(unsupported()),
            }
        }
        BillingMethod::Half(_) => return Err(BillingError::LinesNotSupported { mode }),
    }
    Ok(())
}

/// Applies patches in order, recalculating after each one.
///
/// Warnings and audit steps come from the final recalculation, which
/// reflects every input as it now stands. With no patches the form is
/// simply recalculated.
///
/// # Examples
///
/// ```
/// use yard_billing::calculation::RecalcOptions;
/// use yard_billing::form::{FormPatch, HalfField, apply_patches};
/// use yard_billing::models::{BillingForm, BillingMode};
///
/// let patches = vec![
///     FormPatch::AddMethod { mode: BillingMode::Half },
///     FormPatch::SetNetWeight { value: "100".to_string() },
///     FormPatch::SetHalfField { field: HalfField::BillingRate, value: "50".to_string() },
///     FormPatch::SetHalfField { field: HalfField::ActualRate, value: "55".to_string() },
/// ];
///
/// let result = apply_patches(&BillingForm::new(), &patches, &RecalcOptions::default()).unwrap();
/// let totals = &result.form.half().unwrap().totals;
/// assert_eq!(totals.billing_total_amount.unwrap().to_string(), "5900.00");
/// ```
pub fn apply_patches(
    form: &BillingForm,
    patches: &[FormPatch],
    options: &RecalcOptions,
) -> BillingResult<Recalculation> {
    let mut recalculation = recalculate(form, options);

    for (position, patch) in patches.iter().enumerate() {
        debug!(position, patch = ?patch, "Applying form patch");
        let edited = apply_patch(&recalculation.form, patch)?;
        recalculation = recalculate(&edited, options);
    }

    Ok(recalculation)
}
