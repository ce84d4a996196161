//! Adding and removing line items in weight and material billing.

use crate::error::{BillingError, BillingResult};
use crate::models::{BillingForm, BillingMethod, BillingMode, Material, MaterialLine, WeightLine};

/// Appends a blank line to a line-based mode.
///
/// Weight billing gets a line of empty strings; material billing gets an
/// E-ROM line with empty figures.
///
/// # Errors
///
/// Returns `LinesNotSupported` for half billing and `MethodNotActive` if the
/// mode is not active.
///
/// # Examples
///
/// ```
/// use yard_billing::form::{add_line, add_method};
/// use yard_billing::models::{BillingForm, BillingMode};
///
/// let form = add_method(&BillingForm::new(), BillingMode::Weight);
/// let form = add_line(&form, BillingMode::Weight).unwrap();
/// assert_eq!(form.weight().unwrap().lines.len(), 2);
/// ```
pub fn add_line(form: &BillingForm, mode: BillingMode) -> BillingResult<BillingForm> {
    let mut next = form.clone();
    match line_method(&mut next, mode)? {
        BillingMethod::Weight(weight) => weight.lines.push(WeightLine::default()),
        BillingMethod::Different(different) => {
            different.lines.push(MaterialLine::new(Material::ERom, "", "", ""))
        }
        BillingMethod::Half(_) => return Err(BillingError::LinesNotSupported { mode }),
    }
    Ok(next)
}

/// Removes the line at `index`.
///
/// A mode always keeps at least one line: removing the only remaining line
/// returns the form unchanged.
///
/// # Errors
///
/// Returns `LinesNotSupported` for half billing, `MethodNotActive` if the
/// mode is not active, and `LineIndexOutOfRange` if there is no line at
/// `index`.
pub fn remove_line(form: &BillingForm, mode: BillingMode, index: usize) -> BillingResult<BillingForm> {
    let mut next = form.clone();
    let method = line_method(&mut next, mode)?;

    let len = method.line_count().unwrap_or(0);
    if index >= len {
        return Err(BillingError::LineIndexOutOfRange { mode, index, len });
    }
    if len == 1 {
        return Ok(next);
    }

    match method {
        BillingMethod::Weight(weight) => {
            weight.lines.remove(index);
        }
        BillingMethod::Different(different) => {
            different.lines.remove(index);
        }
        BillingMethod::Half(_) => return Err(BillingError::LinesNotSupported { mode }),
    }
    Ok(next)
}

/// Looks up an active line-based method for mutation.
pub(super) fn line_method(form: &mut BillingForm, mode: BillingMode) -> BillingResult<&mut BillingMethod> {
    if !mode.has_lines() {
        return Err(BillingError::LinesNotSupported { mode });
    }
    form.method_mut(mode)
        .ok_or(BillingError::MethodNotActive { mode })
}
