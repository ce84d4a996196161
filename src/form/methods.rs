//! Activation and removal of billing modes.

use crate::models::{BillingForm, BillingMethod, BillingMode};

/// Activates a billing mode with its default details.
///
/// Defaults: half billing starts with empty rates and payments, weight
/// billing with one blank line, material billing with one E-ROM line.
/// Activating a mode that is already active returns the form unchanged,
/// keeping any edits in progress.
///
/// # Examples
///
/// ```
/// use yard_billing::form::add_method;
/// use yard_billing::models::{BillingForm, BillingMode};
///
/// let form = add_method(&BillingForm::new(), BillingMode::Weight);
/// assert_eq!(form.billing_methods(), vec![BillingMode::Weight]);
/// assert_eq!(form.weight().unwrap().lines.len(), 1);
/// ```
pub fn add_method(form: &BillingForm, mode: BillingMode) -> BillingForm {
    let mut next = form.clone();
    if !next.is_active(mode) {
        next.push_method(BillingMethod::new_default(mode));
    }
    next
}

/// Deactivates a billing mode, discarding its details and derived values.
///
/// Removing a mode that is not active returns the form unchanged.
pub fn remove_method(form: &BillingForm, mode: BillingMode) -> BillingForm {
    let mut next = form.clone();
    next.take_method(mode);
    next
}
