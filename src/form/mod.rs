//! State updates for a billing form.
//!
//! Every function here takes the current form by reference and returns a new
//! one; the input is never modified. Derived fields are not touched here;
//! [`apply_patches`] runs [`crate::calculation::recalculate`] after each
//! change.

mod lines;
mod methods;
mod patch;

pub use lines::{add_line, remove_line};
pub use methods::{add_method, remove_method};
pub use patch::{FormPatch, HalfField, LineField, PaymentField, apply_patch, apply_patches, net_weight};
