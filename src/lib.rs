//! Billing engine for coal-yard weighbridge operations
//!
//! This crate recalculates a vehicle's billing form across three billing
//! modes (half, per-line weight and per-material), derives GST, TCS and cash
//! components, and reconciles what the customer is paying against the bill.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod form;
pub mod formatting;
pub mod models;
