//! HTTP API module for the yard billing engine.
//!
//! This module provides the REST endpoints for recalculating a billing
//! form, applying form patches, and reconciling payments.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{PatchRequest, ReconcileRequest};
pub use response::{ApiError, ReconcileResponse};
pub use state::AppState;
