//! HTTP request handlers for the yard billing API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{InputCoercer, calculate_form, reconcile};
use crate::error::BillingError;
use crate::form::apply_patches;
use crate::formatting::round_currency;
use crate::models::BillingForm;

use super::request::{PatchRequest, ReconcileRequest};
use super::response::{ApiError, ApiErrorResponse, ReconcileResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/billing/calculate", post(calculate_handler))
        .route("/billing/patch", post(patch_handler))
        .route("/billing/reconcile", post(reconcile_handler))
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

/// Maps a body rejection to a 400 response, logging it.
fn rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // The body text carries serde's message, including form validation.
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            ApiError::validation_error(body_text)
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    json_response(StatusCode::BAD_REQUEST, error)
}

fn error_response(correlation_id: Uuid, err: BillingError) -> Response {
    warn!(
        correlation_id = %correlation_id,
        error = %err,
        "Billing request failed"
    );
    ApiErrorResponse::from(err).into_response()
}

/// Handler for POST /billing/calculate.
///
/// Recalculates every derived field of the submitted form.
async fn calculate_handler(
    State(state): State<AppState>,
    payload: Result<Json<BillingForm>, JsonRejection>,
) -> Response {
    // Generate correlation ID for request tracking
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing calculation request");

    let form = match payload {
        Ok(Json(form)) => form,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let options = match state.recalc_options(form.bill_date) {
        Ok(options) => options,
        Err(err) => return error_response(correlation_id, err),
    };

    let result = calculate_form(&form, &options);
    info!(
        correlation_id = %correlation_id,
        modes = result.displays.len(),
        warnings = result.audit_trace.warnings.len(),
        duration_us = result.audit_trace.duration_us,
        "Calculation completed successfully"
    );
    json_response(StatusCode::OK, result)
}

/// Handler for POST /billing/patch.
///
/// Applies the patches in order, recalculating after each one.
async fn patch_handler(
    State(state): State<AppState>,
    payload: Result<Json<PatchRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing patch request");

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    // Rates follow the bill date as it stands after the patches; the date
    // rarely changes, so the incoming form's date is used.
    let options = match state.recalc_options(request.form.bill_date) {
        Ok(options) => options,
        Err(err) => return error_response(correlation_id, err),
    };

    let start_time = Instant::now();
    match apply_patches(&request.form, &request.patches, &options) {
        Ok(recalculation) => {
            let duration_us = start_time.elapsed().as_micros() as u64;
            let result = recalculation.into_result(duration_us);
            info!(
                correlation_id = %correlation_id,
                patches = request.patches.len(),
                modes = result.displays.len(),
                warnings = result.audit_trace.warnings.len(),
                duration_us,
                "Patches applied successfully"
            );
            json_response(StatusCode::OK, result)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /billing/reconcile.
///
/// Reconciles a payment split against an amount, without a form.
async fn reconcile_handler(
    State(state): State<AppState>,
    payload: Result<Json<ReconcileRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing reconciliation request");

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let options = match state.recalc_options(None) {
        Ok(options) => options,
        Err(err) => return error_response(correlation_id, err),
    };

    let mut coercer = InputCoercer::new();
    let calculated_amount = coercer.number("calculatedAmount", &request.calculated_amount);
    let account_with_gst = coercer.number("accountWithGst", &request.account_with_gst);
    let cash = coercer.number("cash", &request.cash);
    let gst_rate = coercer.line_gst_rate(
        "gstRate",
        request.gst_rate.as_deref(),
        options.default_gst_rate,
    );

    let reconciliation = reconcile(calculated_amount, account_with_gst, cash, gst_rate);
    let status = reconciliation.status().to_string();
    info!(
        correlation_id = %correlation_id,
        status = %status,
        "Reconciliation completed successfully"
    );

    json_response(
        StatusCode::OK,
        ReconcileResponse {
            calculated_amount: round_currency(calculated_amount),
            account_base: reconciliation.account_base.map(round_currency),
            total_paying: reconciliation.total_paying.map(round_currency),
            remaining: reconciliation.remaining.map(round_currency),
            status,
            warnings: coercer.into_warnings(),
        },
    )
}
