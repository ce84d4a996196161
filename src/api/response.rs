//! Response types for the yard billing API.
//!
//! This module defines the reconciliation response, the error response
//! structures, and the mapping from [`BillingError`] to HTTP errors.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::BillingError;
use crate::models::AuditWarning;

/// Response body for the `/billing/reconcile` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileResponse {
    /// The amount payments were measured against.
    pub calculated_amount: Decimal,
    /// Account payment with GST stripped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_base: Option<Decimal>,
    /// Account base plus cash.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_paying: Option<Decimal>,
    /// Calculated amount minus total paying.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<Decimal>,
    /// Balance classification, e.g. `Remaining to Pay: ₹300.00`.
    pub status: String,
    /// Inputs that had to be coerced.
    pub warnings: Vec<AuditWarning>,
}

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<BillingError> for ApiErrorResponse {
    fn from(error: BillingError) -> Self {
        let message = error.to_string();
        match error {
            BillingError::ConfigNotFound { .. }
            | BillingError::ConfigParseError { .. }
            | BillingError::InvalidConfig { .. } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
            },
            BillingError::TaxRatesNotFound { date } => {
                ApiErrorResponse::bad_request(ApiError::with_details(
                    "TAX_RATES_NOT_FOUND",
                    message,
                    format!("No GST/TCS rates are configured on or before {}", date),
                ))
            }
            BillingError::UnknownBillingMode { .. } => {
                ApiErrorResponse::bad_request(ApiError::new("UNKNOWN_BILLING_MODE", message))
            }
            BillingError::UnknownMaterial { .. } => {
                ApiErrorResponse::bad_request(ApiError::new("UNKNOWN_MATERIAL", message))
            }
            BillingError::InconsistentMethod { .. } => {
                ApiErrorResponse::bad_request(ApiError::validation_error(message))
            }
            BillingError::MethodNotActive { mode } => {
                ApiErrorResponse::bad_request(ApiError::with_details(
                    "METHOD_NOT_ACTIVE",
                    message,
                    format!("Add the '{}' method before editing it", mode),
                ))
            }
            BillingError::LinesNotSupported { .. } => {
                ApiErrorResponse::bad_request(ApiError::new("LINES_NOT_SUPPORTED", message))
            }
            BillingError::FieldNotSupported { .. } => {
                ApiErrorResponse::bad_request(ApiError::new("FIELD_NOT_SUPPORTED", message))
            }
            BillingError::LineIndexOutOfRange { .. } => {
                ApiErrorResponse::bad_request(ApiError::new("LINE_INDEX_OUT_OF_RANGE", message))
            }
        }
    }
}
