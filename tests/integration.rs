//! Integration tests for the yard billing engine.
//!
//! This test suite covers the billing scenarios end to end:
//! - Half billing totals, display strings and reconciliation
//! - The net weight guard under both policies
//! - Weight lines, including zero-loading lines and per-line GST
//! - Material lines and the write-back policy
//! - Mode activation and removal through patches
//! - Stand-alone reconciliation
//! - Error cases

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::str::FromStr;
use tower::ServiceExt;

use yard_billing::api::{AppState, create_router};
use yard_billing::calculation::{GuardPolicy, RecalcOptions};
use yard_billing::config::ConfigLoader;
use yard_billing::form::{FormPatch, HalfField, apply_patches};
use yard_billing::models::{BillingForm, BillingMode};

// =============================================================================
// Test Helpers
// =============================================================================

fn create_test_state() -> AppState {
    let config = ConfigLoader::load("./config/yard").expect("Failed to load config");
    AppState::new(config)
}

fn create_router_for_test() -> Router {
    create_router(create_test_state())
}

fn decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

async fn post_json(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

async fn post_calculate(body: Value) -> (StatusCode, Value) {
    post_json(create_router_for_test(), "/billing/calculate", body).await
}

async fn post_patch(form: Value, patches: Value) -> (StatusCode, Value) {
    post_json(
        create_router_for_test(),
        "/billing/patch",
        json!({ "form": form, "patches": patches }),
    )
    .await
}

fn half_form(net_weight: &str, billing_rate: &str, actual_rate: &str) -> Value {
    json!({
        "netWeight": net_weight,
        "gstRate": "18",
        "billDate": "2024-08-01",
        "billingMethods": ["half"],
        "halfBilling": {"billingRate": billing_rate, "actualRate": actual_rate}
    })
}

fn assert_amount(value: &Value, expected: &str) {
    let actual = value
        .as_str()
        .unwrap_or_else(|| panic!("Expected amount string, got {}", value));
    assert_eq!(
        decimal(actual),
        decimal(expected),
        "Expected {}, got {}",
        expected,
        actual
    );
}

fn step_ids(result: &Value) -> Vec<String> {
    result["audit_trace"]["steps"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["rule_id"].as_str().unwrap().to_string())
        .collect()
}

// =============================================================================
// Half Billing
// =============================================================================

#[tokio::test]
async fn test_half_billing_totals() {
    let (status, result) = post_calculate(half_form("100", "50", "55")).await;

    assert_eq!(status, StatusCode::OK);
    let half = &result["form"]["halfBilling"];
    assert_eq!(half["billingTotalAmount"], "5900.00");
    assert_eq!(half["cashAmount"], "500.00");
    assert_eq!(half["tax"], "959.00");
}

#[tokio::test]
async fn test_half_billing_display_strings() {
    let (status, result) = post_calculate(half_form("100", "50", "55")).await;

    assert_eq!(status, StatusCode::OK);
    let display = &result["displays"][0];
    assert_eq!(display["mode"], "half");
    assert_eq!(display["label"], "Half Billing");
    assert_eq!(display["billing_total_amount"], "₹5,900.00");
    assert_eq!(display["cash_amount"], "₹500.00");
    assert_eq!(display["tax"], "₹959.00");
}

#[tokio::test]
async fn test_half_billing_reconciles_against_pre_tax_base() {
    let mut form = half_form("100", "50", "55");
    form["halfBilling"]["accountWithGst"] = json!("590");
    form["halfBilling"]["cash"] = json!("200");

    let (status, result) = post_calculate(form).await;

    assert_eq!(status, StatusCode::OK);
    let half = &result["form"]["halfBilling"];
    assert_eq!(half["totalAmount"], "5000.00");
    assert_eq!(half["totalPaying"], "700.00");
    assert_eq!(half["remaining"], "4300.00");
    assert_eq!(result["displays"][0]["balance"], "Remaining to Pay: ₹4,300.00");
}

#[tokio::test]
async fn test_actual_rate_below_billing_rate_gives_negative_cash() {
    let (status, result) = post_calculate(half_form("10", "60", "50")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["form"]["halfBilling"]["cashAmount"], "-100.00");
    assert_eq!(result["displays"][0]["cash_amount"], "-₹100.00");
}

#[tokio::test]
async fn test_zero_net_weight_keeps_previous_result() {
    let (status, result) = post_patch(
        half_form("100", "50", "55"),
        json!([{"op": "set_net_weight", "value": "0"}]),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["form"]["netWeight"], "0");
    assert_eq!(result["form"]["halfBilling"]["billingTotalAmount"], "5900.00");
}

#[test]
fn test_zero_net_weight_clears_result_under_clear_policy() {
    let form: BillingForm = serde_json::from_value(half_form("100", "50", "55")).unwrap();
    let options = RecalcOptions {
        guard_policy: GuardPolicy::Clear,
        ..RecalcOptions::default()
    };
    let patches = vec![FormPatch::SetNetWeight {
        value: "0".to_string(),
    }];

    let recalculation = apply_patches(&form, &patches, &options).unwrap();
    let half = recalculation.form.half().unwrap();
    assert!(half.totals.is_empty());
    assert!(half.balance.is_empty());
}

#[test]
fn test_half_rate_patches_through_library() {
    let form: BillingForm = serde_json::from_value(half_form("100", "", "")).unwrap();
    let patches = vec![
        FormPatch::SetHalfField {
            field: HalfField::BillingRate,
            value: "50".to_string(),
        },
        FormPatch::SetHalfField {
            field: HalfField::ActualRate,
            value: "55".to_string(),
        },
    ];

    let recalculation = apply_patches(&form, &patches, &RecalcOptions::default()).unwrap();
    let half = recalculation.form.half().unwrap();
    assert_eq!(half.totals.billing_total_amount, Some(decimal("5900.00")));
    assert_eq!(half.totals.tax, Some(decimal("959.00")));
}

// =============================================================================
// Weight Billing
// =============================================================================

#[tokio::test]
async fn test_weight_lines_skip_zero_loading() {
    let form = json!({
        "gstRate": "18",
        "billDate": "2024-08-01",
        "billingMethods": ["weight"],
        "weightBilling": {
            "lines": [
                {"loading": "50", "billingRate": "40", "actualRate": "45"},
                {"loading": "0", "billingRate": "999", "actualRate": "999"},
                {"loading": "30", "billingRate": "40", "actualRate": "42"}
            ]
        }
    });

    let (status, result) = post_calculate(form).await;

    assert_eq!(status, StatusCode::OK);
    let weight = &result["form"]["weightBilling"];
    assert_eq!(weight["billingTotalAmount"], "3776.00");
    assert_eq!(weight["cashAmount"], "310.00");
    assert_amount(&weight["tax"], "613.76");
}

#[tokio::test]
async fn test_weight_line_gst_override() {
    let form = json!({
        "gstRate": "18",
        "billDate": "2024-08-01",
        "billingMethods": ["weight"],
        "weightBilling": {
            "lines": [
                {"loading": "10", "billingRate": "100", "actualRate": "100", "gstRate": "5"}
            ]
        }
    });

    let (status, result) = post_calculate(form).await;

    assert_eq!(status, StatusCode::OK);
    // 1000 base + 50 GST, TCS 10.50
    assert_eq!(result["form"]["weightBilling"]["billingTotalAmount"], "1050.00");
    assert_eq!(result["form"]["weightBilling"]["tax"], "60.50");
}

#[tokio::test]
async fn test_weight_totals_beyond_decimal_range_are_not_calculated() {
    // Kept compact to stay under the default body limit.
    let line = json!({"loading": 1e12, "billingRate": 1e12, "gstRate": 100});
    let form = json!({
        "billDate": "2024-08-01",
        "billingMethods": ["weight"],
        "weightBilling": {"lines": vec![line; 40_000]}
    });

    let (status, result) = post_calculate(form).await;

    assert_eq!(status, StatusCode::OK);
    let weight = &result["form"]["weightBilling"];
    assert!(weight.get("billingTotalAmount").is_none());
    assert!(weight.get("remaining").is_none());
    assert_eq!(result["displays"][0]["billing_total_amount"], "—");
    assert_eq!(result["displays"][0]["balance"], "—");

    let warnings = result["audit_trace"]["warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0]["code"], "AMOUNT_OUT_OF_RANGE");
}

#[tokio::test]
async fn test_fresh_weight_mode_shows_zero_totals() {
    let (status, result) = post_patch(
        json!({"billDate": "2024-08-01"}),
        json!([{"op": "add_method", "mode": "weight"}]),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let weight = &result["form"]["weightBilling"];
    assert_eq!(weight["lines"].as_array().unwrap().len(), 1);
    assert_eq!(weight["billingTotalAmount"], "0.00");
    assert_eq!(result["displays"][0]["balance"], "Balanced");
}

#[tokio::test]
async fn test_weight_line_patches() {
    let (status, result) = post_patch(
        json!({"gstRate": "18", "billDate": "2024-08-01"}),
        json!([
            {"op": "add_method", "mode": "weight"},
            {"op": "set_line_field", "mode": "weight", "index": 0, "field": "loading", "value": "50"},
            {"op": "set_line_field", "mode": "weight", "index": 0, "field": "billingRate", "value": "40"},
            {"op": "set_line_field", "mode": "weight", "index": 0, "field": "actualRate", "value": "45"},
            {"op": "add_line", "mode": "weight"},
            {"op": "set_line_field", "mode": "weight", "index": 1, "field": "loading", "value": "30"},
            {"op": "set_line_field", "mode": "weight", "index": 1, "field": "billingRate", "value": "40"},
            {"op": "set_line_field", "mode": "weight", "index": 1, "field": "actualRate", "value": "42"}
        ]),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let weight = &result["form"]["weightBilling"];
    assert_eq!(weight["lines"].as_array().unwrap().len(), 2);
    assert_eq!(weight["billingTotalAmount"], "3776.00");
    assert_eq!(weight["cashAmount"], "310.00");
}

#[tokio::test]
async fn test_removing_only_line_is_a_no_op() {
    let (status, result) = post_patch(
        json!({"billDate": "2024-08-01"}),
        json!([
            {"op": "add_method", "mode": "weight"},
            {"op": "remove_line", "mode": "weight", "index": 0}
        ]),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["form"]["weightBilling"]["lines"].as_array().unwrap().len(), 1);
}

// =============================================================================
// Material Billing
// =============================================================================

#[tokio::test]
async fn test_material_billing_runs_without_write_back() {
    let form = json!({
        "gstRate": "5",
        "billDate": "2024-08-01",
        "billingMethods": ["different"],
        "differentBilling": {
            "lines": [
                {"name": "E-ROM", "quantity": "20", "billingRate": "100", "actualRate": "110"},
                {"name": "F-STEAM", "quantity": "10", "billingRate": "200", "actualRate": "200"}
            ]
        }
    });

    let (status, result) = post_calculate(form).await;

    assert_eq!(status, StatusCode::OK);
    let different = &result["form"]["differentBilling"];
    assert!(different.get("billingTotalAmount").is_none());
    // Pre-tax basis: 2000 + 2000
    assert_eq!(different["totalAmount"], "4000.00");
    assert!(step_ids(&result).contains(&"material_billing".to_string()));
}

#[tokio::test]
async fn test_unknown_material_is_rejected() {
    let form = json!({
        "billingMethods": ["different"],
        "differentBilling": {
            "lines": [{"name": "C-SLACK", "quantity": "1", "billingRate": "1", "actualRate": "1"}]
        }
    });

    let (status, result) = post_calculate(form).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(result["code"], "VALIDATION_ERROR");
}

// =============================================================================
// Mode Activation
// =============================================================================

#[tokio::test]
async fn test_add_method_twice_is_a_no_op() {
    let (status, result) = post_patch(
        half_form("100", "50", "55"),
        json!([{"op": "add_method", "mode": "half"}]),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["form"]["billingMethods"], json!(["half"]));
    assert_eq!(result["form"]["halfBilling"]["billingRate"], "50");
}

#[tokio::test]
async fn test_removing_populated_mode_deletes_object_and_tag() {
    let (status, result) = post_patch(
        half_form("100", "50", "55"),
        json!([{"op": "remove_method", "mode": "half"}]),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["form"]["billingMethods"], json!([]));
    assert!(result["form"].get("halfBilling").is_none());
    assert!(result["displays"].as_array().unwrap().is_empty());
}

#[test]
fn test_remove_then_add_starts_fresh() {
    let form: BillingForm = serde_json::from_value(half_form("100", "50", "55")).unwrap();
    let patches = vec![
        FormPatch::RemoveMethod {
            mode: BillingMode::Half,
        },
        FormPatch::AddMethod {
            mode: BillingMode::Half,
        },
    ];

    let recalculation = apply_patches(&form, &patches, &RecalcOptions::default()).unwrap();
    let half = recalculation.form.half().unwrap();
    assert_eq!(half.billing_rate, "");
    assert!(half.totals.is_empty());
}

#[tokio::test]
async fn test_all_modes_side_by_side() {
    let form = json!({
        "netWeight": "100",
        "gstRate": "18",
        "billDate": "2024-08-01",
        "billingMethods": ["weight", "half"],
        "halfBilling": {"billingRate": "50", "actualRate": "55"},
        "weightBilling": {
            "lines": [{"loading": "50", "billingRate": "40", "actualRate": "45"}]
        }
    });

    let (status, result) = post_calculate(form).await;

    assert_eq!(status, StatusCode::OK);
    let displays = result["displays"].as_array().unwrap();
    assert_eq!(displays.len(), 2);
    assert_eq!(displays[0]["mode"], "weight");
    assert_eq!(displays[1]["mode"], "half");
    assert_eq!(result["form"]["halfBilling"]["billingTotalAmount"], "5900.00");
    assert_eq!(result["form"]["weightBilling"]["billingTotalAmount"], "2360.00");
}

// =============================================================================
// Reconciliation
// =============================================================================

#[tokio::test]
async fn test_reconcile_remaining_to_pay() {
    let (status, result) = post_json(
        create_router_for_test(),
        "/billing/reconcile",
        json!({"calculatedAmount": "1000", "accountWithGst": "590", "cash": "200", "gstRate": "18"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["accountBase"], "500.00");
    assert_eq!(result["totalPaying"], "700.00");
    assert_eq!(result["remaining"], "300.00");
    assert_eq!(result["status"], "Remaining to Pay: ₹300.00");
}

#[tokio::test]
async fn test_reconcile_excess_advance() {
    let (status, result) = post_json(
        create_router_for_test(),
        "/billing/reconcile",
        json!({"calculatedAmount": "1000", "accountWithGst": "1180", "cash": "200", "gstRate": "18"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["remaining"], "-200.00");
    assert_eq!(result["status"], "Excess/Advance: ₹200.00");
}

#[tokio::test]
async fn test_reconcile_empty_inputs_never_show_nan() {
    let (status, result) = post_json(create_router_for_test(), "/billing/reconcile", json!({})).await;

    assert_eq!(status, StatusCode::OK);
    assert!(!result.to_string().contains("NaN"));
    assert_eq!(result["status"], "Balanced");
}

#[tokio::test]
async fn test_reconcile_invalid_gst_falls_back_with_warning() {
    let (status, result) = post_json(
        create_router_for_test(),
        "/billing/reconcile",
        json!({"calculatedAmount": "1000", "accountWithGst": "590", "cash": "0", "gstRate": "eighteen"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["accountBase"], "500.00");
    assert_eq!(result["warnings"][0]["code"], "INVALID_GST_RATE");
}

// =============================================================================
// Warnings and Audit Trace
// =============================================================================

#[tokio::test]
async fn test_non_numeric_input_is_zeroed_with_warning() {
    let (status, result) = post_calculate(half_form("100", "5O", "55")).await;

    assert_eq!(status, StatusCode::OK);
    let warnings = result["audit_trace"]["warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0]["code"], "NON_NUMERIC_INPUT");
    assert!(warnings[0]["message"].as_str().unwrap().contains("halfBilling.billingRate"));
}

#[tokio::test]
async fn test_result_contains_all_required_fields() {
    let (status, result) = post_calculate(half_form("100", "50", "55")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(result["calculation_id"].is_string());
    assert!(result["timestamp"].is_string());
    assert!(result["engine_version"].is_string());
    assert!(result["displays"].is_array());
    assert!(result["audit_trace"]["steps"].is_array());
    assert!(result["audit_trace"]["duration_us"].is_u64());

    let ids = step_ids(&result);
    assert!(ids.contains(&"half_billing".to_string()));
    assert!(ids.contains(&"half_reconciliation".to_string()));
}

// =============================================================================
// Error Cases
// =============================================================================

#[tokio::test]
async fn test_unknown_billing_mode_returns_400() {
    let (status, result) = post_calculate(json!({"billingMethods": ["quarter"]})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(result["code"], "VALIDATION_ERROR");
    assert!(result["message"].as_str().unwrap().contains("quarter"));
}

#[tokio::test]
async fn test_details_without_active_mode_returns_400() {
    let (status, result) = post_calculate(json!({
        "billingMethods": [],
        "halfBilling": {"billingRate": "50"}
    }))
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(result["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_line_index_out_of_range_returns_400() {
    let (status, result) = post_patch(
        json!({"billDate": "2024-08-01"}),
        json!([
            {"op": "add_method", "mode": "weight"},
            {"op": "set_line_field", "mode": "weight", "index": 4, "field": "loading", "value": "1"}
        ]),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(result["code"], "LINE_INDEX_OUT_OF_RANGE");
}

#[tokio::test]
async fn test_lines_on_half_billing_returns_400() {
    let (status, result) = post_patch(
        half_form("100", "50", "55"),
        json!([{"op": "add_line", "mode": "half"}]),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(result["code"], "LINES_NOT_SUPPORTED");
}

#[tokio::test]
async fn test_missing_content_type_returns_400() {
    let response = create_router_for_test()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/billing/calculate")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap();
    assert_eq!(json["code"], "MISSING_CONTENT_TYPE");
}
