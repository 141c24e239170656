//! Integration tests for the pricing engine HTTP API.
//!
//! Every test runs against the shipped `config/precast` reference data:
//! - Piece costing with identity adjustment, active scales and escalation
//! - Freight packing, false tonnage and rate bands
//! - Distance resolution by destination
//! - Assembly estimates
//! - Monthly index derivation
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

use pricing_engine::api::{AppState, create_router};
use pricing_engine::calculation::warnings::{
    FREIGHT_RATE_FALLBACK, MONTHLY_INDEX_MISSING, NO_ACTIVE_SCALE,
};
use pricing_engine::config::ConfigLoader;
use pricing_engine::logging;

// =============================================================================
// Test Helpers
// =============================================================================

fn create_test_state() -> AppState {
    logging::init_test();
    let config = ConfigLoader::load("./config/precast").expect("Failed to load config");
    AppState::new(config)
}

fn create_router_for_test() -> Router {
    create_router(create_test_state())
}

fn decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn field_decimal(value: &Value, pointer: &str) -> Decimal {
    let raw = value
        .pointer(pointer)
        .unwrap_or_else(|| panic!("Missing {} in {}", pointer, value));
    match raw {
        Value::String(s) => decimal(s),
        other => decimal(&other.to_string()),
    }
}

fn warning_codes(result: &Value) -> Vec<String> {
    result["audit_trace"]["warnings"]
        .as_array()
        .expect("warnings should be an array")
        .iter()
        .map(|w| w["code"].as_str().unwrap_or_default().to_string())
        .collect()
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

fn budget_piece(id: &str, weight: &str, length: &str) -> Value {
    json!({ "id": id, "weight_tons": weight, "length_m": length })
}

// =============================================================================
// Piece cost
// =============================================================================

// VIG-30 on 2025-03-01:
//   materials = 1.0 x 1.03 x 98000 + 120 x 1.05 x 950 + 2 x 12500 = 245640
//   general   = 2.5 x 150862 + 1.0 x 188850 + 0.12 x 70 x 3000   = 591205
//   base      = 836845

#[tokio::test]
async fn test_piece_cost_without_scale_is_identity() {
    let (status, result) = post_json(
        create_router_for_test(),
        "/pieces/cost",
        json!({ "piece_id": "VIG-30", "as_of": "2025-03-01" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(field_decimal(&result, "/materials_cost"), decimal("245640"));
    assert_eq!(field_decimal(&result, "/general_costs/total"), decimal("591205"));
    assert_eq!(field_decimal(&result, "/base_cost"), decimal("836845"));
    assert_eq!(field_decimal(&result, "/adjusted_cost"), decimal("836845"));
    assert_eq!(field_decimal(&result, "/final_cost"), decimal("836845"));
    assert_eq!(result["adjustment"]["source"], "identity");
    assert_eq!(result["escalation"]["status"], "not_requested");
    assert!(warning_codes(&result).contains(&NO_ACTIVE_SCALE.to_string()));
}

#[tokio::test]
async fn test_piece_cost_ignores_inactive_parameter() {
    // labor_hourly_rate 3400 is disabled; 3000 stays in force
    let (_, result) = post_json(
        create_router_for_test(),
        "/pieces/cost",
        json!({ "piece_id": "VIG-30", "as_of": "2025-03-01" }),
    )
    .await;
    assert_eq!(field_decimal(&result, "/general_costs/steel_labor"), decimal("25200"));
}

#[tokio::test]
async fn test_piece_cost_with_active_scale_and_escalation() {
    let (status, result) = post_json(
        create_router_for_test(),
        "/pieces/cost",
        json!({
            "piece_id": "VIG-30",
            "as_of": "2025-07-01",
            "base_period": "2025-01",
            "target_period": "2025-03"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["adjustment"]["scale_id"], "ESC-2025-H2");
    // 836845 x 0.95 x 1.10
    assert_eq!(field_decimal(&result, "/adjusted_cost"), decimal("874503.025"));
    assert_eq!(field_decimal(&result, "/k_factor"), decimal("1.045"));
    assert_eq!(field_decimal(&result, "/final_cost"), decimal("913855.661125"));
    assert_eq!(result["escalation"]["status"], "applied");
}

#[tokio::test]
async fn test_piece_cost_special_family_factor() {
    let (status, result) = post_json(
        create_router_for_test(),
        "/pieces/cost",
        json!({ "piece_id": "LOS-20", "as_of": "2025-07-01" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let base = field_decimal(&result, "/base_cost");
    let adjusted = field_decimal(&result, "/adjusted_cost");
    assert_eq!(field_decimal(&result, "/adjustment/special_factor"), decimal("1.03"));
    assert_eq!(adjusted, base * decimal("0.95") * decimal("1.10") * decimal("1.03"));
}

#[tokio::test]
async fn test_piece_cost_missing_target_index_keeps_adjusted_cost() {
    let (status, result) = post_json(
        create_router_for_test(),
        "/pieces/cost",
        json!({
            "piece_id": "VIG-30",
            "as_of": "2025-03-01",
            "base_period": "2025-01",
            "target_period": "2025-06"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["escalation"]["status"], "index_missing");
    assert_eq!(field_decimal(&result, "/k_factor"), Decimal::ONE);
    assert_eq!(
        field_decimal(&result, "/final_cost"),
        field_decimal(&result, "/adjusted_cost")
    );
    assert!(warning_codes(&result).contains(&MONTHLY_INDEX_MISSING.to_string()));
}

#[tokio::test]
async fn test_piece_cost_quantity_scales_total() {
    let (_, single) = post_json(
        create_router_for_test(),
        "/pieces/cost",
        json!({ "piece_id": "COL-40", "as_of": "2025-03-01" }),
    )
    .await;
    let (_, four) = post_json(
        create_router_for_test(),
        "/pieces/cost",
        json!({ "piece_id": "COL-40", "quantity": 4, "as_of": "2025-03-01" }),
    )
    .await;

    assert_eq!(
        field_decimal(&four, "/total_cost"),
        field_decimal(&single, "/total_cost") * Decimal::from(4)
    );
    assert_eq!(
        field_decimal(&four, "/unit_cost"),
        field_decimal(&single, "/unit_cost")
    );
}

#[tokio::test]
async fn test_piece_without_bom_is_formula_not_found() {
    let (status, result) = post_json(
        create_router_for_test(),
        "/pieces/cost",
        json!({ "piece_id": "MOD-ESP-01" }),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(result["code"], "FORMULA_NOT_FOUND");
}

#[tokio::test]
async fn test_unknown_piece_is_not_found() {
    let (status, result) = post_json(
        create_router_for_test(),
        "/pieces/cost",
        json!({ "piece_id": "NOPE-1" }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(result["code"], "PIECE_NOT_FOUND");
}

#[tokio::test]
async fn test_single_period_is_rejected() {
    let (status, result) = post_json(
        create_router_for_test(),
        "/pieces/cost",
        json!({ "piece_id": "VIG-30", "base_period": "2025-01" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(result["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_zero_quantity_is_rejected() {
    let (status, result) = post_json(
        create_router_for_test(),
        "/pieces/cost",
        json!({ "piece_id": "VIG-30", "quantity": 0 }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(result["details"], "field: quantity");
}

// =============================================================================
// Freight
// =============================================================================

// Santiago is 45 km away; FR-2025-A charges 95 per ton-km under 12 m.

#[tokio::test]
async fn test_freight_light_piece_billed_at_minimum() {
    let (status, result) = post_json(
        create_router_for_test(),
        "/freight",
        json!({
            "pieces": [budget_piece("P1", "5", "8")],
            "distance_km": "45",
            "as_of": "2025-03-01"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let truck = &result["trucks"][0];
    assert_eq!(truck["truck_type"], "STANDARD");
    assert_eq!(field_decimal(truck, "/real_tons"), decimal("5"));
    assert_eq!(field_decimal(truck, "/false_tons"), decimal("16"));
    assert_eq!(field_decimal(truck, "/total_tons"), decimal("21"));
    // 95 x 21 x 45
    assert_eq!(field_decimal(&result, "/totals/total_cost"), decimal("89775"));
    assert_eq!(result["rate"]["rate_id"], "FR-2025-A");
}

#[tokio::test]
async fn test_freight_two_pieces_share_a_truck() {
    let (status, result) = post_json(
        create_router_for_test(),
        "/freight",
        json!({
            "pieces": [budget_piece("P1", "15", "8"), budget_piece("P2", "10", "8")],
            "distance_km": "45",
            "as_of": "2025-03-01"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["trucks"].as_array().unwrap().len(), 1);
    let truck = &result["trucks"][0];
    assert_eq!(field_decimal(truck, "/real_tons"), decimal("25"));
    assert_eq!(field_decimal(truck, "/false_tons"), Decimal::ZERO);
    assert_eq!(field_decimal(truck, "/total_tons"), decimal("25"));
    assert!(field_decimal(&result, "/metrics/saved_by_grouping") > Decimal::ZERO);
}

#[tokio::test]
async fn test_freight_over_capacity_piece_has_no_false_tons() {
    let (status, result) = post_json(
        create_router_for_test(),
        "/freight",
        json!({
            "pieces": [budget_piece("P1", "30", "8")],
            "distance_km": "45",
            "as_of": "2025-03-01"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let truck = &result["trucks"][0];
    assert_eq!(truck["dispatch"], "OVER_CAPACITY");
    assert_eq!(field_decimal(truck, "/false_tons"), Decimal::ZERO);
    assert_eq!(field_decimal(truck, "/total_tons"), decimal("30"));
}

#[tokio::test]
async fn test_freight_resolves_destination() {
    let (status, result) = post_json(
        create_router_for_test(),
        "/freight",
        json!({
            "pieces": [budget_piece("P1", "21", "15")],
            "destination": "Talca",
            "as_of": "2025-03-01"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(field_decimal(&result, "/distance_km"), decimal("290"));
    assert_eq!(result["rate"]["rate_id"], "FR-2025-B");
    let truck = &result["trucks"][0];
    assert_eq!(truck["truck_type"], "MEDIUM");
    // Over-12 m column: 90 x 24 x 290
    assert_eq!(field_decimal(truck, "/cost"), decimal("626400"));
}

#[tokio::test]
async fn test_freight_distance_beyond_bands_falls_back() {
    let (status, result) = post_json(
        create_router_for_test(),
        "/freight",
        json!({
            "pieces": [budget_piece("P1", "5", "8")],
            "distance_km": "900",
            "as_of": "2025-03-01"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["rate"]["fallback"], true);
    assert!(warning_codes(&result).contains(&FREIGHT_RATE_FALLBACK.to_string()));
}

#[tokio::test]
async fn test_freight_bands_are_contiguous() {
    for (km, rate_id) in [("100", "FR-2025-A"), ("100.005", "FR-2025-B"), ("300.5", "FR-2025-C")] {
        let (status, result) = post_json(
            create_router_for_test(),
            "/freight",
            json!({
                "pieces": [budget_piece("P1", "5", "8")],
                "distance_km": km,
                "as_of": "2025-03-01"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(result["rate"]["rate_id"], rate_id, "distance {}", km);
        assert_eq!(result["rate"]["fallback"], false, "distance {}", km);
        assert!(!warning_codes(&result).contains(&FREIGHT_RATE_FALLBACK.to_string()));
    }
}

#[tokio::test]
async fn test_freight_individual_piece_ships_alone() {
    let (status, result) = post_json(
        create_router_for_test(),
        "/freight",
        json!({
            "pieces": [
                budget_piece("G1", "6", "8"),
                { "id": "S1", "weight_tons": "4", "length_m": "8", "special_handling": true }
            ],
            "distance_km": "45",
            "as_of": "2025-03-01"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let trucks = result["trucks"].as_array().unwrap();
    assert_eq!(trucks.len(), 2);
    assert_eq!(trucks[0]["individual_reason"], "SPECIAL_HANDLING");
    assert_eq!(trucks[0]["units"][0]["piece_id"], "S1");
    assert_eq!(trucks[1]["dispatch"], "GROUPED");
}

#[tokio::test]
async fn test_freight_unknown_destination() {
    let (status, result) = post_json(
        create_router_for_test(),
        "/freight",
        json!({
            "pieces": [budget_piece("P1", "5", "8")],
            "destination": "Arica"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(result["code"], "DISTANCE_NOT_FOUND");
}

#[tokio::test]
async fn test_freight_requires_one_distance_source() {
    let (status, result) = post_json(
        create_router_for_test(),
        "/freight",
        json!({ "pieces": [budget_piece("P1", "5", "8")] }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(result["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_freight_rejects_zero_quantity() {
    let (status, result) = post_json(
        create_router_for_test(),
        "/freight",
        json!({
            "pieces": [{ "id": "P1", "weight_tons": "5", "length_m": "8", "quantity": 0 }],
            "distance_km": "45"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(result["details"], "field: pieces[0].quantity");
}

#[tokio::test]
async fn test_freight_rejects_out_of_range_distance() {
    let (status, result) = post_json(
        create_router_for_test(),
        "/freight",
        json!({
            "pieces": [budget_piece("P1", "5", "8")],
            "distance_km": "79228162514264337593543950"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(result["code"], "VALIDATION_ERROR");
    assert_eq!(result["details"], "field: distance_km");
}

// =============================================================================
// Assembly
// =============================================================================

#[tokio::test]
async fn test_assembly_light_job() {
    let (status, result) = post_json(
        create_router_for_test(),
        "/assembly",
        json!({
            "total_tons": "60",
            "assembly_days": "3",
            "crane_days": "2",
            "destination": "Santiago",
            "as_of": "2025-03-01"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["tonnage_tier"], "LIGHT");
    // 850000 + 3 x 45000 + 2 x 60000
    assert_eq!(field_decimal(&result, "/total"), decimal("1105000"));
    assert_eq!(result["lines"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_assembly_rejects_out_of_range_days() {
    let (status, result) = post_json(
        create_router_for_test(),
        "/assembly",
        json!({
            "total_tons": "60",
            "assembly_days": "100000",
            "distance_km": "45"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(result["details"], "field: assembly_days");
}

#[tokio::test]
async fn test_assembly_medium_job_at_distance() {
    let (status, result) = post_json(
        create_router_for_test(),
        "/assembly",
        json!({ "total_tons": "150", "distance_km": "120", "as_of": "2025-03-01" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["tonnage_tier"], "MEDIUM");
    assert_eq!(field_decimal(&result, "/total"), decimal("2500000"));
}

#[tokio::test]
async fn test_assembly_rejects_zero_tons() {
    let (status, result) = post_json(
        create_router_for_test(),
        "/assembly",
        json!({ "total_tons": "0", "distance_km": "45" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(result["details"], "field: total_tons");
}

// =============================================================================
// Monthly index derivation
// =============================================================================

#[tokio::test]
async fn test_derive_index_from_latest_snapshot() {
    let (status, result) = post_json(
        create_router_for_test(),
        "/indices/derive",
        json!({
            "period": "2025-04",
            "dollar_rate": "1254",
            "labor_index": "106",
            "concrete_index": "101",
            "fuel_index": "92"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["period"], "2025-04");
    // 110 x 1254 / 1045
    assert_eq!(field_decimal(&result, "/steel_index"), decimal("132"));
    assert_eq!(field_decimal(&result, "/labor_index"), decimal("106"));
}

#[tokio::test]
async fn test_derive_index_rejects_non_positive_dollar() {
    let (status, result) = post_json(
        create_router_for_test(),
        "/indices/derive",
        json!({
            "period": "2025-04",
            "dollar_rate": "0",
            "labor_index": "106",
            "concrete_index": "101",
            "fuel_index": "92"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(result["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_derive_index_without_previous_snapshot() {
    let (status, result) = post_json(
        create_router_for_test(),
        "/indices/derive",
        json!({
            "period": "2024-12",
            "dollar_rate": "950",
            "labor_index": "100",
            "concrete_index": "100",
            "fuel_index": "100"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(result["details"], "field: period");
}

// =============================================================================
// Request errors
// =============================================================================

#[tokio::test]
async fn test_error_malformed_json() {
    let response = create_router_for_test()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/pieces/cost")
                .header("Content-Type", "application/json")
                .body(Body::from("{ not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap();
    assert_eq!(json["code"], "MALFORMED_JSON");
}

#[tokio::test]
async fn test_error_missing_piece_id() {
    let (status, result) = post_json(create_router_for_test(), "/pieces/cost", json!({})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(result["code"], "VALIDATION_ERROR");
    assert!(result["message"].as_str().unwrap().contains("piece_id"));
}
