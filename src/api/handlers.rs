//! HTTP request handlers for the pricing engine API.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{
    calculate_assembly, calculate_freight, calculate_piece_cost, derive_monthly_index,
};
use crate::config::PricingConfig;
use crate::distance::resolve_distance;
use crate::error::{EngineError, EngineResult};
use crate::models::MonthlyIndex;

use super::request::{
    AssemblyRequest, DeliverySite, DeriveIndexRequest, DistanceSource, FreightRequest,
    PieceCostRequest,
};
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/pieces/cost", post(piece_cost_handler))
        .route("/freight", post(freight_handler))
        .route("/assembly", post(assembly_handler))
        .route("/indices/derive", post(derive_index_handler))
        .with_state(state)
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn json_ok<T: Serialize>(body: T) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // The body text carries serde's detailed message
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::new("VALIDATION_ERROR", body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
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
    (
        StatusCode::BAD_REQUEST,
        [(header::CONTENT_TYPE, "application/json")],
        Json(error),
    )
        .into_response()
}

fn failure_response(correlation_id: Uuid, err: EngineError) -> Response {
    warn!(
        correlation_id = %correlation_id,
        error = %err,
        "Calculation failed"
    );
    ApiErrorResponse::from(err).into_response()
}

/// Resolves a delivery site to a distance in km.
async fn resolve_site(state: &AppState, origin: &str, site: &DeliverySite) -> EngineResult<Decimal> {
    match site.source()? {
        DistanceSource::Explicit(km) => Ok(km),
        DistanceSource::Destination(destination) => {
            resolve_distance(
                state.distances(),
                origin,
                &destination,
                state.distance_timeout(),
            )
            .await
        }
    }
}

/// Handler for POST /pieces/cost.
async fn piece_cost_handler(
    State(state): State<AppState>,
    payload: Result<Json<PieceCostRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing piece cost request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    match calculate_piece_cost(
        state.config().config(),
        &request.piece_id,
        request.quantity,
        request.base_period,
        request.target_period,
        request.as_of.unwrap_or_else(today),
    ) {
        Ok(result) => {
            info!(
                correlation_id = %correlation_id,
                piece_id = %result.piece_id,
                quantity = result.quantity,
                total_cost = %result.total_cost,
                warnings = result.audit_trace.warnings.len(),
                "Piece cost completed"
            );
            json_ok(result)
        }
        Err(err) => failure_response(correlation_id, err),
    }
}

/// Handler for POST /freight.
async fn freight_handler(
    State(state): State<AppState>,
    payload: Result<Json<FreightRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing freight request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let origin = request
        .origin
        .clone()
        .unwrap_or_else(|| state.config().plant().origin.clone());

    let distance_km = match resolve_site(&state, &origin, &request.site).await {
        Ok(km) => km,
        Err(err) => return failure_response(correlation_id, err),
    };

    match calculate_freight(
        state.config().config(),
        &request.pieces,
        &origin,
        distance_km,
        request.as_of.unwrap_or_else(today),
    ) {
        Ok(result) => {
            info!(
                correlation_id = %correlation_id,
                origin = %result.origin,
                distance_km = %result.distance_km,
                trucks = result.metrics.trucks_used,
                total_cost = %result.totals.total_cost,
                "Freight completed"
            );
            json_ok(result)
        }
        Err(err) => failure_response(correlation_id, err),
    }
}

/// Handler for POST /assembly.
async fn assembly_handler(
    State(state): State<AppState>,
    payload: Result<Json<AssemblyRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing assembly request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let origin = request
        .origin
        .clone()
        .unwrap_or_else(|| state.config().plant().origin.clone());

    let distance_km = match resolve_site(&state, &origin, &request.site).await {
        Ok(km) => km,
        Err(err) => return failure_response(correlation_id, err),
    };

    match calculate_assembly(
        state.config().config(),
        distance_km,
        request.total_tons,
        request.assembly_days,
        request.crane_days,
        request.as_of.unwrap_or_else(today),
    ) {
        Ok(result) => {
            info!(
                correlation_id = %correlation_id,
                tier = ?result.tonnage_tier,
                total = %result.total,
                "Assembly completed"
            );
            json_ok(result)
        }
        Err(err) => failure_response(correlation_id, err),
    }
}

fn derive_index(config: &PricingConfig, request: &DeriveIndexRequest) -> EngineResult<MonthlyIndex> {
    let indices = config.monthly_indices();
    let previous = match request.previous_period {
        Some(period) => indices.get(&period).ok_or_else(|| {
            EngineError::invalid_input(
                "previous_period",
                format!("no monthly index loaded for {}", period),
            )
        })?,
        None => indices
            .range(..request.period)
            .next_back()
            .map(|(_, index)| index)
            .ok_or_else(|| {
                EngineError::invalid_input(
                    "period",
                    format!("no monthly index loaded before {}", request.period),
                )
            })?,
    };

    derive_monthly_index(
        previous,
        request.period,
        request.dollar_rate,
        request.labor_index,
        request.concrete_index,
        request.fuel_index,
    )
}

/// Handler for POST /indices/derive.
///
/// Returns the derived snapshot without storing it.
async fn derive_index_handler(
    State(state): State<AppState>,
    payload: Result<Json<DeriveIndexRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing index derivation request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    match derive_index(state.config().config(), &request) {
        Ok(index) => {
            info!(
                correlation_id = %correlation_id,
                period = %index.period,
                steel_index = %index.steel_index,
                "Monthly index derived"
            );
            json_ok(index)
        }
        Err(err) => failure_response(correlation_id, err),
    }
}
