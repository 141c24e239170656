//! Piece cost: the three-layer calculation for one piece and quantity.
//!
//! 1. Base cost: materials from the BOM plus general costs.
//! 2. Adjustment: the active discount/markup scale.
//! 3. Escalation: the polynomial formula between two monthly indices.

use std::time::Instant;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{AuditTrace, CostBreakdown, Period};
use crate::repository::ReferenceData;

use super::adjustment::apply_adjustment;
use super::escalation::apply_escalation;
use super::material_formula::calculate_materials_cost;
use super::overhead::calculate_general_costs;

/// Calculates the full cost breakdown of `quantity` pieces.
///
/// # Arguments
///
/// * `reference` - Reference data snapshot
/// * `piece_id` - Catalog piece identifier
/// * `quantity` - Number of pieces, at least 1
/// * `base_period` - Period the cost is computed in (escalation base)
/// * `target_period` - Period to escalate to
/// * `as_of` - Date cost parameters and scales are read as of
///
/// # Errors
///
/// - [`EngineError::InvalidInput`] if `quantity` is 0, the family's
///   dimensions are invalid, or only one escalation period is given
/// - [`EngineError::PieceNotFound`] if the piece is not in the catalog
/// - [`EngineError::FormulaNotFound`] if the piece has no BOM lines
/// - [`EngineError::MaterialNotFound`] if a BOM material is unknown
/// - [`EngineError::InvalidBomLine`] if a BOM line is invalid
///
/// Configuration gaps (defaulted parameters, no active scale, missing index)
/// are recorded as warnings in the audit trace instead.
///
/// # Example
///
/// ```no_run
/// use pricing_engine::calculation::calculate_piece_cost;
/// use pricing_engine::config::ConfigLoader;
/// use chrono::NaiveDate;
///
/// let loader = ConfigLoader::load("./config/precast")?;
/// let as_of = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
/// let breakdown = calculate_piece_cost(loader.config(), "VIG-30", 4, None, None, as_of)?;
/// println!("Unit cost: {}", breakdown.unit_cost);
/// # Ok::<(), pricing_engine::error::EngineError>(())
/// ```
pub fn calculate_piece_cost<R>(
    reference: &R,
    piece_id: &str,
    quantity: u32,
    base_period: Option<Period>,
    target_period: Option<Period>,
    as_of: NaiveDate,
) -> EngineResult<CostBreakdown>
where
    R: ReferenceData + ?Sized,
{
    let start_time = Instant::now();

    if quantity == 0 {
        return Err(EngineError::invalid_input("quantity", "must be at least 1"));
    }
    if base_period.is_some() != target_period.is_some() {
        return Err(EngineError::invalid_input(
            "base_period",
            "base_period and target_period must be given together",
        ));
    }

    let piece = reference
        .piece(piece_id)
        .ok_or_else(|| EngineError::PieceNotFound {
            piece_id: piece_id.to_string(),
        })?;

    let mut steps = Vec::new();
    let mut warnings = Vec::new();

    // Layer 1: base cost
    let materials = calculate_materials_cost(piece, quantity, reference, 1)?;
    steps.push(materials.audit_step);
    warnings.extend(materials.warnings);

    let general = calculate_general_costs(
        piece,
        quantity,
        materials.steel_weight_tons,
        reference,
        as_of,
        2,
    );
    steps.push(general.audit_step);
    warnings.extend(general.warnings);

    let base_cost = materials.total + general.costs.total;
    debug!(piece_id, %base_cost, "Base cost computed");

    // Layer 2: adjustment
    let scales = reference.active_scales(as_of);
    let adjustment = apply_adjustment(
        base_cost,
        piece.family,
        &scales,
        &reference.policies().adjustment,
        3,
    );
    steps.push(adjustment.audit_step);
    warnings.extend(adjustment.warnings);

    // Layer 3: escalation
    let escalation = apply_escalation(
        adjustment.adjusted_cost,
        base_period,
        target_period,
        reference,
        &reference.policies().escalation,
        4,
    )?;
    steps.push(escalation.audit_step);
    warnings.extend(escalation.warnings);

    let final_cost = escalation.final_cost;
    let unit_cost = final_cost / Decimal::from(quantity);
    let duration_us = start_time.elapsed().as_micros() as u64;

    info!(
        piece_id,
        quantity,
        %final_cost,
        warnings = warnings.len(),
        duration_us,
        "Piece cost calculated"
    );

    Ok(CostBreakdown {
        calculation_id: Uuid::new_v4(),
        calculated_at: Utc::now(),
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        as_of,
        piece_id: piece.id.clone(),
        piece_name: piece.name.clone(),
        family: piece.family,
        quantity,
        materials: materials.lines,
        materials_cost: materials.total,
        general_costs: general.costs,
        base_cost,
        adjustment: adjustment.summary,
        adjusted_cost: adjustment.adjusted_cost,
        k_factor: escalation.summary.k_factor,
        escalation: escalation.summary,
        final_cost,
        unit_cost,
        total_cost: final_cost,
        audit_trace: AuditTrace {
            steps,
            warnings,
            duration_us,
        },
    })
}
