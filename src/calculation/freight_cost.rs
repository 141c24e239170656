//! Freight cost for a set of budget pieces.
//!
//! Pieces are classified, individual units get their own truck, groupable
//! units are packed per length tier, and every truck is billed against its
//! minimum tonnage at the distance-banded rate.

use std::time::Instant;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::config::{FreightPolicy, RateColumn};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AppliedFreightRate, AuditStep, AuditTrace, AuditWarning, BudgetPiece, DispatchKind,
    FreightMetrics, FreightRate, FreightResult, FreightTotals, IndividualReason, LoadedUnit,
    TruckConfig, TruckLoad, WarningSeverity, audit_decimal,
};
use crate::repository::{BandLookup, ReferenceData};

use super::bin_packing::{PackItem, first_fit_decreasing};
use super::false_tonnage::{bill_tonnage, floor_applies};
use super::freight_classifier::{PieceClassification, classify_piece};
use super::limits::{
    MAX_DISTANCE_KM, MAX_PIECE_LENGTH_M, MAX_PIECE_QUANTITY, MAX_PIECE_WEIGHT_TONS, at_most,
    checked_product, checked_sum,
};
use super::warnings::{FREIGHT_RATE_FALLBACK, FREIGHT_RATE_MISSING, configuration_gap};

/// A truck before billing.
#[derive(Debug)]
struct TruckDraft {
    tier_index: usize,
    dispatch: DispatchKind,
    individual_reason: Option<IndividualReason>,
    units: Vec<LoadedUnit>,
    real_tons: Decimal,
    requires_escort: bool,
    from_grouping: bool,
}

/// Sequential audit step numbering.
struct StepLog {
    steps: Vec<AuditStep>,
}

impl StepLog {
    fn push(
        &mut self,
        rule_id: &str,
        rule_name: &str,
        input: serde_json::Value,
        output: serde_json::Value,
        reasoning: String,
    ) {
        self.steps.push(AuditStep {
            step_number: self.steps.len() as u32 + 1,
            rule_id: rule_id.to_string(),
            rule_name: rule_name.to_string(),
            input,
            output,
            reasoning,
        });
    }
}

fn validate_request(pieces: &[BudgetPiece], distance_km: Decimal) -> EngineResult<()> {
    if distance_km < Decimal::ZERO {
        return Err(EngineError::invalid_input(
            "distance_km",
            format!("must not be negative, got {}", distance_km),
        ));
    }
    at_most("distance_km", distance_km, MAX_DISTANCE_KM)?;
    for (i, piece) in pieces.iter().enumerate() {
        let field = |name: &str| format!("pieces[{}].{}", i, name);
        if piece.weight_tons <= Decimal::ZERO {
            return Err(EngineError::invalid_input(
                field("weight_tons"),
                format!("must be positive, got {}", piece.weight_tons),
            ));
        }
        at_most(field("weight_tons"), piece.weight_tons, MAX_PIECE_WEIGHT_TONS)?;
        if piece.quantity == 0 {
            return Err(EngineError::invalid_input(field("quantity"), "must be at least 1"));
        }
        if piece.quantity > MAX_PIECE_QUANTITY {
            return Err(EngineError::invalid_input(
                field("quantity"),
                format!("must not exceed {}, got {}", MAX_PIECE_QUANTITY, piece.quantity),
            ));
        }
        if piece.max_stackable == 0 {
            return Err(EngineError::invalid_input(field("max_stackable"), "must be at least 1"));
        }
        if piece.length_m < Decimal::ZERO {
            return Err(EngineError::invalid_input(
                field("length_m"),
                format!("must not be negative, got {}", piece.length_m),
            ));
        }
        at_most(field("length_m"), piece.length_m, MAX_PIECE_LENGTH_M)?;
    }
    Ok(())
}

fn column_rate(rate: Option<&FreightRate>, column: RateColumn) -> Decimal {
    match (rate, column) {
        (Some(r), RateColumn::Under12m) => r.rate_under_12m,
        (Some(r), RateColumn::Over12m) => r.rate_over_12m,
        (None, _) => Decimal::ZERO,
    }
}

fn units_of(piece: &BudgetPiece) -> impl Iterator<Item = LoadedUnit> + '_ {
    (1..=piece.quantity).map(move |unit| LoadedUnit {
        piece_id: piece.id.clone(),
        unit,
        weight_tons: piece.weight_tons,
    })
}

fn tier_trucks<'a, R>(reference: &'a R, policy: &FreightPolicy) -> EngineResult<Vec<&'a TruckConfig>>
where
    R: ReferenceData + ?Sized,
{
    policy
        .tiers
        .iter()
        .map(|tier| {
            reference
                .truck_config(tier.truck_type)
                .ok_or_else(|| EngineError::InvalidConfig {
                    message: format!("no truck configuration for {}", tier.truck_type),
                })
        })
        .collect()
}

/// Calculates freight for a set of budget pieces.
///
/// # Arguments
///
/// * `reference` - Reference data snapshot
/// * `pieces` - Pieces to ship
/// * `origin` - Dispatch origin, used to select freight rates
/// * `distance_km` - Delivery distance
/// * `as_of` - Date freight rates are read as of
///
/// # Errors
///
/// Returns [`EngineError::InvalidInput`] for a negative distance, or a piece
/// with non-positive weight, zero quantity, zero `max_stackable` or negative
/// length, and for inputs above the limits in `calculation::limits`.
/// Returns [`EngineError::CalculationError`] if configured rates push a cost
/// outside the decimal range. A missing freight rate is not an error: trucks are costed at zero
/// and a `FREIGHT_RATE_MISSING` warning is recorded.
pub fn calculate_freight<R>(
    reference: &R,
    pieces: &[BudgetPiece],
    origin: &str,
    distance_km: Decimal,
    as_of: NaiveDate,
) -> EngineResult<FreightResult>
where
    R: ReferenceData + ?Sized,
{
    let start_time = Instant::now();
    validate_request(pieces, distance_km)?;

    let policy = &reference.policies().freight;
    let trucks_by_tier = tier_trucks(reference, policy)?;
    let largest_capacity = reference
        .truck_configs()
        .iter()
        .map(|t| t.capacity_tons)
        .max()
        .unwrap_or(Decimal::ZERO);

    let mut log = StepLog { steps: Vec::new() };
    let mut warnings: Vec<AuditWarning> = Vec::new();

    // Classification
    let classifications: Vec<PieceClassification> = pieces
        .iter()
        .map(|p| classify_piece(p, policy, largest_capacity))
        .collect::<EngineResult<_>>()?;

    let individual: Vec<serde_json::Value> = pieces
        .iter()
        .zip(&classifications)
        .filter_map(|(p, c)| {
            c.individual_reason
                .map(|reason| serde_json::json!({ "piece_id": p.id, "reason": reason }))
        })
        .collect();
    log.push(
        "freight_classification",
        "Freight Piece Classification",
        serde_json::json!({
            "pieces": pieces.len(),
            "largest_capacity_tons": audit_decimal(largest_capacity)
        }),
        serde_json::json!({ "individual": individual }),
        format!(
            "{} of {} pieces ship individually",
            individual.len(),
            pieces.len()
        ),
    );

    // Individual trucks, in input order
    let mut drafts: Vec<TruckDraft> = Vec::new();
    for (piece, class) in pieces.iter().zip(&classifications) {
        let Some(reason) = class.individual_reason else {
            continue;
        };
        let truck = trucks_by_tier[class.tier_index];
        for unit in units_of(piece) {
            let dispatch = if unit.weight_tons > truck.capacity_tons {
                DispatchKind::OverCapacity
            } else {
                DispatchKind::Individual
            };
            drafts.push(TruckDraft {
                tier_index: class.tier_index,
                dispatch,
                individual_reason: Some(reason),
                real_tons: unit.weight_tons,
                units: vec![unit],
                requires_escort: piece.requires_escort,
                from_grouping: false,
            });
        }
    }

    // Grouped trucks, tier by tier
    for (tier_index, tier) in policy.tiers.iter().enumerate() {
        let truck = trucks_by_tier[tier_index];
        let items: Vec<PackItem<(usize, LoadedUnit)>> = pieces
            .iter()
            .enumerate()
            .zip(&classifications)
            .filter(|(_, c)| c.is_groupable() && c.tier_index == tier_index)
            .flat_map(|((i, p), _)| {
                units_of(p).map(move |unit| PackItem {
                    weight: unit.weight_tons,
                    max_stackable: p.max_stackable,
                    key: (i, unit),
                })
            })
            .collect();
        if items.is_empty() {
            continue;
        }

        let unit_count = items.len();
        let bins = first_fit_decreasing(items, truck.capacity_tons);
        let oversized = bins.iter().filter(|b| b.oversized).count();
        log.push(
            "truck_packing",
            "Truck Bin Packing",
            serde_json::json!({
                "truck_type": tier.truck_type,
                "capacity_tons": audit_decimal(truck.capacity_tons),
                "units": unit_count
            }),
            serde_json::json!({
                "trucks": bins.len(),
                "oversized": oversized,
                "loads": bins.iter().map(|b| audit_decimal(b.weight)).collect::<Vec<_>>()
            }),
            format!(
                "First-fit decreasing packed {} units into {} {} trucks ({} oversized)",
                unit_count,
                bins.len(),
                tier.truck_type,
                oversized
            ),
        );

        for bin in bins {
            let requires_escort = bin.items.iter().any(|item| pieces[item.key.0].requires_escort);
            drafts.push(TruckDraft {
                tier_index,
                dispatch: if bin.oversized {
                    DispatchKind::OverCapacity
                } else {
                    DispatchKind::Grouped
                },
                individual_reason: None,
                real_tons: bin.weight,
                units: bin.items.into_iter().map(|item| item.key.1).collect(),
                requires_escort,
                from_grouping: true,
            });
        }
    }

    // Rate lookup
    let lookup = reference.find_freight_rate(origin, distance_km, as_of);
    match lookup {
        BandLookup::InBand(_) => {}
        BandLookup::Fallback(rate) => warnings.push(configuration_gap(
            FREIGHT_RATE_FALLBACK,
            WarningSeverity::Medium,
            format!(
                "No freight rate band for {} km from {}; using most recent rate '{}' ({}-{} km)",
                distance_km, origin, rate.id, rate.km_from, rate.km_to
            ),
        )),
        BandLookup::Missing => warnings.push(configuration_gap(
            FREIGHT_RATE_MISSING,
            WarningSeverity::High,
            format!(
                "No freight rate for origin {} as of {}; freight costed at zero",
                origin, as_of
            ),
        )),
    }
    let rate = lookup.rate();
    let applied_rate = rate.map(|r| AppliedFreightRate {
        rate_id: r.id.clone(),
        origin: r.origin.clone(),
        km_from: r.km_from,
        km_to: r.km_to,
        rate_under_12m: r.rate_under_12m,
        rate_over_12m: r.rate_over_12m,
        effective_date: r.effective_date,
        fallback: lookup.is_fallback(),
    });
    log.push(
        "freight_rate_lookup",
        "Freight Rate Lookup",
        serde_json::json!({
            "origin": origin,
            "distance_km": audit_decimal(distance_km),
            "as_of": as_of.to_string()
        }),
        serde_json::json!({
            "rate_id": rate.map(|r| r.id.as_str()),
            "fallback": lookup.is_fallback()
        }),
        match rate {
            Some(r) if lookup.is_fallback() => format!("Fell back to most recent rate '{}'", r.id),
            Some(r) => format!("Rate '{}' covers {} km", r.id, audit_decimal(distance_km)),
            None => "No rate found; freight costed at zero".to_string(),
        },
    );

    // Billing
    let escort_cost_per_truck =
        checked_product("escort cost", &[policy.escort_rate_per_km, distance_km])?;
    let bill_truck = |tier_index: usize, dispatch: DispatchKind, real_tons: Decimal, escort: bool| {
        let truck = trucks_by_tier[tier_index];
        let bill = bill_tonnage(real_tons, truck, floor_applies(dispatch, &policy.billing));
        let rate_per_ton_km = column_rate(rate, policy.tiers[tier_index].rate_column);
        let escort_cost = if escort {
            escort_cost_per_truck
        } else {
            Decimal::ZERO
        };
        checked_product("freight cost", &[rate_per_ton_km, bill.total_tons, distance_km])
            .and_then(|haul| checked_sum("freight cost", [haul, escort_cost]))
            .map(|cost| (truck, bill, rate_per_ton_km, escort_cost, cost))
    };

    let mut trucks: Vec<TruckLoad> = Vec::with_capacity(drafts.len());
    let mut grouped_cost = Decimal::ZERO;
    for (i, draft) in drafts.into_iter().enumerate() {
        let (truck, bill, rate_per_ton_km, escort_cost, cost) = bill_truck(
            draft.tier_index,
            draft.dispatch,
            draft.real_tons,
            draft.requires_escort,
        )?;
        if draft.from_grouping {
            grouped_cost = checked_sum("grouped freight cost", [grouped_cost, cost])?;
        }
        trucks.push(TruckLoad {
            truck_number: i as u32 + 1,
            truck_type: truck.truck_type,
            dispatch: draft.dispatch,
            individual_reason: draft.individual_reason,
            units: draft.units,
            capacity_tons: truck.capacity_tons,
            min_billable_tons: truck.min_billable_tons,
            real_tons: bill.real_tons,
            false_tons: bill.false_tons,
            total_tons: bill.total_tons,
            rate_per_ton_km,
            requires_escort: draft.requires_escort,
            escort_cost,
            cost,
        });
    }

    // Every groupable unit on its own truck, billed by the same rules
    let mut hypothetical_individual_cost = Decimal::ZERO;
    for (p, c) in pieces.iter().zip(&classifications).filter(|(_, c)| c.is_groupable()) {
        let dispatch = if p.weight_tons > trucks_by_tier[c.tier_index].capacity_tons {
            DispatchKind::OverCapacity
        } else {
            DispatchKind::Grouped
        };
        let (_, _, _, _, cost) =
            bill_truck(c.tier_index, dispatch, p.weight_tons, p.requires_escort)?;
        let piece_cost = checked_product("hypothetical cost", &[cost, Decimal::from(p.quantity)])?;
        hypothetical_individual_cost =
            checked_sum("hypothetical cost", [hypothetical_individual_cost, piece_cost])?;
    }

    let totals = FreightTotals {
        total_real_tons: trucks.iter().map(|t| t.real_tons).sum(),
        total_false_tons: trucks.iter().map(|t| t.false_tons).sum(),
        total_billed_tons: trucks.iter().map(|t| t.total_tons).sum(),
        escort_cost: checked_sum("escort cost", trucks.iter().map(|t| t.escort_cost))?,
        total_cost: checked_sum("freight cost", trucks.iter().map(|t| t.cost))?,
    };

    let utilizations: Vec<Decimal> = trucks
        .iter()
        .filter(|t| t.total_tons > Decimal::ZERO)
        .map(|t| t.real_tons / t.total_tons)
        .collect();
    let avg_utilization = if utilizations.is_empty() {
        Decimal::ZERO
    } else {
        (utilizations.iter().sum::<Decimal>() / Decimal::from(utilizations.len())).round_dp(4)
    };

    let metrics = FreightMetrics {
        trucks_used: trucks.len() as u32,
        avg_utilization,
        hypothetical_individual_cost,
        grouped_cost,
        saved_by_grouping: hypothetical_individual_cost - grouped_cost,
    };

    log.push(
        "freight_cost",
        "Freight Cost",
        serde_json::json!({
            "trucks": trucks.len(),
            "distance_km": audit_decimal(distance_km),
            "escort_rate_per_km": audit_decimal(policy.escort_rate_per_km)
        }),
        serde_json::json!({
            "total_real_tons": audit_decimal(totals.total_real_tons),
            "total_false_tons": audit_decimal(totals.total_false_tons),
            "total_billed_tons": audit_decimal(totals.total_billed_tons),
            "total_cost": audit_decimal(totals.total_cost),
            "saved_by_grouping": audit_decimal(metrics.saved_by_grouping)
        }),
        format!(
            "{} trucks billed {} t ({} t false) for ${}",
            trucks.len(),
            audit_decimal(totals.total_billed_tons),
            audit_decimal(totals.total_false_tons),
            audit_decimal(totals.total_cost)
        ),
    );

    let duration_us = start_time.elapsed().as_micros() as u64;
    info!(
        origin,
        %distance_km,
        trucks = trucks.len(),
        total_cost = %totals.total_cost,
        duration_us,
        "Freight calculated"
    );

    Ok(FreightResult {
        calculation_id: Uuid::new_v4(),
        calculated_at: Utc::now(),
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        origin: origin.to_string(),
        distance_km,
        rate: applied_rate,
        trucks,
        totals,
        metrics,
        audit_trace: AuditTrace {
            steps: log.steps,
            warnings,
            duration_us,
        },
    })
}
