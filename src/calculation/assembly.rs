//! On-site assembly estimate: crane mobilization, crew days and crane days.

use std::time::Instant;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AssemblyBreakdown, AssemblyLine, AssemblyLineKind, AuditStep, AuditTrace, AuditWarning,
    WarningSeverity, audit_decimal,
};
use crate::repository::{BandLookup, ReferenceData};

use super::limits::{
    MAX_ASSEMBLY_DAYS, MAX_ASSEMBLY_TONS, MAX_DISTANCE_KM, at_most, checked_product, checked_sum,
};
use super::overhead::{ASSEMBLY_CRANE_DAILY, ASSEMBLY_CREW_DAILY, resolve_parameter};
use super::warnings::{ASSEMBLY_RATE_FALLBACK, ASSEMBLY_RATE_MISSING, configuration_gap};

fn non_negative(field: &str, value: Decimal) -> EngineResult<()> {
    if value < Decimal::ZERO {
        return Err(EngineError::invalid_input(
            field,
            format!("must not be negative, got {}", value),
        ));
    }
    Ok(())
}

/// Estimates assembly cost for a job.
///
/// The tonnage tier comes from `total_tons` and the configured boundaries.
/// Mobilization is read from the tier's distance bands; crew and crane days
/// are priced from the `assembly_crew_daily` and `assembly_crane_daily`
/// cost parameters.
///
/// # Errors
///
/// Returns [`EngineError::InvalidInput`] if `total_tons` is not positive,
/// any other input is negative, or an input exceeds its limit in
/// `calculation::limits`. Returns [`EngineError::CalculationError`] if
/// configured rates push a line outside the decimal range.
pub fn calculate_assembly<R>(
    reference: &R,
    distance_km: Decimal,
    total_tons: Decimal,
    assembly_days: Decimal,
    crane_days: Decimal,
    as_of: NaiveDate,
) -> EngineResult<AssemblyBreakdown>
where
    R: ReferenceData + ?Sized,
{
    let start_time = Instant::now();

    if total_tons <= Decimal::ZERO {
        return Err(EngineError::invalid_input(
            "total_tons",
            format!("must be positive, got {}", total_tons),
        ));
    }
    at_most("total_tons", total_tons, MAX_ASSEMBLY_TONS)?;
    non_negative("distance_km", distance_km)?;
    at_most("distance_km", distance_km, MAX_DISTANCE_KM)?;
    non_negative("assembly_days", assembly_days)?;
    at_most("assembly_days", assembly_days, MAX_ASSEMBLY_DAYS)?;
    non_negative("crane_days", crane_days)?;
    at_most("crane_days", crane_days, MAX_ASSEMBLY_DAYS)?;

    let mut steps: Vec<AuditStep> = Vec::new();
    let mut warnings: Vec<AuditWarning> = Vec::new();

    let tiers = &reference.policies().assembly;
    let tonnage_tier = tiers.tier_for(total_tons);

    let lookup = reference.find_assembly_rate(tonnage_tier, distance_km, as_of);
    match lookup {
        BandLookup::InBand(_) => {}
        BandLookup::Fallback(rate) => warnings.push(configuration_gap(
            ASSEMBLY_RATE_FALLBACK,
            WarningSeverity::Medium,
            format!(
                "No {:?} mobilization band for {} km; using most recent rate '{}' ({}-{} km)",
                tonnage_tier, distance_km, rate.id, rate.km_from, rate.km_to
            ),
        )),
        BandLookup::Missing => warnings.push(configuration_gap(
            ASSEMBLY_RATE_MISSING,
            WarningSeverity::High,
            format!(
                "No {:?} mobilization rate as of {}; mobilization costed at zero",
                tonnage_tier, as_of
            ),
        )),
    }
    let mobilization = lookup
        .rate()
        .map(|r| r.mobilization_cost)
        .unwrap_or(Decimal::ZERO);

    steps.push(AuditStep {
        step_number: 1,
        rule_id: "assembly_mobilization".to_string(),
        rule_name: "Crane Mobilization".to_string(),
        input: serde_json::json!({
            "total_tons": audit_decimal(total_tons),
            "distance_km": audit_decimal(distance_km),
            "light_below_tons": audit_decimal(tiers.light_below_tons),
            "heavy_above_tons": audit_decimal(tiers.heavy_above_tons)
        }),
        output: serde_json::json!({
            "tonnage_tier": tonnage_tier,
            "rate_id": lookup.rate().map(|r| r.id.as_str()),
            "fallback": lookup.is_fallback(),
            "mobilization_cost": audit_decimal(mobilization)
        }),
        reasoning: format!(
            "{} t is tier {:?}; mobilization at {} km costs ${}",
            audit_decimal(total_tons),
            tonnage_tier,
            audit_decimal(distance_km),
            audit_decimal(mobilization)
        ),
    });

    let crew_rate = resolve_parameter(reference, ASSEMBLY_CREW_DAILY, as_of, &mut warnings);
    let crane_rate = resolve_parameter(reference, ASSEMBLY_CRANE_DAILY, as_of, &mut warnings);

    let lines = vec![
        AssemblyLine {
            kind: AssemblyLineKind::CraneMobilization,
            description: format!("Crane mobilization ({:?} tier)", tonnage_tier),
            units: Decimal::ONE,
            rate: mobilization,
            amount: mobilization,
        },
        AssemblyLine {
            kind: AssemblyLineKind::Crew,
            description: "Assembly crew".to_string(),
            units: assembly_days,
            rate: crew_rate.value,
            amount: checked_product("assembly crew cost", &[assembly_days, crew_rate.value])?,
        },
        AssemblyLine {
            kind: AssemblyLineKind::CraneDays,
            description: "Crane operation".to_string(),
            units: crane_days,
            rate: crane_rate.value,
            amount: checked_product("crane day cost", &[crane_days, crane_rate.value])?,
        },
    ];
    let total = checked_sum("assembly total", lines.iter().map(|l| l.amount))?;

    steps.push(AuditStep {
        step_number: 2,
        rule_id: "assembly_labor".to_string(),
        rule_name: "Assembly Crew and Crane Days".to_string(),
        input: serde_json::json!({
            "assembly_days": audit_decimal(assembly_days),
            "crane_days": audit_decimal(crane_days),
            "crew_daily": audit_decimal(crew_rate.value),
            "crane_daily": audit_decimal(crane_rate.value)
        }),
        output: serde_json::json!({
            "crew": audit_decimal(lines[1].amount),
            "crane": audit_decimal(lines[2].amount),
            "total": audit_decimal(total)
        }),
        reasoning: format!(
            "{} crew days x ${} + {} crane days x ${}; assembly total ${}",
            audit_decimal(assembly_days),
            audit_decimal(crew_rate.value),
            audit_decimal(crane_days),
            audit_decimal(crane_rate.value),
            audit_decimal(total)
        ),
    });

    let duration_us = start_time.elapsed().as_micros() as u64;
    info!(
        %total_tons,
        %distance_km,
        tier = ?tonnage_tier,
        %total,
        duration_us,
        "Assembly calculated"
    );

    Ok(AssemblyBreakdown {
        calculation_id: Uuid::new_v4(),
        calculated_at: Utc::now(),
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        distance_km,
        total_tons,
        tonnage_tier,
        lines,
        total,
        audit_trace: AuditTrace {
            steps,
            warnings,
            duration_us,
        },
    })
}
