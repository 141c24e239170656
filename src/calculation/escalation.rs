//! Escalation layer: the polynomial price-adjustment formula.
//!
//! ```text
//! K = w_steel x steel_t/steel_b + w_labor x labor_t/labor_b
//!   + w_concrete x concrete_t/concrete_b + w_fuel x fuel_t/fuel_b
//! ```
//!
//! with default weights 0.4 / 0.3 / 0.2 / 0.1. A missing or unusable index
//! degrades to `K = 1` with a warning rather than failing the quote.

use rust_decimal::Decimal;

use crate::config::EscalationWeights;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, AuditWarning, EscalationRatios, EscalationStatus, EscalationSummary, MonthlyIndex,
    Period, WarningSeverity, audit_decimal,
};
use crate::repository::MonthlyIndexRepository;

use super::warnings::{MONTHLY_INDEX_INVALID, MONTHLY_INDEX_MISSING, configuration_gap};

/// The result of applying the escalation layer.
#[derive(Debug, Clone)]
pub struct EscalationResult {
    /// `adjusted_cost x K`.
    pub final_cost: Decimal,
    /// What was applied.
    pub summary: EscalationSummary,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
    /// Missing or invalid index warnings.
    pub warnings: Vec<AuditWarning>,
}

/// Computes sub-index ratios and K between two index snapshots.
///
/// Returns `None` if any base sub-index is not positive.
///
/// ```
/// use pricing_engine::calculation::escalation_factor;
/// use pricing_engine::config::EscalationWeights;
/// use pricing_engine::models::{MonthlyIndex, Period};
/// use rust_decimal::Decimal;
///
/// let index = |period: &str, steel: i64| MonthlyIndex {
///     period: period.parse::<Period>().unwrap(),
///     steel_index: Decimal::from(steel),
///     labor_index: Decimal::from(100),
///     concrete_index: Decimal::from(100),
///     fuel_index: Decimal::from(100),
///     dollar_rate: Decimal::from(950),
/// };
/// let (_, k) = escalation_factor(
///     &index("2025-01", 100),
///     &index("2025-02", 110),
///     &EscalationWeights::default(),
/// )
/// .unwrap();
/// assert_eq!(k, Decimal::new(104, 2));
/// ```
pub fn escalation_factor(
    base: &MonthlyIndex,
    target: &MonthlyIndex,
    weights: &EscalationWeights,
) -> Option<(EscalationRatios, Decimal)> {
    let ratio = |t: Decimal, b: Decimal| {
        if b > Decimal::ZERO {
            t.checked_div(b)
        } else {
            None
        }
    };

    let ratios = EscalationRatios {
        steel: ratio(target.steel_index, base.steel_index)?,
        labor: ratio(target.labor_index, base.labor_index)?,
        concrete: ratio(target.concrete_index, base.concrete_index)?,
        fuel: ratio(target.fuel_index, base.fuel_index)?,
    };
    let k = weights.steel * ratios.steel
        + weights.labor * ratios.labor
        + weights.concrete * ratios.concrete
        + weights.fuel * ratios.fuel;

    Some((ratios, k))
}

/// Applies the escalation layer to an adjusted cost.
///
/// # Errors
///
/// Returns [`EngineError::InvalidInput`] if only one of the two periods is given.
pub fn apply_escalation<I>(
    adjusted_cost: Decimal,
    base_period: Option<Period>,
    target_period: Option<Period>,
    indices: &I,
    weights: &EscalationWeights,
    step_number: u32,
) -> EngineResult<EscalationResult>
where
    I: MonthlyIndexRepository + ?Sized,
{
    let mut warnings = Vec::new();

    let (status, ratios, k_factor, reasoning) = match (base_period, target_period) {
        (None, None) => (
            EscalationStatus::NotRequested,
            None,
            Decimal::ONE,
            "No escalation periods requested: K = 1".to_string(),
        ),
        (Some(base), Some(target)) => {
            match (indices.monthly_index(base), indices.monthly_index(target)) {
                (Some(base_index), Some(target_index)) => {
                    match escalation_factor(base_index, target_index, weights) {
                        Some((ratios, k)) => (
                            EscalationStatus::Applied,
                            Some(ratios),
                            k,
                            format!("Escalation {} -> {}: K = {}", base, target, audit_decimal(k)),
                        ),
                        None => {
                            warnings.push(configuration_gap(
                                MONTHLY_INDEX_INVALID,
                                WarningSeverity::Medium,
                                format!(
                                    "Monthly index {} has a non-positive sub-index; escalation skipped",
                                    base
                                ),
                            ));
                            (
                                EscalationStatus::IndexInvalid,
                                None,
                                Decimal::ONE,
                                format!("Base index {} unusable: K = 1", base),
                            )
                        }
                    }
                }
                (base_index, target_index) => {
                    let missing: Vec<String> = [(base, base_index), (target, target_index)]
                        .iter()
                        .filter(|(_, index)| index.is_none())
                        .map(|(period, _)| period.to_string())
                        .collect();
                    warnings.push(configuration_gap(
                        MONTHLY_INDEX_MISSING,
                        WarningSeverity::Medium,
                        format!(
                            "Monthly index missing for {}; escalation skipped",
                            missing.join(", ")
                        ),
                    ));
                    (
                        EscalationStatus::IndexMissing,
                        None,
                        Decimal::ONE,
                        format!("Index missing for {}: K = 1", missing.join(", ")),
                    )
                }
            }
        }
        _ => {
            return Err(EngineError::invalid_input(
                "base_period",
                "base_period and target_period must be given together",
            ));
        }
    };

    let final_cost = adjusted_cost * k_factor;

    let audit_step = AuditStep {
        step_number,
        rule_id: "escalation".to_string(),
        rule_name: "Polynomial Escalation".to_string(),
        input: serde_json::json!({
            "adjusted_cost": audit_decimal(adjusted_cost),
            "base_period": base_period,
            "target_period": target_period,
            "weights": {
                "steel": audit_decimal(weights.steel),
                "labor": audit_decimal(weights.labor),
                "concrete": audit_decimal(weights.concrete),
                "fuel": audit_decimal(weights.fuel)
            }
        }),
        output: serde_json::json!({
            "status": status,
            "k_factor": audit_decimal(k_factor),
            "final_cost": audit_decimal(final_cost)
        }),
        reasoning,
    };

    Ok(EscalationResult {
        final_cost,
        summary: EscalationSummary {
            base_period,
            target_period,
            status,
            ratios,
            k_factor,
        },
        audit_step,
        warnings,
    })
}
