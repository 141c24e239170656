//! Adjustment layer: discount/markup scales applied to the base cost.

use rust_decimal::Decimal;

use crate::config::{AdjustmentPolicy, NoScaleBehavior};
use crate::models::{
    AdjustmentScale, AdjustmentSource, AdjustmentSummary, AuditStep, AuditWarning, PieceFamily,
    WarningSeverity, audit_decimal,
};

use super::warnings::{MULTIPLE_ACTIVE_SCALES, NO_ACTIVE_SCALE, configuration_gap};

/// The result of applying the adjustment layer.
#[derive(Debug, Clone)]
pub struct AdjustmentResult {
    /// Cost after adjustment.
    pub adjusted_cost: Decimal,
    /// What was applied.
    pub summary: AdjustmentSummary,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
    /// Missing or ambiguous scale warnings.
    pub warnings: Vec<AuditWarning>,
}

fn percent_factor(percent: Decimal) -> Decimal {
    Decimal::ONE + percent / Decimal::ONE_HUNDRED
}

/// Applies the active adjustment scale to a base cost.
///
/// With one active scale:
/// `base x (1 + discount/100) x (1 + adjustment/100)`, and additionally
/// `x (1 + special/100)` when the family is listed in the scale's special
/// categories. With several, the latest effective date is used. With none,
/// the policy decides between passing the cost through unchanged and the
/// legacy constant factors; either way a warning is recorded.
///
/// # Arguments
///
/// * `base_cost` - Materials plus general costs
/// * `family` - The piece family, matched against special categories
/// * `active_scales` - Scales in effect on the calculation date
/// * `policy` - Behaviour when no scale is active
/// * `step_number` - The audit step number to use
pub fn apply_adjustment(
    base_cost: Decimal,
    family: PieceFamily,
    active_scales: &[&AdjustmentScale],
    policy: &AdjustmentPolicy,
    step_number: u32,
) -> AdjustmentResult {
    let mut warnings = Vec::new();

    // Latest effective date; ties keep the first scale given.
    let selected = active_scales
        .iter()
        .rev()
        .max_by_key(|s| s.effective_date)
        .copied();

    let (summary, reasoning) = match selected {
        Some(scale) => {
            if active_scales.len() > 1 {
                let ids: Vec<&str> = active_scales.iter().map(|s| s.id.as_str()).collect();
                warnings.push(configuration_gap(
                    MULTIPLE_ACTIVE_SCALES,
                    WarningSeverity::Medium,
                    format!(
                        "{} adjustment scales active ({}); using '{}' (latest effective date)",
                        active_scales.len(),
                        ids.join(", "),
                        scale.id
                    ),
                ));
            }

            let general_factor =
                percent_factor(scale.general_discount) * percent_factor(scale.general_adjustment);
            let special_factor = scale
                .special_adjustment
                .filter(|_| scale.covers_family(family.code()))
                .map(percent_factor);
            let combined_factor = general_factor * special_factor.unwrap_or(Decimal::ONE);

            let reasoning = format!(
                "Scale '{}': (1 + {}%) x (1 + {}%){} = x{}",
                scale.id,
                audit_decimal(scale.general_discount),
                audit_decimal(scale.general_adjustment),
                match (special_factor, scale.special_adjustment) {
                    (Some(_), Some(special)) => {
                        format!(" x (1 + {}%) for {}", audit_decimal(special), family.code())
                    }
                    _ => String::new(),
                },
                audit_decimal(combined_factor)
            );

            (
                AdjustmentSummary {
                    source: AdjustmentSource::Scale,
                    scale_id: Some(scale.id.clone()),
                    general_factor,
                    special_factor,
                    combined_factor,
                },
                reasoning,
            )
        }
        None => match policy.no_active_scale {
            NoScaleBehavior::Identity => {
                warnings.push(configuration_gap(
                    NO_ACTIVE_SCALE,
                    WarningSeverity::Medium,
                    "No active adjustment scale; base cost passed through unchanged",
                ));
                (
                    AdjustmentSummary {
                        source: AdjustmentSource::Identity,
                        scale_id: None,
                        general_factor: Decimal::ONE,
                        special_factor: None,
                        combined_factor: Decimal::ONE,
                    },
                    "No active scale: identity pass-through".to_string(),
                )
            }
            NoScaleBehavior::Legacy => {
                let legacy = &policy.legacy;
                warnings.push(configuration_gap(
                    NO_ACTIVE_SCALE,
                    WarningSeverity::Medium,
                    "No active adjustment scale; legacy constant factors applied",
                ));
                let general_factor = legacy.discount_factor * legacy.adjustment_factor;
                let special_factor = legacy
                    .special_categories
                    .iter()
                    .any(|c| c.eq_ignore_ascii_case(family.code()))
                    .then(|| Decimal::ONE + legacy.special_adjustment);
                let combined_factor = general_factor * special_factor.unwrap_or(Decimal::ONE);
                (
                    AdjustmentSummary {
                        source: AdjustmentSource::Legacy,
                        scale_id: None,
                        general_factor,
                        special_factor,
                        combined_factor,
                    },
                    format!(
                        "No active scale: legacy factors {} x {}{} = x{}",
                        audit_decimal(legacy.discount_factor),
                        audit_decimal(legacy.adjustment_factor),
                        special_factor
                            .map(|f| format!(" x {} for {}", audit_decimal(f), family.code()))
                            .unwrap_or_default(),
                        audit_decimal(combined_factor)
                    ),
                )
            }
        },
    };

    let adjusted_cost = base_cost * summary.combined_factor;

    let audit_step = AuditStep {
        step_number,
        rule_id: "adjustment_scale".to_string(),
        rule_name: "Adjustment Scale".to_string(),
        input: serde_json::json!({
            "base_cost": audit_decimal(base_cost),
            "family": family.code(),
            "active_scales": active_scales.iter().map(|s| s.id.as_str()).collect::<Vec<_>>()
        }),
        output: serde_json::json!({
            "source": summary.source,
            "scale_id": summary.scale_id,
            "combined_factor": audit_decimal(summary.combined_factor),
            "adjusted_cost": audit_decimal(adjusted_cost)
        }),
        reasoning,
    };

    AdjustmentResult {
        adjusted_cost,
        summary,
        audit_step,
        warnings,
    }
}
