//! General (non-material) costs: plant overheads, filling labor and steel labor.
//!
//! Every rate is a versioned cost parameter. When a parameter has no active
//! version the documented default below is used and a
//! `COST_PARAMETER_DEFAULT` warning is recorded.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{AuditStep, AuditWarning, GeneralCosts, Piece, WarningSeverity, audit_decimal};
use crate::repository::CostParameterRepository;

use super::warnings::{COST_PARAMETER_DEFAULT, configuration_gap};

/// Energy charge per ton of concrete.
pub const ENERGY_PER_TON: &str = "energy_per_ton";
/// Factory overhead per ton.
pub const FACTORY_OVERHEAD_PER_TON: &str = "factory_overhead_per_ton";
/// Company overhead per ton.
pub const COMPANY_OVERHEAD_PER_TON: &str = "company_overhead_per_ton";
/// Utility charge per ton.
pub const UTILITY_PER_TON: &str = "utility_per_ton";
/// Engineering charge per ton.
pub const ENGINEERING_PER_TON: &str = "engineering_per_ton";
/// Filling labor per cubic metre of concrete.
pub const FILLING_LABOR_PER_M3: &str = "filling_labor_per_m3";
/// Hourly labor rate for steel work.
pub const LABOR_HOURLY_RATE: &str = "labor_hourly_rate";
/// Daily cost of an assembly crew.
pub const ASSEMBLY_CREW_DAILY: &str = "assembly_crew_daily";
/// Daily cost of an assembly crane.
pub const ASSEMBLY_CRANE_DAILY: &str = "assembly_crane_daily";

/// Labor hours needed to work one ton of steel.
pub const STEEL_LABOR_HOURS_PER_TON: Decimal = Decimal::from_parts(70, 0, 0, false, 0);

/// Returns the documented default for a known parameter name.
///
/// ```
/// use pricing_engine::calculation::{default_parameter_value, ENERGY_PER_TON};
/// use rust_decimal::Decimal;
///
/// assert_eq!(default_parameter_value(ENERGY_PER_TON), Some(Decimal::from(15658)));
/// assert_eq!(default_parameter_value("unknown"), None);
/// ```
pub fn default_parameter_value(name: &str) -> Option<Decimal> {
    let value: i64 = match name {
        ENERGY_PER_TON => 15_658,
        FACTORY_OVERHEAD_PER_TON => 45_183,
        COMPANY_OVERHEAD_PER_TON => 41_000,
        UTILITY_PER_TON => 34_693,
        ENGINEERING_PER_TON => 12_969,
        FILLING_LABOR_PER_M3 => 188_850,
        LABOR_HOURLY_RATE => 3_000,
        ASSEMBLY_CREW_DAILY => 45_000,
        ASSEMBLY_CRANE_DAILY => 60_000,
        _ => return None,
    };
    Some(Decimal::from(value))
}

/// A resolved parameter value and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedParameter {
    /// Parameter name.
    pub name: &'static str,
    /// The value used.
    pub value: Decimal,
    /// Effective date of the configured version, or `None` if defaulted.
    pub effective_date: Option<NaiveDate>,
}

/// Resolves a parameter as of a date, falling back to its default.
///
/// A defaulted parameter pushes a warning onto `warnings`.
pub fn resolve_parameter<P>(
    parameters: &P,
    name: &'static str,
    as_of: NaiveDate,
    warnings: &mut Vec<AuditWarning>,
) -> ResolvedParameter
where
    P: CostParameterRepository + ?Sized,
{
    if let Some(param) = parameters.active_parameter(name, as_of) {
        return ResolvedParameter {
            name,
            value: param.value,
            effective_date: Some(param.effective_date),
        };
    }

    let value = default_parameter_value(name).unwrap_or(Decimal::ZERO);
    warnings.push(configuration_gap(
        COST_PARAMETER_DEFAULT,
        WarningSeverity::Low,
        format!(
            "No active '{}' parameter on {}; using default {}",
            name, as_of, value
        ),
    ));
    ResolvedParameter {
        name,
        value,
        effective_date: None,
    }
}

/// The result of a general costs calculation.
#[derive(Debug, Clone)]
pub struct GeneralCostsResult {
    /// The cost components.
    pub costs: GeneralCosts,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
    /// Parameters that fell back to defaults.
    pub warnings: Vec<AuditWarning>,
}

/// Calculates general costs for `quantity` pieces.
///
/// ```text
/// weight x (energy + factory_overhead + company_overhead + utility + engineering)
///   + volume x filling_labor
///   + steel_weight x 70 h/t x labor_hourly_rate
/// ```
pub fn calculate_general_costs<P>(
    piece: &Piece,
    quantity: u32,
    steel_weight_tons: Decimal,
    parameters: &P,
    as_of: NaiveDate,
    step_number: u32,
) -> GeneralCostsResult
where
    P: CostParameterRepository + ?Sized,
{
    let mut warnings = Vec::new();
    let mut resolve = |name| resolve_parameter(parameters, name, as_of, &mut warnings);

    let energy = resolve(ENERGY_PER_TON);
    let factory = resolve(FACTORY_OVERHEAD_PER_TON);
    let company = resolve(COMPANY_OVERHEAD_PER_TON);
    let utility = resolve(UTILITY_PER_TON);
    let engineering = resolve(ENGINEERING_PER_TON);
    let filling = resolve(FILLING_LABOR_PER_M3);
    let labor = resolve(LABOR_HOURLY_RATE);

    let qty = Decimal::from(quantity);
    let weight_tons = piece.weight_tons * qty;
    let volume_m3 = piece.volume_m3 * qty;

    let costs = GeneralCosts {
        weight_tons,
        volume_m3,
        steel_weight_tons,
        energy: weight_tons * energy.value,
        factory_overhead: weight_tons * factory.value,
        company_overhead: weight_tons * company.value,
        utility: weight_tons * utility.value,
        engineering: weight_tons * engineering.value,
        filling_labor: volume_m3 * filling.value,
        steel_labor: steel_weight_tons * STEEL_LABOR_HOURS_PER_TON * labor.value,
        total: Decimal::ZERO,
    };
    let costs = GeneralCosts {
        total: costs.energy
            + costs.factory_overhead
            + costs.company_overhead
            + costs.utility
            + costs.engineering
            + costs.filling_labor
            + costs.steel_labor,
        ..costs
    };

    let rates: serde_json::Map<String, serde_json::Value> = [
        &energy,
        &factory,
        &company,
        &utility,
        &engineering,
        &filling,
        &labor,
    ]
    .iter()
    .map(|p| {
        let source = match p.effective_date {
            Some(_) => "parameter",
            None => "default",
        };
        (
            p.name.to_string(),
            serde_json::json!({ "value": audit_decimal(p.value), "source": source }),
        )
    })
    .collect();

    let audit_step = AuditStep {
        step_number,
        rule_id: "general_costs".to_string(),
        rule_name: "General Costs".to_string(),
        input: serde_json::json!({
            "weight_tons": audit_decimal(weight_tons),
            "volume_m3": audit_decimal(volume_m3),
            "steel_weight_tons": audit_decimal(steel_weight_tons),
            "as_of": as_of.to_string(),
            "rates": rates
        }),
        output: serde_json::json!({
            "energy": audit_decimal(costs.energy),
            "factory_overhead": audit_decimal(costs.factory_overhead),
            "company_overhead": audit_decimal(costs.company_overhead),
            "utility": audit_decimal(costs.utility),
            "engineering": audit_decimal(costs.engineering),
            "filling_labor": audit_decimal(costs.filling_labor),
            "steel_labor": audit_decimal(costs.steel_labor),
            "total": audit_decimal(costs.total)
        }),
        reasoning: format!(
            "{} t, {} m3 and {} t of steel give general costs of ${} ({} defaulted parameters)",
            audit_decimal(weight_tons),
            audit_decimal(volume_m3),
            audit_decimal(steel_weight_tons),
            audit_decimal(costs.total),
            warnings.len()
        ),
    };

    GeneralCostsResult {
        costs,
        audit_step,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PlantMetadata, PricingConfig};
    use crate::models::{CostParameter, ParameterCategory, PieceFamily};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn empty_config() -> PricingConfig {
        PricingConfig::new(PlantMetadata {
            code: "PLT-01".to_string(),
            name: "Test Plant".to_string(),
            origin: "PLANTA_CENTRAL".to_string(),
            currency: "CLP".to_string(),
        })
    }

    fn parameter(name: &str, value: &str) -> CostParameter {
        CostParameter {
            name: name.to_string(),
            category: ParameterCategory::Overhead,
            unit: "$/t".to_string(),
            value: dec(value),
            effective_date: date(2025, 1, 1),
            expiration_date: None,
            is_active: true,
        }
    }

    fn create_test_piece() -> Piece {
        Piece {
            id: "VIG-30".to_string(),
            name: "Beam".to_string(),
            family: PieceFamily::Vigas,
            weight_tons: dec("2.5"),
            volume_m3: dec("1.0"),
            length_m: Some(dec("8")),
            width_m: None,
            bom: vec![],
        }
    }

    #[test]
    fn test_all_defaults_when_no_parameters() {
        let config = empty_config();
        let result =
            calculate_general_costs(&create_test_piece(), 1, dec("0.12"), &config, date(2025, 3, 1), 2);

        // 2.5 x (15658 + 45183 + 41000 + 34693 + 12969) = 2.5 x 149503 = 373757.5
        let per_ton = result.costs.energy
            + result.costs.factory_overhead
            + result.costs.company_overhead
            + result.costs.utility
            + result.costs.engineering;
        assert_eq!(per_ton, dec("373757.5"));
        // 1.0 x 188850
        assert_eq!(result.costs.filling_labor, dec("188850"));
        // 0.12 x 70 x 3000 = 25200
        assert_eq!(result.costs.steel_labor, dec("25200"));
        assert_eq!(result.costs.total, dec("587807.5"));
        assert_eq!(result.warnings.len(), 7);
        assert!(result.warnings.iter().all(|w| w.code == COST_PARAMETER_DEFAULT));
    }

    #[test]
    fn test_configured_parameter_overrides_default() {
        let config = empty_config().with_cost_parameters(vec![parameter(ENERGY_PER_TON, "20000")]);
        let result =
            calculate_general_costs(&create_test_piece(), 2, Decimal::ZERO, &config, date(2025, 3, 1), 1);

        // 5 t x 20000
        assert_eq!(result.costs.energy, dec("100000"));
        assert_eq!(result.costs.weight_tons, dec("5.0"));
        assert_eq!(result.warnings.len(), 6);
        assert_eq!(result.audit_step.input["rates"][ENERGY_PER_TON]["source"], "parameter");
        assert_eq!(result.audit_step.input["rates"][UTILITY_PER_TON]["source"], "default");
    }

    #[test]
    fn test_parameter_not_yet_effective_uses_default() {
        let config = empty_config().with_cost_parameters(vec![parameter(ENERGY_PER_TON, "20000")]);
        let mut warnings = Vec::new();
        let resolved = resolve_parameter(&config, ENERGY_PER_TON, date(2024, 12, 31), &mut warnings);

        assert_eq!(resolved.value, dec("15658"));
        assert!(resolved.effective_date.is_none());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_quantity_scales_weight_and_volume() {
        let config = empty_config();
        let one = calculate_general_costs(&create_test_piece(), 1, Decimal::ZERO, &config, date(2025, 3, 1), 1);
        let three = calculate_general_costs(&create_test_piece(), 3, Decimal::ZERO, &config, date(2025, 3, 1), 1);
        assert_eq!(three.costs.total, one.costs.total * dec("3"));
    }
}
