//! Derived reference-data updates.
//!
//! The engine never mutates reference data in place. These functions take
//! a snapshot and return the updated value for the owning collaborator to
//! persist.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::{Material, MonthlyIndex, Period};

/// Returns a copy of `material` with a new current price.
///
/// # Errors
///
/// Returns [`EngineError::InvalidInput`] if the price is negative.
pub fn reprice_material(
    material: &Material,
    new_price: Decimal,
    at: NaiveDate,
) -> EngineResult<Material> {
    if new_price < Decimal::ZERO {
        return Err(EngineError::invalid_input(
            "new_price",
            format!("price must not be negative, got {}", new_price),
        ));
    }

    debug!(
        material_id = %material.id,
        old_price = %material.current_price,
        new_price = %new_price,
        "Repricing material"
    );

    Ok(Material {
        current_price: new_price,
        price_updated_at: at,
        ..material.clone()
    })
}

/// Derives a new monthly index from the previous one.
///
/// The steel sub-index follows the exchange rate linearly:
/// `steel = previous.steel x dollar_rate / previous.dollar_rate`. The other
/// sub-indices are taken as given.
///
/// # Errors
///
/// Returns [`EngineError::InvalidInput`] if `period` is not after the
/// previous period, if either dollar rate is not positive, or if a given
/// sub-index is negative.
///
/// ```
/// use pricing_engine::calculation::derive_monthly_index;
/// use pricing_engine::models::MonthlyIndex;
/// use rust_decimal::Decimal;
///
/// let january = MonthlyIndex {
///     period: "2025-01".parse().unwrap(),
///     steel_index: Decimal::from(100),
///     labor_index: Decimal::from(100),
///     concrete_index: Decimal::from(100),
///     fuel_index: Decimal::from(100),
///     dollar_rate: Decimal::from(1000),
/// };
/// let february = derive_monthly_index(
///     &january,
///     "2025-02".parse().unwrap(),
///     Decimal::from(1050),
///     Decimal::from(101),
///     Decimal::from(100),
///     Decimal::from(99),
/// )
/// .unwrap();
/// assert_eq!(february.steel_index, Decimal::from(105));
/// ```
pub fn derive_monthly_index(
    previous: &MonthlyIndex,
    period: Period,
    dollar_rate: Decimal,
    labor_index: Decimal,
    concrete_index: Decimal,
    fuel_index: Decimal,
) -> EngineResult<MonthlyIndex> {
    if period <= previous.period {
        return Err(EngineError::invalid_input(
            "period",
            format!("{} must be after the previous period {}", period, previous.period),
        ));
    }
    if dollar_rate <= Decimal::ZERO {
        return Err(EngineError::invalid_input(
            "dollar_rate",
            format!("must be positive, got {}", dollar_rate),
        ));
    }
    for (field, value) in [
        ("labor_index", labor_index),
        ("concrete_index", concrete_index),
        ("fuel_index", fuel_index),
    ] {
        if value < Decimal::ZERO {
            return Err(EngineError::invalid_input(
                field,
                format!("must not be negative, got {}", value),
            ));
        }
    }

    let dollar_ratio = Some(previous.dollar_rate)
        .filter(|d| *d > Decimal::ZERO)
        .and_then(|d| dollar_rate.checked_div(d))
        .ok_or_else(|| {
            EngineError::invalid_input(
                "previous.dollar_rate",
                format!(
                    "previous index {} has a non-positive dollar rate {}",
                    previous.period, previous.dollar_rate
                ),
            )
        })?;

    let steel_index = previous.steel_index * dollar_ratio;

    debug!(
        previous = %previous.period,
        period = %period,
        steel_index = %steel_index,
        "Derived monthly index"
    );

    Ok(MonthlyIndex {
        period,
        steel_index,
        labor_index,
        concrete_index,
        fuel_index,
        dollar_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MaterialCategory, MaterialUnit};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn january() -> MonthlyIndex {
        MonthlyIndex {
            period: "2025-01".parse().unwrap(),
            steel_index: dec("100"),
            labor_index: dec("100"),
            concrete_index: dec("100"),
            fuel_index: dec("100"),
            dollar_rate: dec("950"),
        }
    }

    #[test]
    fn test_steel_follows_dollar_linearly() {
        let derived = derive_monthly_index(
            &january(),
            "2025-02".parse().unwrap(),
            dec("1045"),
            dec("101"),
            dec("100"),
            dec("97"),
        )
        .unwrap();

        // 100 x 1045 / 950 = 110
        assert_eq!(derived.steel_index, dec("110"));
        assert_eq!(derived.labor_index, dec("101"));
        assert_eq!(derived.fuel_index, dec("97"));
        assert_eq!(derived.dollar_rate, dec("1045"));
    }

    #[test]
    fn test_derive_rejects_non_positive_dollar() {
        let result = derive_monthly_index(
            &january(),
            "2025-02".parse().unwrap(),
            Decimal::ZERO,
            dec("100"),
            dec("100"),
            dec("100"),
        );
        match result {
            Err(EngineError::InvalidInput { field, .. }) => assert_eq!(field, "dollar_rate"),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_derive_rejects_earlier_or_same_period() {
        for p in ["2025-01", "2024-12"] {
            let result = derive_monthly_index(
                &january(),
                p.parse().unwrap(),
                dec("950"),
                dec("100"),
                dec("100"),
                dec("100"),
            );
            assert!(result.is_err(), "period {} should be rejected", p);
        }
    }

    #[test]
    fn test_derive_rejects_zero_previous_dollar() {
        let mut previous = january();
        previous.dollar_rate = Decimal::ZERO;
        let result = derive_monthly_index(
            &previous,
            "2025-02".parse().unwrap(),
            dec("950"),
            dec("100"),
            dec("100"),
            dec("100"),
        );
        assert!(matches!(result, Err(EngineError::InvalidInput { .. })));
    }

    #[test]
    fn test_reprice_material() {
        let material = Material {
            id: "MAT-ACE-01".to_string(),
            name: "Steel".to_string(),
            category: MaterialCategory::Steel,
            unit: MaterialUnit::Kg,
            current_price: dec("950"),
            price_updated_at: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
        };
        let at = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();

        let repriced = reprice_material(&material, dec("990"), at).unwrap();
        assert_eq!(repriced.current_price, dec("990"));
        assert_eq!(repriced.price_updated_at, at);
        assert_eq!(repriced.id, material.id);
        // Original untouched
        assert_eq!(material.current_price, dec("950"));

        assert!(reprice_material(&material, dec("-1"), at).is_err());
    }
}
