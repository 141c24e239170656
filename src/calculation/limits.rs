//! Upper bounds on request inputs and overflow-checked cost arithmetic.

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};

/// Longest delivery or mobilization distance accepted, in km.
pub const MAX_DISTANCE_KM: Decimal = Decimal::from_parts(20_000, 0, 0, false, 0);
/// Heaviest single budget piece accepted, in tons.
pub const MAX_PIECE_WEIGHT_TONS: Decimal = Decimal::from_parts(1_000, 0, 0, false, 0);
/// Longest single budget piece accepted, in m.
pub const MAX_PIECE_LENGTH_M: Decimal = Decimal::from_parts(200, 0, 0, false, 0);
/// Most units accepted for one budget line.
pub const MAX_PIECE_QUANTITY: u32 = 10_000;
/// Largest assembly job accepted, in tons.
pub const MAX_ASSEMBLY_TONS: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);
/// Most crew or crane days accepted for one job.
pub const MAX_ASSEMBLY_DAYS: Decimal = Decimal::from_parts(3_650, 0, 0, false, 0);

/// Rejects `value` above `max` as invalid input on `field`.
pub(crate) fn at_most(field: impl Into<String>, value: Decimal, max: Decimal) -> EngineResult<()> {
    if value > max {
        return Err(EngineError::invalid_input(
            field,
            format!("must not exceed {}, got {}", max, value),
        ));
    }
    Ok(())
}

fn overflowed(what: &str) -> EngineError {
    EngineError::CalculationError {
        message: format!("{} overflowed the decimal range", what),
    }
}

/// Multiplies all factors, failing instead of panicking on overflow.
pub(crate) fn checked_product(what: &str, factors: &[Decimal]) -> EngineResult<Decimal> {
    factors
        .iter()
        .try_fold(Decimal::ONE, |acc, f| acc.checked_mul(*f))
        .ok_or_else(|| overflowed(what))
}

/// Sums all terms, failing instead of panicking on overflow.
pub(crate) fn checked_sum<I>(what: &str, terms: I) -> EngineResult<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    terms
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, t| acc.checked_add(t))
        .ok_or_else(|| overflowed(what))
}
