//! False tonnage: billed weight with no cargo behind it.
//!
//! Carriers bill at least their minimum tonnage per truck. The difference
//! between that minimum and the real load is the false tonnage.

use rust_decimal::Decimal;

use crate::config::BillingPolicy;
use crate::models::{DispatchKind, TruckConfig};

/// Billed tonnage of one truck.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TonnageBill {
    /// Actual load.
    pub real_tons: Decimal,
    /// `max(0, min_billable - real)` when the floor applies, else 0.
    pub false_tons: Decimal,
    /// `real_tons + false_tons`.
    pub total_tons: Decimal,
}

/// Returns true if the minimum billable floor applies to a dispatch kind.
pub fn floor_applies(dispatch: DispatchKind, policy: &BillingPolicy) -> bool {
    match dispatch {
        DispatchKind::Grouped => true,
        DispatchKind::Individual => policy.individual_min_floor,
        DispatchKind::OverCapacity => policy.over_capacity_min_floor,
    }
}

/// Bills a truck's real load against its minimum.
///
/// ```
/// use pricing_engine::calculation::bill_tonnage;
/// use pricing_engine::models::{TruckConfig, TruckType};
/// use rust_decimal::Decimal;
///
/// let truck = TruckConfig {
///     truck_type: TruckType::Standard,
///     capacity_tons: Decimal::from(25),
///     min_billable_tons: Decimal::from(21),
/// };
/// let bill = bill_tonnage(Decimal::from(5), &truck, true);
/// assert_eq!(bill.false_tons, Decimal::from(16));
/// assert_eq!(bill.total_tons, Decimal::from(21));
/// ```
pub fn bill_tonnage(real_tons: Decimal, truck: &TruckConfig, apply_floor: bool) -> TonnageBill {
    let false_tons = if apply_floor {
        (truck.min_billable_tons - real_tons).max(Decimal::ZERO)
    } else {
        Decimal::ZERO
    };

    TonnageBill {
        real_tons,
        false_tons,
        total_tons: real_tons + false_tons,
    }
}
