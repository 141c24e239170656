//! Read-only reference data access.
//!
//! The calculators never touch storage directly. They read through these
//! traits, each of which takes an explicit `as_of` date where the data is
//! versioned. [`PricingConfig`](crate::config::PricingConfig) implements all of
//! them over an immutable in-memory snapshot; other backends only need to do
//! the same.
//!
//! Repositories carry no business rules: fallbacks and warnings are decided
//! by the calculators.

mod memory;
mod rate_lookup;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::config::{EnginePolicies, PlantMetadata};
use crate::models::{
    AdjustmentScale, AssemblyRate, CostParameter, FreightRate, Material, MonthlyIndex, Period,
    Piece, TonnageTier, TruckConfig, TruckType,
};

pub use rate_lookup::{BandLookup, BandedRate, find_band};

/// Catalog pieces.
pub trait PieceRepository: Send + Sync {
    /// Returns the piece with the given id.
    fn piece(&self, piece_id: &str) -> Option<&Piece>;
}

/// Catalog materials.
pub trait MaterialRepository: Send + Sync {
    /// Returns the materials that exist among `ids`, in the order requested.
    /// Unknown ids are skipped.
    fn materials_by_ids(&self, ids: &[&str]) -> Vec<&Material>;
}

/// Versioned general cost rates.
pub trait CostParameterRepository: Send + Sync {
    /// Returns the parameter version in effect on `as_of`.
    ///
    /// When several versions apply, the latest effective date wins.
    fn active_parameter(&self, name: &str, as_of: NaiveDate) -> Option<&CostParameter>;
}

/// Monthly price index snapshots.
pub trait MonthlyIndexRepository: Send + Sync {
    /// Returns the snapshot for a period.
    fn monthly_index(&self, period: Period) -> Option<&MonthlyIndex>;
}

/// Discount/markup scales.
pub trait AdjustmentScaleRepository: Send + Sync {
    /// Returns every scale in effect on `as_of`, latest effective date first.
    fn active_scales(&self, as_of: NaiveDate) -> Vec<&AdjustmentScale>;
}

/// Distance-banded freight rates.
pub trait FreightRateRepository: Send + Sync {
    /// Finds the freight rate for an origin and distance as of a date.
    fn find_freight_rate(
        &self,
        origin: &str,
        distance_km: Decimal,
        as_of: NaiveDate,
    ) -> BandLookup<'_, FreightRate>;
}

/// Truck capacities and billing floors.
pub trait TruckConfigRepository: Send + Sync {
    /// Returns the configuration of one truck type.
    fn truck_config(&self, truck_type: TruckType) -> Option<&TruckConfig>;
    /// Returns all configured truck types.
    fn truck_configs(&self) -> &[TruckConfig];
}

/// Distance-banded crane mobilization rates.
pub trait AssemblyRateRepository: Send + Sync {
    /// Finds the mobilization rate for a tonnage tier and distance as of a date.
    fn find_assembly_rate(
        &self,
        tier: TonnageTier,
        distance_km: Decimal,
        as_of: NaiveDate,
    ) -> BandLookup<'_, AssemblyRate>;
}

/// Engine policies and plant identity.
pub trait PolicySource: Send + Sync {
    /// Returns the plant metadata.
    fn plant(&self) -> &PlantMetadata;
    /// Returns the engine policies.
    fn policies(&self) -> &EnginePolicies;
}

/// Everything the calculators read.
pub trait ReferenceData:
    PieceRepository
    + MaterialRepository
    + CostParameterRepository
    + MonthlyIndexRepository
    + AdjustmentScaleRepository
    + FreightRateRepository
    + TruckConfigRepository
    + AssemblyRateRepository
    + PolicySource
{
}

impl<T> ReferenceData for T where
    T: PieceRepository
        + MaterialRepository
        + CostParameterRepository
        + MonthlyIndexRepository
        + AdjustmentScaleRepository
        + FreightRateRepository
        + TruckConfigRepository
        + AssemblyRateRepository
        + PolicySource
{
}
