//! Freight models: budget pieces going in, truck loads and totals coming out.
//!
//! None of these are persisted by the engine. They live for the duration of
//! one freight calculation.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AuditTrace, TruckType};

/// Default stacking limit when a piece does not specify one.
pub const DEFAULT_MAX_STACKABLE: u32 = 10;

fn default_quantity() -> u32 {
    1
}

fn default_max_stackable() -> u32 {
    DEFAULT_MAX_STACKABLE
}

/// A piece line of a quotation that has to be shipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetPiece {
    /// Piece identifier.
    pub id: String,
    /// Weight of one unit in tons.
    pub weight_tons: Decimal,
    /// Length of one unit in metres.
    pub length_m: Decimal,
    /// Number of units.
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    /// Forces a dedicated truck per unit.
    #[serde(default)]
    pub individual: bool,
    /// Requires special handling, which forces a dedicated truck per unit.
    #[serde(default)]
    pub special_handling: bool,
    /// Maximum number of units a truck may already hold for this unit to be added.
    #[serde(default = "default_max_stackable")]
    pub max_stackable: u32,
    /// The load needs a road escort.
    #[serde(default)]
    pub requires_escort: bool,
}

/// Why a unit ships on its own truck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IndividualReason {
    /// The piece was explicitly flagged individual.
    Flagged,
    /// The piece needs special handling.
    SpecialHandling,
    /// The piece is heavier than the largest truck available.
    ExceedsLargestCapacity,
    /// The piece's length tier requires a dedicated vehicle.
    DedicatedTier,
}

/// How a truck was dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DispatchKind {
    /// Packed with groupable units.
    Grouped,
    /// A single unit classified as individual.
    Individual,
    /// A single unit heavier than the truck's capacity.
    OverCapacity,
}

/// One physical unit placed on a truck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadedUnit {
    /// The budget piece this unit belongs to.
    pub piece_id: String,
    /// Unit index within the piece (1-based).
    pub unit: u32,
    /// Weight of the unit in tons.
    pub weight_tons: Decimal,
}

/// A packed and billed truck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruckLoad {
    /// Sequential truck number (1-based).
    pub truck_number: u32,
    /// Truck type.
    pub truck_type: TruckType,
    /// How the truck was dispatched.
    pub dispatch: DispatchKind,
    /// Why the unit ships alone, for individual trucks.
    pub individual_reason: Option<IndividualReason>,
    /// Units on the truck, in placement order.
    pub units: Vec<LoadedUnit>,
    /// Truck capacity in tons.
    pub capacity_tons: Decimal,
    /// Carrier minimum billable tons.
    pub min_billable_tons: Decimal,
    /// Actual carried weight.
    pub real_tons: Decimal,
    /// Billed weight with no physical cargo behind it.
    pub false_tons: Decimal,
    /// Billed weight (`real_tons + false_tons`).
    pub total_tons: Decimal,
    /// Applied rate per billed ton per km.
    pub rate_per_ton_km: Decimal,
    /// True if any unit requires an escort.
    pub requires_escort: bool,
    /// Escort surcharge.
    pub escort_cost: Decimal,
    /// Freight cost including escort surcharge.
    pub cost: Decimal,
}

/// The freight rate row used for the calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedFreightRate {
    /// Rate identifier.
    pub rate_id: String,
    /// Origin of the rate row.
    pub origin: String,
    /// Lower bound of the band.
    pub km_from: Decimal,
    /// Upper bound of the band.
    pub km_to: Decimal,
    /// Rate for loads up to 12 m.
    pub rate_under_12m: Decimal,
    /// Rate for loads longer than 12 m.
    pub rate_over_12m: Decimal,
    /// Effective date of the row.
    pub effective_date: NaiveDate,
    /// True if the band did not contain the distance and the most recent row was used.
    pub fallback: bool,
}

/// Freight totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreightTotals {
    /// Sum of real tons over all trucks.
    pub total_real_tons: Decimal,
    /// Sum of false tons over all trucks.
    pub total_false_tons: Decimal,
    /// Sum of billed tons over all trucks.
    pub total_billed_tons: Decimal,
    /// Sum of escort surcharges.
    pub escort_cost: Decimal,
    /// Sum of truck costs.
    pub total_cost: Decimal,
}

/// Optimization metrics of the packing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreightMetrics {
    /// Number of trucks dispatched.
    pub trucks_used: u32,
    /// Mean of `real_tons / total_tons` over all trucks.
    pub avg_utilization: Decimal,
    /// Cost if every groupable unit shipped alone.
    pub hypothetical_individual_cost: Decimal,
    /// Cost of the trucks that carried groupable units.
    pub grouped_cost: Decimal,
    /// `hypothetical_individual_cost - grouped_cost`.
    pub saved_by_grouping: Decimal,
}

/// The complete result of a freight calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreightResult {
    /// Unique identifier for this calculation.
    pub calculation_id: Uuid,
    /// When the calculation was performed.
    pub calculated_at: DateTime<Utc>,
    /// The version of the engine that performed the calculation.
    pub engine_version: String,
    /// Dispatch origin.
    pub origin: String,
    /// Delivery distance in km.
    pub distance_km: Decimal,
    /// The rate row used, if any was found.
    pub rate: Option<AppliedFreightRate>,
    /// Dispatched trucks.
    pub trucks: Vec<TruckLoad>,
    /// Totals over all trucks.
    pub totals: FreightTotals,
    /// Optimization metrics.
    pub metrics: FreightMetrics,
    /// Audit trace of the calculation.
    pub audit_trace: AuditTrace,
}
