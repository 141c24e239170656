//! Request types for the pricing engine API.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{BudgetPiece, Period};

fn default_quantity() -> u32 {
    1
}

/// Request body for `POST /pieces/cost`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PieceCostRequest {
    /// Catalog piece identifier.
    pub piece_id: String,
    /// Number of pieces to cost.
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    /// Escalation base month. Must be given together with `target_period`.
    #[serde(default)]
    pub base_period: Option<Period>,
    /// Escalation target month.
    #[serde(default)]
    pub target_period: Option<Period>,
    /// Date reference data is read as of. Defaults to today.
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

/// Where a job is delivered: an explicit distance or a named destination.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeliverySite {
    /// Known distance in km.
    #[serde(default)]
    pub distance_km: Option<Decimal>,
    /// Destination resolved through the distance table.
    #[serde(default)]
    pub destination: Option<String>,
}

/// How a request's distance should be obtained.
#[derive(Debug, Clone, PartialEq)]
pub enum DistanceSource {
    /// Use the given distance.
    Explicit(Decimal),
    /// Resolve the destination.
    Destination(String),
}

impl DeliverySite {
    /// Returns the distance source, requiring exactly one of the two fields.
    pub fn source(&self) -> EngineResult<DistanceSource> {
        match (self.distance_km, &self.destination) {
            (Some(km), None) => Ok(DistanceSource::Explicit(km)),
            (None, Some(destination)) => Ok(DistanceSource::Destination(destination.clone())),
            (Some(_), Some(_)) => Err(EngineError::invalid_input(
                "distance_km",
                "provide either distance_km or destination, not both",
            )),
            (None, None) => Err(EngineError::invalid_input(
                "distance_km",
                "either distance_km or destination is required",
            )),
        }
    }
}

/// Request body for `POST /freight`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreightRequest {
    /// Pieces to ship.
    pub pieces: Vec<BudgetPiece>,
    /// Dispatch origin. Defaults to the plant's origin.
    #[serde(default)]
    pub origin: Option<String>,
    /// Delivery site.
    #[serde(flatten)]
    pub site: DeliverySite,
    /// Date freight rates are read as of. Defaults to today.
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

/// Request body for `POST /assembly`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyRequest {
    /// Total tons to erect.
    pub total_tons: Decimal,
    /// Crew days on site.
    #[serde(default)]
    pub assembly_days: Decimal,
    /// Crane operating days.
    #[serde(default)]
    pub crane_days: Decimal,
    /// Origin used when resolving a destination. Defaults to the plant's origin.
    #[serde(default)]
    pub origin: Option<String>,
    /// Job site.
    #[serde(flatten)]
    pub site: DeliverySite,
    /// Date rates are read as of. Defaults to today.
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

/// Request body for `POST /indices/derive`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeriveIndexRequest {
    /// Month of the new snapshot.
    pub period: Period,
    /// Snapshot to derive from. Defaults to the latest loaded snapshot before `period`.
    #[serde(default)]
    pub previous_period: Option<Period>,
    /// New dollar exchange rate.
    pub dollar_rate: Decimal,
    /// New labor index.
    pub labor_index: Decimal,
    /// New concrete index.
    pub concrete_index: Decimal,
    /// New fuel index.
    pub fuel_index: Decimal,
}
