//! Assembly (on-site erection) cost models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AuditTrace, TonnageTier};

/// Kind of assembly cost line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssemblyLineKind {
    /// Crane mobilization to site.
    CraneMobilization,
    /// Assembly crew days.
    Crew,
    /// Crane operating days.
    CraneDays,
}

/// One itemized assembly cost line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyLine {
    /// Line kind.
    pub kind: AssemblyLineKind,
    /// Human-readable description.
    pub description: String,
    /// Number of units (1 for mobilization, days otherwise).
    pub units: Decimal,
    /// Rate per unit.
    pub rate: Decimal,
    /// `units x rate`.
    pub amount: Decimal,
}

/// The complete result of an assembly cost estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyBreakdown {
    /// Unique identifier for this calculation.
    pub calculation_id: Uuid,
    /// When the calculation was performed.
    pub calculated_at: DateTime<Utc>,
    /// The version of the engine that performed the calculation.
    pub engine_version: String,
    /// Site distance in km.
    pub distance_km: Decimal,
    /// Total tons to erect.
    pub total_tons: Decimal,
    /// Tonnage tier derived from `total_tons`.
    pub tonnage_tier: TonnageTier,
    /// Itemized lines.
    pub lines: Vec<AssemblyLine>,
    /// Sum of all line amounts.
    pub total: Decimal,
    /// Audit trace of the calculation.
    pub audit_trace: AuditTrace,
}
