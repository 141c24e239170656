//! Piece cost breakdown models.
//!
//! A [`CostBreakdown`] captures all three cost layers for one piece and
//! quantity: base cost (materials + general costs), adjustment scale and
//! price escalation.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AuditTrace, MaterialCategory, MaterialUnit, PieceFamily, Period};

/// Cost of one BOM line for the requested quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialCostLine {
    /// Material identifier.
    pub material_id: String,
    /// Material name.
    pub material_name: String,
    /// Material category.
    pub category: MaterialCategory,
    /// Unit the quantity and price refer to.
    pub unit: MaterialUnit,
    /// BOM quantity per basis unit.
    pub quantity_per_unit: Decimal,
    /// Basis measure of one piece (1, metres or square metres).
    pub basis_measure: Decimal,
    /// Waste multiplier (`1 + scrap/100`).
    pub waste_factor: Decimal,
    /// Total quantity including waste for the whole order.
    pub total_quantity: Decimal,
    /// Material price per unit.
    pub unit_price: Decimal,
    /// `total_quantity x unit_price`.
    pub cost: Decimal,
}

/// General (non-material) cost components for the requested quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralCosts {
    /// Total concrete weight in tons.
    pub weight_tons: Decimal,
    /// Total concrete volume in cubic metres.
    pub volume_m3: Decimal,
    /// Total steel weight in tons.
    pub steel_weight_tons: Decimal,
    /// Energy charge.
    pub energy: Decimal,
    /// Factory overhead charge.
    pub factory_overhead: Decimal,
    /// Company overhead charge.
    pub company_overhead: Decimal,
    /// Utility charge.
    pub utility: Decimal,
    /// Engineering charge.
    pub engineering: Decimal,
    /// Concrete filling labor charge.
    pub filling_labor: Decimal,
    /// Steel working labor charge.
    pub steel_labor: Decimal,
    /// Sum of all components.
    pub total: Decimal,
}

/// Where the layer-2 adjustment came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentSource {
    /// An active adjustment scale was applied.
    Scale,
    /// No scale was active; the base cost passed through unchanged.
    Identity,
    /// No scale was active; the legacy constant factors were applied.
    Legacy,
}

/// Summary of the adjustment layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentSummary {
    /// Where the factors came from.
    pub source: AdjustmentSource,
    /// The applied scale, if any.
    pub scale_id: Option<String>,
    /// `(1 + discount/100) x (1 + adjustment/100)`, or the legacy equivalent.
    pub general_factor: Decimal,
    /// Family-specific factor, when the piece family was covered.
    pub special_factor: Option<Decimal>,
    /// Product of all applied factors.
    pub combined_factor: Decimal,
}

/// Outcome of the escalation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationStatus {
    /// No periods were requested; K = 1.
    NotRequested,
    /// Both indices were found and K was computed.
    Applied,
    /// At least one index was missing; K = 1.
    IndexMissing,
    /// The base index had a zero sub-index; K = 1.
    IndexInvalid,
}

/// Sub-index ratios (target / base) feeding the polynomial formula.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationRatios {
    /// Steel ratio.
    pub steel: Decimal,
    /// Labor ratio.
    pub labor: Decimal,
    /// Concrete ratio.
    pub concrete: Decimal,
    /// Fuel ratio.
    pub fuel: Decimal,
}

/// Summary of the escalation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationSummary {
    /// Period the cost was computed in.
    pub base_period: Option<Period>,
    /// Period the cost is re-priced for.
    pub target_period: Option<Period>,
    /// How the layer resolved.
    pub status: EscalationStatus,
    /// Ratios, when both indices were usable.
    pub ratios: Option<EscalationRatios>,
    /// The escalation factor K.
    pub k_factor: Decimal,
}

/// The complete cost breakdown of a piece for a given quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBreakdown {
    /// Unique identifier for this calculation.
    pub calculation_id: Uuid,
    /// When the calculation was performed.
    pub calculated_at: DateTime<Utc>,
    /// The version of the engine that performed the calculation.
    pub engine_version: String,
    /// Date reference data was read as of.
    pub as_of: NaiveDate,
    /// Piece identifier.
    pub piece_id: String,
    /// Piece name.
    pub piece_name: String,
    /// Piece family.
    pub family: PieceFamily,
    /// Number of pieces costed.
    pub quantity: u32,
    /// Per-material cost lines.
    pub materials: Vec<MaterialCostLine>,
    /// Sum of material line costs.
    pub materials_cost: Decimal,
    /// General cost components.
    pub general_costs: GeneralCosts,
    /// `materials_cost + general_costs.total`.
    pub base_cost: Decimal,
    /// Adjustment layer details.
    pub adjustment: AdjustmentSummary,
    /// Cost after the adjustment layer.
    pub adjusted_cost: Decimal,
    /// Escalation layer details.
    pub escalation: EscalationSummary,
    /// The escalation factor K.
    pub k_factor: Decimal,
    /// `adjusted_cost x K`.
    pub final_cost: Decimal,
    /// `final_cost / quantity`.
    pub unit_cost: Decimal,
    /// Same as `final_cost`.
    pub total_cost: Decimal,
    /// Audit trace of the calculation.
    pub audit_trace: AuditTrace,
}
