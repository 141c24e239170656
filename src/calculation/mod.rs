//! Calculation logic for the pricing engine.
//!
//! Piece costing runs four layers: bill-of-materials cost and general costs,
//! the adjustment scale, then index escalation. Freight classifies pieces,
//! packs groupable units into trucks per length tier and bills each truck
//! against its minimum tonnage. Assembly prices crane mobilization and crew
//! days. The reference-data update contract derives new material prices and
//! monthly indices without persisting them.

mod adjustment;
mod assembly;
mod bin_packing;
mod escalation;
mod false_tonnage;
mod freight_classifier;
mod freight_cost;
mod limits;
mod material_formula;
mod overhead;
mod piece_cost;
mod reference_update;
pub mod warnings;

pub use adjustment::{AdjustmentResult, apply_adjustment};
pub use assembly::calculate_assembly;
pub use bin_packing::{PackItem, PackedBin, first_fit_decreasing};
pub use escalation::{EscalationResult, apply_escalation, escalation_factor};
pub use false_tonnage::{TonnageBill, bill_tonnage, floor_applies};
pub use freight_classifier::{PieceClassification, classify_piece};
pub use freight_cost::calculate_freight;
pub use limits::{
    MAX_ASSEMBLY_DAYS, MAX_ASSEMBLY_TONS, MAX_DISTANCE_KM, MAX_PIECE_LENGTH_M,
    MAX_PIECE_QUANTITY, MAX_PIECE_WEIGHT_TONS,
};
pub use material_formula::{MaterialsCostResult, calculate_materials_cost, resolve_bom};
pub use overhead::{
    ASSEMBLY_CRANE_DAILY, ASSEMBLY_CREW_DAILY, COMPANY_OVERHEAD_PER_TON, ENERGY_PER_TON,
    ENGINEERING_PER_TON, FACTORY_OVERHEAD_PER_TON, FILLING_LABOR_PER_M3, GeneralCostsResult,
    LABOR_HOURLY_RATE, ResolvedParameter, STEEL_LABOR_HOURS_PER_TON, UTILITY_PER_TON,
    calculate_general_costs, default_parameter_value, resolve_parameter,
};
pub use piece_cost::calculate_piece_cost;
pub use reference_update::{derive_monthly_index, reprice_material};
