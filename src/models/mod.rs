//! Core data models for the pricing engine.
//!
//! This module contains the catalog and reference-data models the engine
//! reads, and the result models it produces.

mod assembly;
mod audit;
mod catalog;
mod cost_breakdown;
mod freight;
mod reference;

pub use assembly::{AssemblyBreakdown, AssemblyLine, AssemblyLineKind};
pub(crate) use audit::audit_decimal;
pub use audit::{AuditStep, AuditTrace, AuditWarning, WarningSeverity};
pub use catalog::{BomBasis, BomLine, Material, MaterialCategory, MaterialUnit, Piece, PieceFamily};
pub use cost_breakdown::{
    AdjustmentSource, AdjustmentSummary, CostBreakdown, EscalationRatios, EscalationStatus,
    EscalationSummary, GeneralCosts, MaterialCostLine,
};
pub use freight::{
    AppliedFreightRate, BudgetPiece, DEFAULT_MAX_STACKABLE, DispatchKind, FreightMetrics,
    FreightResult, FreightTotals, IndividualReason, LoadedUnit, TruckLoad,
};
pub use reference::{
    AdjustmentScale, AssemblyRate, CostParameter, FreightRate, MonthlyIndex, ParameterCategory,
    Period, TonnageTier, TruckConfig, TruckType,
};
