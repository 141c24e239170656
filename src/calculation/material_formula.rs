//! Materials cost from a piece's bill of materials.
//!
//! Each BOM line contributes
//! `quantity_per_unit x basis_measure x quantity x waste_factor x unit_price`,
//! where the basis measure comes from the piece family (1 for per-unit
//! families, metres for slabs, square metres for wall panels).

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, AuditWarning, Material, MaterialCategory, MaterialCostLine, Piece, WarningSeverity,
    audit_decimal,
};
use crate::repository::MaterialRepository;

use super::warnings::{STEEL_UNIT_NOT_MASS, configuration_gap};

/// The result of a materials cost calculation.
#[derive(Debug, Clone)]
pub struct MaterialsCostResult {
    /// One line per BOM line, in BOM order.
    pub lines: Vec<MaterialCostLine>,
    /// Sum of line costs.
    pub total: Decimal,
    /// Steel weight in tons for the whole order, before waste.
    pub steel_weight_tons: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
    /// Gaps found while computing the steel weight.
    pub warnings: Vec<AuditWarning>,
}

/// Checks that a piece can be costed and returns its BOM materials in BOM order.
///
/// # Errors
///
/// - [`EngineError::FormulaNotFound`] if the piece has no BOM lines
/// - [`EngineError::InvalidInput`] if the family's dimensional rules fail
/// - [`EngineError::InvalidBomLine`] for a non-positive quantity or negative scrap
/// - [`EngineError::MaterialNotFound`] for the first BOM line whose material is unknown
pub fn resolve_bom<'a, M>(piece: &Piece, materials: &'a M) -> EngineResult<Vec<&'a Material>>
where
    M: MaterialRepository + ?Sized,
{
    if piece.bom.is_empty() {
        return Err(EngineError::FormulaNotFound {
            piece_id: piece.id.clone(),
        });
    }

    piece.family.validate(piece)?;

    for line in &piece.bom {
        let message = if line.quantity_per_unit <= Decimal::ZERO {
            Some(format!(
                "quantity_per_unit must be positive, got {}",
                line.quantity_per_unit
            ))
        } else if line.scrap_percent < Decimal::ZERO {
            Some(format!(
                "scrap_percent must not be negative, got {}",
                line.scrap_percent
            ))
        } else {
            None
        };
        if let Some(message) = message {
            return Err(EngineError::InvalidBomLine {
                piece_id: piece.id.clone(),
                material_id: line.material_id.clone(),
                message,
            });
        }
    }

    let ids: Vec<&str> = piece.bom.iter().map(|l| l.material_id.as_str()).collect();
    let found = materials.materials_by_ids(&ids);

    piece
        .bom
        .iter()
        .map(|line| {
            found
                .iter()
                .find(|m| m.id == line.material_id)
                .copied()
                .ok_or_else(|| EngineError::MaterialNotFound {
                    piece_id: piece.id.clone(),
                    material_id: line.material_id.clone(),
                })
        })
        .collect()
}

/// Calculates the materials cost of `quantity` pieces.
///
/// # Arguments
///
/// * `piece` - The catalog piece
/// * `quantity` - Number of pieces, at least 1
/// * `materials` - Material lookup
/// * `step_number` - The audit step number to use
///
/// # Errors
///
/// See [`resolve_bom`].
pub fn calculate_materials_cost<M>(
    piece: &Piece,
    quantity: u32,
    materials: &M,
    step_number: u32,
) -> EngineResult<MaterialsCostResult>
where
    M: MaterialRepository + ?Sized,
{
    let resolved = resolve_bom(piece, materials)?;
    let basis_measure = piece.family.basis_measure(piece);
    let qty = Decimal::from(quantity);

    let mut lines = Vec::with_capacity(piece.bom.len());
    let mut steel_weight_tons = Decimal::ZERO;
    let mut warnings = Vec::new();

    for (line, material) in piece.bom.iter().zip(resolved) {
        let base_quantity = line.quantity_per_unit * basis_measure * qty;
        let waste_factor = line.waste_factor();
        let total_quantity = base_quantity * waste_factor;
        let cost = total_quantity * material.current_price;

        if material.category == MaterialCategory::Steel {
            match material.unit.to_tons(base_quantity) {
                Some(tons) => steel_weight_tons += tons,
                None => warnings.push(configuration_gap(
                    STEEL_UNIT_NOT_MASS,
                    WarningSeverity::Low,
                    format!(
                        "Steel material '{}' is measured in {:?}; excluded from steel weight",
                        material.id, material.unit
                    ),
                )),
            }
        }

        lines.push(MaterialCostLine {
            material_id: material.id.clone(),
            material_name: material.name.clone(),
            category: material.category,
            unit: material.unit,
            quantity_per_unit: line.quantity_per_unit,
            basis_measure,
            waste_factor,
            total_quantity,
            unit_price: material.current_price,
            cost,
        });
    }

    let total: Decimal = lines.iter().map(|l| l.cost).sum();

    let audit_step = AuditStep {
        step_number,
        rule_id: "materials_cost".to_string(),
        rule_name: "Materials Cost".to_string(),
        input: serde_json::json!({
            "piece_id": piece.id,
            "family": piece.family.code(),
            "bom_basis": piece.family.bom_basis(),
            "basis_measure": audit_decimal(basis_measure),
            "quantity": quantity,
            "bom_lines": piece.bom.len()
        }),
        output: serde_json::json!({
            "materials_cost": audit_decimal(total),
            "steel_weight_tons": audit_decimal(steel_weight_tons)
        }),
        reasoning: format!(
            "{} BOM lines x {} pieces (basis measure {}) = ${}",
            lines.len(),
            quantity,
            audit_decimal(basis_measure),
            audit_decimal(total)
        ),
    };

    Ok(MaterialsCostResult {
        lines,
        total,
        steel_weight_tons,
        audit_step,
        warnings,
    })
}
