//! Catalog models: materials, pieces and their bills of materials.
//!
//! The catalog is owned by an external collaborator. The engine only reads it.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Broad material category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaterialCategory {
    /// Cement and ready-mix concrete.
    Concrete,
    /// Reinforcing and prestressing steel.
    Steel,
    /// Sand, gravel and crushed stone.
    Aggregate,
    /// Chemical admixtures.
    Additive,
    /// Cast-in inserts, lifting anchors and hardware.
    Insert,
    /// Anything else.
    Other,
}

/// Unit of measure a material is priced in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaterialUnit {
    /// Kilograms.
    Kg,
    /// Metric tons.
    Ton,
    /// Cubic metres.
    M3,
    /// Square metres.
    M2,
    /// Linear metres.
    M,
    /// Litres.
    L,
    /// Countable units.
    Unit,
}

impl MaterialUnit {
    /// Converts a quantity in this unit to metric tons, if the unit is a mass.
    ///
    /// ```
    /// use pricing_engine::models::MaterialUnit;
    /// use rust_decimal::Decimal;
    ///
    /// assert_eq!(MaterialUnit::Kg.to_tons(Decimal::from(2500)), Some(Decimal::new(25, 1)));
    /// assert_eq!(MaterialUnit::M3.to_tons(Decimal::ONE), None);
    /// ```
    pub fn to_tons(&self, quantity: Decimal) -> Option<Decimal> {
        match self {
            MaterialUnit::Kg => Some(quantity / Decimal::from(1000)),
            MaterialUnit::Ton => Some(quantity),
            _ => None,
        }
    }
}

/// A raw material with its current price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Unique identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Material category.
    pub category: MaterialCategory,
    /// Unit the price refers to.
    pub unit: MaterialUnit,
    /// Current price per unit.
    pub current_price: Decimal,
    /// Date the current price was set.
    pub price_updated_at: NaiveDate,
}

/// How a family expresses BOM quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BomBasis {
    /// Quantities are per produced piece.
    PerUnit,
    /// Quantities are per linear metre of piece length.
    PerLinearMeter,
    /// Quantities are per square metre of piece face (length x width).
    PerSquareMeter,
}

/// Product family of a precast piece.
///
/// Each family carries its own validation and BOM basis, so the rest of the
/// engine never branches on family name strings. The serialized name is the
/// family code matched by adjustment scales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PieceFamily {
    /// Hollow-core floor slabs, costed per linear metre.
    Entrepisos,
    /// W-type wall panels, costed per square metre.
    PanelesW,
    /// Noise-barrier panels.
    Antiruido,
    /// Beams.
    Vigas,
    /// Columns.
    Columnas,
    /// Pieces with no family-specific rules.
    Generic,
}

impl PieceFamily {
    /// Returns the family code used by adjustment scale category lists.
    pub fn code(&self) -> &'static str {
        match self {
            PieceFamily::Entrepisos => "ENTREPISOS",
            PieceFamily::PanelesW => "PANELES_W",
            PieceFamily::Antiruido => "ANTIRUIDO",
            PieceFamily::Vigas => "VIGAS",
            PieceFamily::Columnas => "COLUMNAS",
            PieceFamily::Generic => "GENERIC",
        }
    }

    /// Returns how BOM quantities are expressed for this family.
    pub fn bom_basis(&self) -> BomBasis {
        match self {
            PieceFamily::Entrepisos => BomBasis::PerLinearMeter,
            PieceFamily::PanelesW => BomBasis::PerSquareMeter,
            _ => BomBasis::PerUnit,
        }
    }

    /// Checks the family-specific dimensional requirements of a piece.
    pub fn validate(&self, piece: &Piece) -> EngineResult<()> {
        let needs_length = matches!(
            self,
            PieceFamily::Entrepisos | PieceFamily::PanelesW | PieceFamily::Antiruido
        );
        if needs_length {
            require_positive(&piece.id, "length_m", piece.length_m, self)?;
        }
        if *self == PieceFamily::PanelesW {
            require_positive(&piece.id, "width_m", piece.width_m, self)?;
        }
        Ok(())
    }

    /// Returns the multiplier that turns per-basis BOM quantities into
    /// per-piece quantities.
    ///
    /// Call [`PieceFamily::validate`] first; missing dimensions yield zero.
    pub fn basis_measure(&self, piece: &Piece) -> Decimal {
        match self.bom_basis() {
            BomBasis::PerUnit => Decimal::ONE,
            BomBasis::PerLinearMeter => piece.length_m.unwrap_or(Decimal::ZERO),
            BomBasis::PerSquareMeter => {
                piece.length_m.unwrap_or(Decimal::ZERO) * piece.width_m.unwrap_or(Decimal::ZERO)
            }
        }
    }
}

fn require_positive(
    piece_id: &str,
    field: &str,
    value: Option<Decimal>,
    family: &PieceFamily,
) -> EngineResult<()> {
    match value {
        Some(v) if v > Decimal::ZERO => Ok(()),
        _ => Err(EngineError::invalid_input(
            format!("{}.{}", piece_id, field),
            format!("family {} requires a positive {}", family.code(), field),
        )),
    }
}

/// One line of a piece's bill of materials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BomLine {
    /// Referenced material.
    pub material_id: String,
    /// Quantity of material per basis unit of the piece. Must be positive.
    pub quantity_per_unit: Decimal,
    /// Production loss in percent. Must not be negative.
    #[serde(default)]
    pub scrap_percent: Decimal,
}

impl BomLine {
    /// Returns the waste multiplier (`1 + scrap_percent / 100`).
    ///
    /// ```
    /// use pricing_engine::models::BomLine;
    /// use rust_decimal::Decimal;
    ///
    /// let line = BomLine {
    ///     material_id: "MAT-001".to_string(),
    ///     quantity_per_unit: Decimal::ONE,
    ///     scrap_percent: Decimal::from(5),
    /// };
    /// assert_eq!(line.waste_factor(), Decimal::new(105, 2));
    /// ```
    pub fn waste_factor(&self) -> Decimal {
        Decimal::ONE + self.scrap_percent / Decimal::ONE_HUNDRED
    }
}

/// A precast piece as defined in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Piece {
    /// Unique identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Product family.
    pub family: PieceFamily,
    /// Weight of one piece in metric tons.
    pub weight_tons: Decimal,
    /// Concrete volume of one piece in cubic metres.
    pub volume_m3: Decimal,
    /// Length in metres.
    #[serde(default)]
    pub length_m: Option<Decimal>,
    /// Width in metres.
    #[serde(default)]
    pub width_m: Option<Decimal>,
    /// Bill of materials.
    #[serde(default)]
    pub bom: Vec<BomLine>,
}
