//! Decides whether a budget piece can share a truck.

use rust_decimal::Decimal;

use crate::config::FreightPolicy;
use crate::error::{EngineError, EngineResult};
use crate::models::{BudgetPiece, IndividualReason};

/// How a piece ships.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceClassification {
    /// Index into the policy's tier list.
    pub tier_index: usize,
    /// Why the piece ships alone, or `None` if it can be grouped.
    pub individual_reason: Option<IndividualReason>,
}

impl PieceClassification {
    /// Returns true if the piece can be packed with others.
    pub fn is_groupable(&self) -> bool {
        self.individual_reason.is_none()
    }
}

/// Classifies a piece into a length tier and decides if it ships alone.
///
/// Reasons are checked in order: explicit flag, special handling, weight
/// above the largest truck, then a dedicated tier.
///
/// # Errors
///
/// Returns [`EngineError::InvalidConfig`] if no tier accepts the piece's
/// length. [`PricingConfig::validate`](crate::config::PricingConfig::validate)
/// requires an unbounded last tier, so this only happens with an
/// unvalidated policy.
pub fn classify_piece(
    piece: &BudgetPiece,
    policy: &FreightPolicy,
    largest_capacity_tons: Decimal,
) -> EngineResult<PieceClassification> {
    let tier_index =
        policy
            .tier_index_for(piece.length_m)
            .ok_or_else(|| EngineError::InvalidConfig {
                message: format!(
                    "no freight tier accepts a length of {} m (piece '{}')",
                    piece.length_m, piece.id
                ),
            })?;

    let individual_reason = if piece.individual {
        Some(IndividualReason::Flagged)
    } else if piece.special_handling {
        Some(IndividualReason::SpecialHandling)
    } else if piece.weight_tons > largest_capacity_tons {
        Some(IndividualReason::ExceedsLargestCapacity)
    } else if policy.tiers[tier_index].dedicated {
        Some(IndividualReason::DedicatedTier)
    } else {
        None
    };

    Ok(PieceClassification {
        tier_index,
        individual_reason,
    })
}
