//! Error types for the pricing engine.
//!
//! Hard failures (missing pieces, undefined formulas, invalid input) are
//! returned as [`EngineError`]. Configuration gaps such as a missing monthly
//! index or an absent adjustment scale are *not* errors: the engine computes
//! with identity/fallback values and records an
//! [`AuditWarning`](crate::models::AuditWarning) instead.

use thiserror::Error;

/// The main error type for the pricing engine.
///
/// # Example
///
/// ```
/// use pricing_engine::error::EngineError;
///
/// let error = EngineError::FormulaNotFound {
///     piece_id: "VIG-30".to_string(),
/// };
/// assert_eq!(error.to_string(), "No bill of materials defined for piece 'VIG-30'");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Configuration parsed but is internally inconsistent.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// A description of the inconsistency.
        message: String,
    },

    /// The requested piece does not exist in the catalog.
    #[error("Piece not found: {piece_id}")]
    PieceNotFound {
        /// The piece identifier.
        piece_id: String,
    },

    /// A material referenced by a bill of materials does not exist.
    #[error("Material '{material_id}' referenced by piece '{piece_id}' not found")]
    MaterialNotFound {
        /// The piece whose BOM references the material.
        piece_id: String,
        /// The missing material identifier.
        material_id: String,
    },

    /// The piece exists but has no bill of materials, so its cost is undefined.
    #[error("No bill of materials defined for piece '{piece_id}'")]
    FormulaNotFound {
        /// The piece identifier.
        piece_id: String,
    },

    /// A bill of materials line carries invalid quantities.
    #[error("Invalid BOM line for material '{material_id}' on piece '{piece_id}': {message}")]
    InvalidBomLine {
        /// The piece identifier.
        piece_id: String,
        /// The material identifier of the offending line.
        material_id: String,
        /// A description of what made the line invalid.
        message: String,
    },

    /// A calculation input was invalid.
    #[error("Invalid input '{field}': {message}")]
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// No distance is known between an origin and a destination.
    #[error("No distance known from '{origin}' to '{destination}'")]
    DistanceNotFound {
        /// The dispatch origin.
        origin: String,
        /// The delivery destination.
        destination: String,
    },

    /// Distance resolution did not finish before its deadline.
    #[error("Distance resolution timed out after {timeout_ms} ms")]
    DistanceTimeout {
        /// The deadline that was exceeded, in milliseconds.
        timeout_ms: u64,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

impl EngineError {
    /// Shorthand for an [`EngineError::InvalidInput`].
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
