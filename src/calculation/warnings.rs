//! Configuration-gap warnings.
//!
//! A gap never fails a calculation. The engine falls back to a documented
//! default, records one of these codes in the audit trace and logs it.

use tracing::warn;

use crate::models::{AuditWarning, WarningSeverity};

/// A cost parameter had no active version; its default constant was used.
pub const COST_PARAMETER_DEFAULT: &str = "COST_PARAMETER_DEFAULT";
/// A steel BOM line is not priced in a mass unit and was left out of the steel weight.
pub const STEEL_UNIT_NOT_MASS: &str = "STEEL_UNIT_NOT_MASS";
/// No adjustment scale was active.
pub const NO_ACTIVE_SCALE: &str = "NO_ACTIVE_SCALE";
/// More than one adjustment scale was active; the latest was used.
pub const MULTIPLE_ACTIVE_SCALES: &str = "MULTIPLE_ACTIVE_SCALES";
/// A monthly index needed for escalation was missing.
pub const MONTHLY_INDEX_MISSING: &str = "MONTHLY_INDEX_MISSING";
/// The base monthly index had a zero sub-index.
pub const MONTHLY_INDEX_INVALID: &str = "MONTHLY_INDEX_INVALID";
/// No freight rate band covered the distance; the most recent rate was used.
pub const FREIGHT_RATE_FALLBACK: &str = "FREIGHT_RATE_FALLBACK";
/// No freight rate exists for the origin; freight was costed at zero.
pub const FREIGHT_RATE_MISSING: &str = "FREIGHT_RATE_MISSING";
/// No mobilization band covered the distance; the most recent rate was used.
pub const ASSEMBLY_RATE_FALLBACK: &str = "ASSEMBLY_RATE_FALLBACK";
/// No mobilization rate exists for the tonnage tier; mobilization was costed at zero.
pub const ASSEMBLY_RATE_MISSING: &str = "ASSEMBLY_RATE_MISSING";

/// Builds an audit warning and logs it.
pub(crate) fn configuration_gap(
    code: &str,
    severity: WarningSeverity,
    message: impl Into<String>,
) -> AuditWarning {
    let message = message.into();
    warn!(code, ?severity, %message, "Configuration gap");
    AuditWarning {
        code: code.to_string(),
        message,
        severity,
    }
}
