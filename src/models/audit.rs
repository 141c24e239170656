//! Audit trace models shared by every calculation result.
//!
//! Each result carries the ordered steps the engine took and the warnings it
//! raised when it had to fall back to defaults, so a human reviewing a quote
//! can see which layer degraded.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single step in the audit trace recording a calculation decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// How serious a warning is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningSeverity {
    /// Informational, e.g. a parameter defaulted to its documented constant.
    Low,
    /// A layer was skipped or fell back; the number is usable but should be checked.
    Medium,
    /// The result is likely wrong without human review (e.g. no freight rate).
    High,
}

/// A warning generated during calculation.
///
/// Warnings indicate configuration gaps that did not prevent the
/// calculation but may require attention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level.
    pub severity: WarningSeverity,
}

/// The complete audit trace for a calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
    /// The total calculation duration in microseconds.
    pub duration_us: u64,
}

impl AuditTrace {
    /// Returns true if a warning with the given code was recorded.
    pub fn has_warning(&self, code: &str) -> bool {
        self.warnings.iter().any(|w| w.code == code)
    }

    /// Returns the step recorded for a rule, if any.
    pub fn step(&self, rule_id: &str) -> Option<&AuditStep> {
        self.steps.iter().find(|s| s.rule_id == rule_id)
    }
}

/// Formats a decimal for audit payloads without trailing zeros.
pub(crate) fn audit_decimal(value: Decimal) -> String {
    value.normalize().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_sample_trace() -> AuditTrace {
        AuditTrace {
            steps: vec![AuditStep {
                step_number: 1,
                rule_id: "materials_cost".to_string(),
                rule_name: "Materials Cost".to_string(),
                input: serde_json::json!({}),
                output: serde_json::json!({}),
                reasoning: "Test reasoning".to_string(),
            }],
            warnings: vec![AuditWarning {
                code: "NO_ACTIVE_SCALE".to_string(),
                message: "Test warning".to_string(),
                severity: WarningSeverity::Medium,
            }],
            duration_us: 1234,
        }
    }

    #[test]
    fn test_audit_trace_serialization() {
        let json = serde_json::to_string(&create_sample_trace()).unwrap();
        assert!(json.contains("\"duration_us\":1234"));
        assert!(json.contains("\"steps\":["));
        assert!(json.contains("\"severity\":\"medium\""));
    }

    #[test]
    fn test_has_warning_and_step_lookup() {
        let trace = create_sample_trace();
        assert!(trace.has_warning("NO_ACTIVE_SCALE"));
        assert!(!trace.has_warning("MONTHLY_INDEX_MISSING"));
        assert_eq!(trace.step("materials_cost").unwrap().step_number, 1);
        assert!(trace.step("escalation").is_none());
    }

    #[test]
    fn test_audit_decimal_strips_trailing_zeros() {
        assert_eq!(audit_decimal(Decimal::new(2100, 2)), "21");
        assert_eq!(audit_decimal(Decimal::new(1250, 3)), "1.25");
    }
}
