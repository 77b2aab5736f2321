//! Extraction error types.
//!
//! Required-field problems surface as [`ExtractionError`] and fail the whole
//! call. Problems with optional equipment, readings, or alarms surface as
//! [`EntityError`], which the extractor logs and drops.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// The five fields a production report must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredField {
    LineId,
    Shift,
    UnitsProduced,
    UnitsTarget,
    EfficiencyPercent,
}

impl RequiredField {
    /// All required fields, in extraction order.
    pub const ALL: [RequiredField; 5] = [
        RequiredField::LineId,
        RequiredField::Shift,
        RequiredField::UnitsProduced,
        RequiredField::UnitsTarget,
        RequiredField::EfficiencyPercent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequiredField::LineId => "line_id",
            RequiredField::Shift => "shift",
            RequiredField::UnitsProduced => "units_produced",
            RequiredField::UnitsTarget => "units_target",
            RequiredField::EfficiencyPercent => "efficiency_percent",
        }
    }

    /// Operator-facing hint describing what the field should contain.
    pub fn hint(&self) -> &'static str {
        match self {
            RequiredField::LineId => "Production line identifier",
            RequiredField::Shift => "Shift name (e.g., 'morning', 'afternoon', 'night')",
            RequiredField::UnitsProduced => "Number of units produced (non-negative integer)",
            RequiredField::UnitsTarget => "Target units (non-negative integer)",
            RequiredField::EfficiencyPercent => "Efficiency percentage (non-negative number)",
        }
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One required field that was found but failed conversion or range checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: RequiredField,
    pub reason: String,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Errors that fail an extraction call. No partial record accompanies them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    /// Input was empty or whitespace only.
    #[error("empty report text")]
    EmptyInput,

    /// No pattern for a required field matched.
    #[error("could not extract '{field}' from report")]
    MissingField {
        field: RequiredField,
    },

    /// Every required field matched, but at least one failed validation.
    #[error("extracted data failed validation: {}", join_violations(violations))]
    ValidationFailure {
        violations: Vec<FieldViolation>,
    },
}

impl ExtractionError {
    /// Required fields this error is about, in extraction order.
    pub fn fields(&self) -> Vec<RequiredField> {
        match self {
            ExtractionError::EmptyInput => Vec::new(),
            ExtractionError::MissingField { field } => vec![*field],
            ExtractionError::ValidationFailure { violations } => {
                violations.iter().map(|v| v.field).collect()
            }
        }
    }
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Validation failure of an optional sub-entity (equipment, reading, alarm).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{entity}.{field}: {reason}")]
pub struct EntityError {
    pub entity: &'static str,
    pub field: &'static str,
    pub reason: String,
}

impl EntityError {
    pub(crate) fn new(entity: &'static str, field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            entity,
            field,
            reason: reason.into(),
        }
    }
}
