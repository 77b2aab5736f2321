//! Ordered pattern rules for SCADA report fields.
//!
//! Each required field has a list of patterns tried most specific first;
//! the first match wins and no scoring takes place. All patterns are
//! case-insensitive. Numeric captures accept a leading `-` so that range
//! validation, not pattern matching, rejects negative values.

use once_cell::sync::Lazy;
use regex::Regex;

use super::errors::RequiredField;

/// An ordered list of patterns for one required field. Capture group 1 holds
/// the value.
pub struct FieldRule {
    pub field: RequiredField,
    patterns: Vec<Regex>,
}

impl FieldRule {
    fn new(field: RequiredField, patterns: &[&str]) -> Self {
        Self {
            field,
            patterns: patterns.iter().map(|p| compile(p)).collect(),
        }
    }

    /// Value captured by the first matching pattern, trimmed.
    pub fn first_match<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.patterns.iter().find_map(|re| {
            re.captures(text)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().trim())
        })
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in extraction pattern must compile")
}

/// Rules for the required fields, in [`RequiredField::ALL`] order.
pub static REQUIRED_RULES: Lazy<Vec<FieldRule>> = Lazy::new(|| {
    vec![
        FieldRule::new(
            RequiredField::LineId,
            &[
                r"(?i)Production\s+Line(?:\s+ID)?[:\s]+([A-Za-z0-9_-]+)",
                r"(?i)\bLine(?:\s+ID)?[:\s]+([A-Za-z0-9_-]+)",
                r"(?i)\bline_id[:\s]+([A-Za-z0-9_-]+)",
            ],
        ),
        FieldRule::new(RequiredField::Shift, &[r"(?i)\bShift[:\s]+(\w+)"]),
        FieldRule::new(
            RequiredField::UnitsProduced,
            &[
                r"(?i)Units\s+Produced[:\s]+(-?\d+)",
                r"(?i)\bProduced[:\s]+(-?\d+)",
                r"(?i)\bunits_produced[:\s]+(-?\d+)",
            ],
        ),
        FieldRule::new(
            RequiredField::UnitsTarget,
            &[
                r"(?i)Units\s+Target[:\s]+(-?\d+)",
                r"(?i)\bTarget[:\s]+(-?\d+)",
                r"(?i)\bunits_target[:\s]+(-?\d+)",
            ],
        ),
        FieldRule::new(
            RequiredField::EfficiencyPercent,
            &[
                r"(?i)Efficiency(?:\s+Percent)?[:\s]+(-?\d+(?:\.\d+)?\s*%?)",
                r"(?i)\befficiency_percent[:\s]+(-?\d+(?:\.\d+)?\s*%?)",
                r"(?i)\befficiency[:\s]+(-?\d+(?:\.\d+)?\s*%?)",
            ],
        ),
    ]
});

/// `Equipment: ID - Name (status)`; groups: id, name, status keyword.
pub static EQUIPMENT_RE: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?i)Equipment[:\s]+([A-Za-z0-9_-]+)[ \t]*[-–][ \t]*([^(\n]+?)[ \t]*\((\w+)\)")
});

/// `Sensor: ID = value unit` (or `:` instead of `=`); groups: id, value, unit.
pub static SENSOR_RE: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?i)Sensor[:\s]+([A-Za-z0-9_-]+)[ \t]*[=:][ \t]*(-?\d+(?:\.\d+)?)[ \t]*(\S+)")
});

/// `Alarm: ID (severity) - message`; groups: id, severity keyword, message.
pub static ALARM_RE: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?i)Alarm[:\s]+([A-Za-z0-9_-]+)[ \t]*\((\w+)\)[ \t]*[-–:][ \t]*([^\n]+)")
});

/// Rule for `field`.
pub fn rule_for(field: RequiredField) -> &'static FieldRule {
    let idx = RequiredField::ALL
        .iter()
        .position(|f| *f == field)
        .unwrap_or_default();
    &REQUIRED_RULES[idx]
}
