//! StructuredExtractor: free-form SCADA report text to [`ProductionMetrics`].
//!
//! Required fields are all-or-nothing: a missing field fails the call at
//! once, and conversion/range problems are collected across every required
//! field before failing. Equipment, sensor readings, and alarms are
//! best-effort enrichment: an entry that does not validate is dropped and
//! logged at debug level, never failing the call.

use std::ops::Range;

use super::errors::{EntityError, ExtractionError, FieldViolation, RequiredField};
use super::models::{
    AlarmInfo, AlarmSeverity, EquipmentState, EquipmentStatus, ProductionMetrics, SensorReading,
};
use super::rules::{rule_for, ALARM_RE, EQUIPMENT_RE, SENSOR_RE};

/// Where sensor readings and alarms are looked for when building an
/// equipment entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubEntityScope {
    /// Scan the whole report. Every equipment entry receives every reading
    /// and alarm in the document.
    #[default]
    Document,
    /// Scan only the text between an equipment header and the next one.
    Block,
}

/// Parses production reports. Stateless; safe to share across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuredExtractor {
    scope: SubEntityScope,
}

impl StructuredExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scope(scope: SubEntityScope) -> Self {
        Self { scope }
    }

    pub fn scope(&self) -> SubEntityScope {
        self.scope
    }

    /// Extract a validated record from `raw_text`.
    pub fn extract(&self, raw_text: &str) -> Result<ProductionMetrics, ExtractionError> {
        let text = raw_text.trim();
        if text.is_empty() {
            return Err(ExtractionError::EmptyInput);
        }

        let raw_line = capture(text, RequiredField::LineId)?;
        let raw_shift = capture(text, RequiredField::Shift)?;
        let raw_produced = capture(text, RequiredField::UnitsProduced)?;
        let raw_target = capture(text, RequiredField::UnitsTarget)?;
        let raw_efficiency = capture(text, RequiredField::EfficiencyPercent)?;

        let mut violations = Vec::new();
        let line_id = parse_text(RequiredField::LineId, raw_line, &mut violations);
        let shift = parse_text(RequiredField::Shift, raw_shift, &mut violations);
        let units_produced = parse_count(RequiredField::UnitsProduced, raw_produced, &mut violations);
        let units_target = parse_count(RequiredField::UnitsTarget, raw_target, &mut violations);
        let efficiency_percent =
            parse_percent(RequiredField::EfficiencyPercent, raw_efficiency, &mut violations);

        let (
            Some(line_id),
            Some(shift),
            Some(units_produced),
            Some(units_target),
            Some(efficiency_percent),
        ) = (line_id, shift, units_produced, units_target, efficiency_percent)
        else {
            tracing::debug!(count = violations.len(), "required field validation failed");
            return Err(ExtractionError::ValidationFailure { violations });
        };

        let equipment = self.extract_equipment(text);

        tracing::debug!(
            line_id = %line_id,
            equipment = equipment.len(),
            "extracted production metrics"
        );

        Ok(ProductionMetrics {
            line_id,
            shift,
            units_produced,
            units_target,
            efficiency_percent,
            equipment,
        })
    }

    // ─── Optional enrichment ────────────────────────────────────────────

    fn extract_equipment(&self, text: &str) -> Vec<EquipmentStatus> {
        let headers: Vec<_> = EQUIPMENT_RE.captures_iter(text).collect();
        let mut equipment = Vec::with_capacity(headers.len());

        for (i, caps) in headers.iter().enumerate() {
            let region = match self.scope {
                SubEntityScope::Document => 0..text.len(),
                SubEntityScope::Block => {
                    let start = caps.get(0).map_or(0, |m| m.end());
                    let end = headers
                        .get(i + 1)
                        .and_then(|next| next.get(0))
                        .map_or(text.len(), |m| m.start());
                    start..end
                }
            };

            match build_equipment(text, caps, region) {
                Ok(entry) => equipment.push(entry),
                Err(e) => tracing::debug!(error = %e, "dropping equipment entry"),
            }
        }

        equipment
    }
}

/// Extract with the default (document-wide) sub-entity scope.
pub fn extract(raw_text: &str) -> Result<ProductionMetrics, ExtractionError> {
    StructuredExtractor::default().extract(raw_text)
}

// ─── Required fields ────────────────────────────────────────────────────────

fn capture(text: &str, field: RequiredField) -> Result<&str, ExtractionError> {
    rule_for(field)
        .first_match(text)
        .ok_or(ExtractionError::MissingField { field })
}

fn parse_text(field: RequiredField, raw: &str, violations: &mut Vec<FieldViolation>) -> Option<String> {
    let value = raw.trim();
    if value.is_empty() {
        violations.push(FieldViolation {
            field,
            reason: "must not be empty".into(),
        });
        return None;
    }
    Some(value.to_string())
}

fn parse_count(field: RequiredField, raw: &str, violations: &mut Vec<FieldViolation>) -> Option<u64> {
    match raw.trim().parse::<i64>() {
        Ok(n) if n < 0 => {
            violations.push(FieldViolation {
                field,
                reason: format!("must be greater than or equal to 0 (got {n})"),
            });
            None
        }
        Ok(n) => Some(n as u64),
        Err(e) => {
            violations.push(FieldViolation {
                field,
                reason: format!("'{raw}' is not a valid integer: {e}"),
            });
            None
        }
    }
}

fn parse_percent(field: RequiredField, raw: &str, violations: &mut Vec<FieldViolation>) -> Option<f64> {
    let number = raw.trim().trim_end_matches('%').trim_end();
    match number.parse::<f64>() {
        Ok(v) if !v.is_finite() => {
            violations.push(FieldViolation {
                field,
                reason: format!("'{raw}' is not a finite number"),
            });
            None
        }
        Ok(v) if v < 0.0 => {
            violations.push(FieldViolation {
                field,
                reason: format!("must be greater than or equal to 0 (got {v})"),
            });
            None
        }
        Ok(v) => Some(v),
        Err(e) => {
            violations.push(FieldViolation {
                field,
                reason: format!("'{raw}' is not a valid number: {e}"),
            });
            None
        }
    }
}

// ─── Sub-entities ───────────────────────────────────────────────────────────

fn build_equipment(
    text: &str,
    caps: &regex::Captures<'_>,
    region: Range<usize>,
) -> Result<EquipmentStatus, EntityError> {
    let id = group(caps, 1);
    let name = group(caps, 2);
    let keyword = group(caps, 3);

    let status = EquipmentState::from_keyword(keyword).ok_or_else(|| {
        EntityError::new("equipment", "status", format!("unknown status '{keyword}'"))
    })?;

    let scoped = &text[region];
    EquipmentStatus::new(id, name, status, extract_readings(scoped), extract_alarms(scoped))
}

fn extract_readings(text: &str) -> Vec<SensorReading> {
    SENSOR_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let id = group(&caps, 1);
            let parsed = group(&caps, 2)
                .parse::<f64>()
                .map_err(|e| EntityError::new("sensor_reading", "value", e.to_string()))
                .and_then(|value| SensorReading::new(id, value, group(&caps, 3)));
            match parsed {
                Ok(reading) => Some(reading),
                Err(e) => {
                    tracing::debug!(sensor = %id, error = %e, "dropping sensor reading");
                    None
                }
            }
        })
        .collect()
}

fn extract_alarms(text: &str) -> Vec<AlarmInfo> {
    ALARM_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let id = group(&caps, 1);
            let keyword = group(&caps, 2);
            let parsed = AlarmSeverity::from_keyword(keyword)
                .ok_or_else(|| {
                    EntityError::new("alarm", "severity", format!("unknown severity '{keyword}'"))
                })
                .and_then(|severity| AlarmInfo::new(id, severity, group(&caps, 3)));
            match parsed {
                Ok(alarm) => Some(alarm),
                Err(e) => {
                    tracing::debug!(alarm = %id, error = %e, "dropping alarm");
                    None
                }
            }
        })
        .collect()
}

fn group<'t>(caps: &regex::Captures<'t>, idx: usize) -> &'t str {
    caps.get(idx).map_or("", |m| m.as_str().trim())
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC_REPORT: &str =
        "Production Line: LINE-001\nShift: Morning\nUnits Produced: 450\nTarget: 500\nEfficiency: 90%";

    const EQUIPMENT_REPORT: &str = "\
Production Line: LINE-002
Shift: Night
Units Produced: 980
Units Target: 950
Efficiency: 103.2%

Equipment: PUMP-01 - Main Coolant Pump (running)
Sensor: TEMP-01 = 72.5 C
Alarm: ALM-01 (high) - Bearing temperature high

Equipment: CONV-02 - Conveyor Belt (maintenance)
Sensor: SPD-02 = 1.2 m/s
";

    #[test]
    fn test_empty_input() {
        assert_eq!(extract(""), Err(ExtractionError::EmptyInput));
        assert_eq!(extract("   "), Err(ExtractionError::EmptyInput));
        assert_eq!(extract("\n\t \n"), Err(ExtractionError::EmptyInput));
    }

    #[test]
    fn test_basic_report() {
        let m = extract(BASIC_REPORT).unwrap();
        assert_eq!(m.line_id, "LINE-001");
        assert_eq!(m.shift, "Morning");
        assert_eq!(m.units_produced, 450);
        assert_eq!(m.units_target, 500);
        assert_eq!(m.efficiency_percent, 90.0);
        assert!(m.equipment.is_empty());
    }

    #[test]
    fn test_missing_shift() {
        let text = "Production Line: LINE-001\nUnits Produced: 450\nTarget: 500\nEfficiency: 90%";
        assert_eq!(
            extract(text),
            Err(ExtractionError::MissingField {
                field: RequiredField::Shift
            })
        );
    }

    #[test]
    fn test_missing_field_reported_in_extraction_order() {
        // Both line and efficiency are absent; line is checked first.
        let text = "Shift: Day\nUnits Produced: 1\nTarget: 2";
        assert_eq!(
            extract(text).unwrap_err().fields(),
            vec![RequiredField::LineId]
        );
    }

    #[test]
    fn test_negative_units_produced_is_validation_failure() {
        let text = "Production Line: LINE-001\nShift: Morning\nUnits Produced: -5\nTarget: 500\nEfficiency: 90%";
        match extract(text) {
            Err(ExtractionError::ValidationFailure { violations }) => {
                assert_eq!(violations.len(), 1);
                assert_eq!(violations[0].field, RequiredField::UnitsProduced);
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn test_all_violations_collected_in_one_pass() {
        let text = "Line: L1\nShift: A\nUnits Produced: -1\nTarget: -2\nEfficiency: -3.5%";
        let err = extract(text).unwrap_err();
        assert_eq!(
            err.fields(),
            vec![
                RequiredField::UnitsProduced,
                RequiredField::UnitsTarget,
                RequiredField::EfficiencyPercent,
            ]
        );
    }

    #[test]
    fn test_integer_overflow_is_validation_failure() {
        let text = "Line: L1\nShift: A\nUnits Produced: 99999999999999999999\nTarget: 5\nEfficiency: 1";
        let err = extract(text).unwrap_err();
        assert_eq!(err.fields(), vec![RequiredField::UnitsProduced]);
    }

    #[test]
    fn test_efficiency_without_percent_and_above_hundred() {
        let text = "Line: L1\nShift: A\nProduced: 10\nunits_target: 8\nEfficiency Percent: 125.5";
        let m = extract(text).unwrap();
        assert_eq!(m.efficiency_percent, 125.5);
        assert_eq!(m.units_produced, 10);
        assert_eq!(m.units_target, 8);
        assert!(m.target_met());
    }

    #[test]
    fn test_case_insensitive_labels() {
        let text = "PRODUCTION LINE: l-9\nshift: swing\nunits produced: 3\ntarget: 4\nefficiency: 75";
        let m = extract(text).unwrap();
        assert_eq!(m.line_id, "l-9");
        assert_eq!(m.shift, "swing");
    }

    #[test]
    fn test_unknown_equipment_status_dropped() {
        let text = format!(
            "{BASIC_REPORT}\nEquipment: MIX-01 - Mixer (unknown)\nEquipment: PUMP-01 - Pump (stopped)"
        );
        let m = extract(&text).unwrap();
        assert_eq!(m.equipment.len(), 1);
        assert_eq!(m.equipment[0].equipment_id, "PUMP-01");
        assert_eq!(m.equipment[0].status, EquipmentState::Stopped);
    }

    #[test]
    fn test_only_invalid_equipment_still_succeeds() {
        let text = format!("{BASIC_REPORT}\nEquipment: MIX-01 - Mixer (unknown)");
        let m = extract(&text).unwrap();
        assert!(m.equipment.is_empty());
    }

    #[test]
    fn test_invalid_alarm_severity_dropped() {
        let text = format!(
            "{BASIC_REPORT}\nEquipment: P-1 - Pump (fault)\nAlarm: A1 (urgent) - Leak\nAlarm: A2 (Critical) - Seal failure"
        );
        let m = extract(&text).unwrap();
        let alarms = &m.equipment[0].active_alarms;
        assert_eq!(alarms.len(), 1);
        assert_eq!(alarms[0].alarm_id, "A2");
        assert_eq!(alarms[0].severity, AlarmSeverity::Critical);
        assert_eq!(alarms[0].message, "Seal failure");
        assert!(!alarms[0].acknowledged);
    }

    #[test]
    fn test_document_scope_attaches_every_reading_to_every_equipment() {
        // Compatibility behaviour: sub-entities are not scoped to their block.
        let m = extract(EQUIPMENT_REPORT).unwrap();
        assert_eq!(m.equipment.len(), 2);
        for entry in &m.equipment {
            let ids: Vec<_> = entry.readings.iter().map(|r| r.sensor_id.as_str()).collect();
            assert_eq!(ids, vec!["TEMP-01", "SPD-02"]);
            assert_eq!(entry.active_alarms.len(), 1);
        }
    }

    #[test]
    fn test_block_scope_keeps_readings_with_their_equipment() {
        let extractor = StructuredExtractor::with_scope(SubEntityScope::Block);
        let m = extractor.extract(EQUIPMENT_REPORT).unwrap();
        assert_eq!(m.equipment.len(), 2);

        let pump = &m.equipment[0];
        assert_eq!(pump.name, "Main Coolant Pump");
        assert_eq!(pump.status, EquipmentState::Running);
        assert_eq!(pump.readings.len(), 1);
        assert_eq!(pump.readings[0].sensor_id, "TEMP-01");
        assert_eq!(pump.readings[0].value, 72.5);
        assert_eq!(pump.readings[0].unit, "C");
        assert_eq!(pump.worst_alarm(), Some(AlarmSeverity::High));

        let conveyor = &m.equipment[1];
        assert_eq!(conveyor.status, EquipmentState::Maintenance);
        assert_eq!(conveyor.readings.len(), 1);
        assert_eq!(conveyor.readings[0].unit, "m/s");
        assert!(conveyor.active_alarms.is_empty());
    }

    #[test]
    fn test_negative_sensor_value_accepted() {
        let text = format!("{BASIC_REPORT}\nEquipment: FRZ-1 - Freezer (running)\nSensor: T-9 = -18.5 C");
        let m = extract(&text).unwrap();
        assert_eq!(m.equipment[0].readings[0].value, -18.5);
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let a = extract(EQUIPMENT_REPORT).unwrap();
        let b = extract(EQUIPMENT_REPORT).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_concurrent_extraction() {
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| extract(EQUIPMENT_REPORT).map(|m| m.units_produced)))
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), Ok(980));
        }
    }
}
