//! Operator-facing rendering of extraction results.

use super::errors::{ExtractionError, RequiredField};
use super::models::ProductionMetrics;

/// Render a record as the text block returned to the agent.
pub fn format_production_metrics(metrics: &ProductionMetrics) -> String {
    let rule = "=".repeat(50);
    let mut lines = vec![
        "Extracted Production Metrics:".to_string(),
        rule.clone(),
        format!("  Line ID: {}", metrics.line_id),
        format!("  Shift: {}", metrics.shift),
        format!("  Units Produced: {}", metrics.units_produced),
        format!("  Units Target: {}", metrics.units_target),
        format!("  Efficiency: {:.1}%", metrics.efficiency_percent),
    ];

    if !metrics.equipment.is_empty() {
        lines.push("\n  Equipment Status:".into());
        lines.push(format!("  {}", "-".repeat(40)));

        for equip in &metrics.equipment {
            lines.push(format!("\n    Equipment: {} - {}", equip.equipment_id, equip.name));
            lines.push(format!("      Status: {}", equip.status));

            if !equip.readings.is_empty() {
                lines.push("      Sensor Readings:".into());
                for reading in &equip.readings {
                    lines.push(format!(
                        "        - {}: {} {}",
                        reading.sensor_id, reading.value, reading.unit
                    ));
                }
            }

            if !equip.active_alarms.is_empty() {
                lines.push("      Active Alarms:".into());
                for alarm in &equip.active_alarms {
                    let ack = if alarm.acknowledged { "✓" } else { "✗" };
                    lines.push(format!(
                        "        - [{}] {}: {} (Ack: {ack})",
                        alarm.severity.as_str().to_uppercase(),
                        alarm.alarm_id,
                        alarm.message
                    ));
                }
            }
        }
    }

    lines.push(format!("\n{rule}"));
    lines.push("Extraction completed successfully.".into());
    lines.join("\n")
}

/// Render an extraction failure as the `Error: ...` text returned to the agent.
pub fn format_extraction_error(err: &ExtractionError) -> String {
    match err {
        ExtractionError::EmptyInput => {
            "Error: Empty report text provided. Please provide a valid SCADA report.".into()
        }
        ExtractionError::MissingField { field } => format!(
            "Error: Failed to extract metrics from report. Could not extract '{field}' from report. \
             Please ensure the report contains this field."
        ),
        ExtractionError::ValidationFailure { violations } => {
            let details: Vec<String> = violations
                .iter()
                .map(|v| format!("  - {}: {}", v.field, v.reason))
                .collect();
            let required: Vec<String> = RequiredField::ALL
                .iter()
                .map(|f| format!("  - {f}: {}", f.hint()))
                .collect();
            format!(
                "Error: Extracted data failed validation.\nValidation errors:\n{}\n\n\
                 Please provide a report with the following required fields:\n{}",
                details.join("\n"),
                required.join("\n")
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::extract;

    #[test]
    fn test_format_basic_metrics() {
        let m = extract("Line: L-1\nShift: Day\nUnits Produced: 7\nTarget: 8\nEfficiency: 87.49%")
            .unwrap();
        let out = format_production_metrics(&m);
        assert!(out.starts_with("Extracted Production Metrics:"));
        assert!(out.contains("  Line ID: L-1"));
        assert!(out.contains("  Efficiency: 87.5%"));
        assert!(!out.contains("Equipment Status"));
        assert!(out.ends_with("Extraction completed successfully."));
    }

    #[test]
    fn test_format_equipment_and_alarms() {
        let m = extract(
            "Line: L-1\nShift: Day\nUnits Produced: 7\nTarget: 8\nEfficiency: 90\n\
             Equipment: P-1 - Pump (fault)\nSensor: PR-1 = 3.5 bar\nAlarm: A-1 (critical) - Seal leak",
        )
        .unwrap();
        let out = format_production_metrics(&m);
        assert!(out.contains("    Equipment: P-1 - Pump"));
        assert!(out.contains("      Status: fault"));
        assert!(out.contains("        - PR-1: 3.5 bar"));
        assert!(out.contains("        - [CRITICAL] A-1: Seal leak (Ack: ✗)"));
    }

    #[test]
    fn test_format_validation_error_lists_fields_and_hints() {
        let err = extract("Line: L\nShift: S\nUnits Produced: -1\nTarget: 1\nEfficiency: 1").unwrap_err();
        let out = format_extraction_error(&err);
        assert!(out.starts_with("Error: Extracted data failed validation."));
        assert!(out.contains("  - units_produced: must be greater than or equal to 0"));
        assert!(out.contains("  - efficiency_percent: Efficiency percentage"));
    }

    #[test]
    fn test_format_empty_and_missing() {
        assert!(format_extraction_error(&ExtractionError::EmptyInput).contains("Empty report text"));
        let out = format_extraction_error(&ExtractionError::MissingField {
            field: RequiredField::UnitsTarget,
        });
        assert!(out.contains("'units_target'"));
    }
}
