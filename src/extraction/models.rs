//! Production report record types.
//!
//! Constructors validate; a value of any of these types that exists is valid.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::errors::EntityError;

// ─── Enumerations ────────────────────────────────────────────────────────────

/// Operational status of a piece of equipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentState {
    Running,
    Stopped,
    Maintenance,
    Fault,
}

impl EquipmentState {
    /// Parse a status keyword, ignoring case.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.trim().to_ascii_lowercase().as_str() {
            "running" => Some(Self::Running),
            "stopped" => Some(Self::Stopped),
            "maintenance" => Some(Self::Maintenance),
            "fault" => Some(Self::Fault),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Maintenance => "maintenance",
            Self::Fault => "fault",
        }
    }
}

impl fmt::Display for EquipmentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alarm severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AlarmSeverity {
    /// Parse a severity keyword, ignoring case.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for AlarmSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Sub-entities ────────────────────────────────────────────────────────────

/// A single sensor reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub sensor_id: String,
    pub value: f64,
    pub unit: String,
    /// ISO 8601 timestamp, when the report carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl SensorReading {
    pub fn new(
        sensor_id: impl Into<String>,
        value: f64,
        unit: impl Into<String>,
    ) -> Result<Self, EntityError> {
        let sensor_id = non_empty("sensor_reading", "sensor_id", sensor_id.into())?;
        let unit = non_empty("sensor_reading", "unit", unit.into())?;
        if !value.is_finite() {
            return Err(EntityError::new("sensor_reading", "value", "must be a finite number"));
        }
        Ok(Self {
            sensor_id,
            value,
            unit,
            timestamp: None,
        })
    }
}

/// An active or historical alarm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmInfo {
    pub alarm_id: String,
    pub severity: AlarmSeverity,
    pub message: String,
    #[serde(default)]
    pub acknowledged: bool,
}

impl AlarmInfo {
    pub fn new(
        alarm_id: impl Into<String>,
        severity: AlarmSeverity,
        message: impl Into<String>,
    ) -> Result<Self, EntityError> {
        Ok(Self {
            alarm_id: non_empty("alarm", "alarm_id", alarm_id.into())?,
            severity,
            message: non_empty("alarm", "message", message.into())?,
            acknowledged: false,
        })
    }
}

/// Status of one piece of equipment on the line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentStatus {
    pub equipment_id: String,
    pub name: String,
    pub status: EquipmentState,
    #[serde(default)]
    pub readings: Vec<SensorReading>,
    #[serde(default)]
    pub active_alarms: Vec<AlarmInfo>,
}

impl EquipmentStatus {
    pub fn new(
        equipment_id: impl Into<String>,
        name: impl Into<String>,
        status: EquipmentState,
        readings: Vec<SensorReading>,
        active_alarms: Vec<AlarmInfo>,
    ) -> Result<Self, EntityError> {
        Ok(Self {
            equipment_id: non_empty("equipment", "equipment_id", equipment_id.into())?,
            name: non_empty("equipment", "name", name.into())?,
            status,
            readings,
            active_alarms,
        })
    }

    /// Highest severity among this equipment's alarms.
    pub fn worst_alarm(&self) -> Option<AlarmSeverity> {
        self.active_alarms.iter().map(|a| a.severity).max()
    }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// Production metrics for one line and shift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionMetrics {
    pub line_id: String,
    pub shift: String,
    pub units_produced: u64,
    pub units_target: u64,
    /// May exceed 100.
    pub efficiency_percent: f64,
    #[serde(default)]
    pub equipment: Vec<EquipmentStatus>,
}

impl ProductionMetrics {
    /// Whether output met or exceeded the target.
    pub fn target_met(&self) -> bool {
        self.units_produced >= self.units_target
    }
}

fn non_empty(entity: &'static str, field: &'static str, value: String) -> Result<String, EntityError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EntityError::new(entity, field, "must not be empty"));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_keywords() {
        assert_eq!(EquipmentState::from_keyword("RUNNING"), Some(EquipmentState::Running));
        assert_eq!(EquipmentState::from_keyword("fault"), Some(EquipmentState::Fault));
        assert_eq!(EquipmentState::from_keyword("unknown"), None);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(AlarmSeverity::Critical > AlarmSeverity::High);
        assert!(AlarmSeverity::Low < AlarmSeverity::Medium);
        assert_eq!(AlarmSeverity::from_keyword("Medium"), Some(AlarmSeverity::Medium));
        assert_eq!(AlarmSeverity::from_keyword("urgent"), None);
    }

    #[test]
    fn test_reading_rejects_blank_unit() {
        let err = SensorReading::new("TEMP-01", 21.5, "  ").unwrap_err();
        assert_eq!(err.field, "unit");
    }

    #[test]
    fn test_reading_rejects_nan() {
        assert!(SensorReading::new("TEMP-01", f64::NAN, "C").is_err());
    }

    #[test]
    fn test_alarm_defaults_unacknowledged() {
        let alarm = AlarmInfo::new("ALM-1", AlarmSeverity::High, "Overheat").unwrap();
        assert!(!alarm.acknowledged);
    }

    #[test]
    fn test_equipment_trims_and_rejects_empty_name() {
        let ok = EquipmentStatus::new(" P-1 ", "Pump ", EquipmentState::Running, vec![], vec![])
            .unwrap();
        assert_eq!(ok.equipment_id, "P-1");
        assert_eq!(ok.name, "Pump");
        assert!(ok.worst_alarm().is_none());

        let err = EquipmentStatus::new("P-1", "", EquipmentState::Running, vec![], vec![])
            .unwrap_err();
        assert_eq!(err.entity, "equipment");
    }

    #[test]
    fn test_serialized_field_names() {
        let record = ProductionMetrics {
            line_id: "LINE-001".into(),
            shift: "Morning".into(),
            units_produced: 450,
            units_target: 500,
            efficiency_percent: 90.0,
            equipment: vec![EquipmentStatus::new(
                "P-1",
                "Pump",
                EquipmentState::Maintenance,
                vec![],
                vec![],
            )
            .unwrap()],
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["units_target"], 500);
        assert_eq!(json["equipment"][0]["status"], "maintenance");
        assert!(!record.target_met());
    }
}
