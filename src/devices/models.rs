//! IoT device models: sensors that produce readings and actuators that hold
//! a state.

use std::collections::BTreeMap;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::errors::DeviceError;

/// Free-form device metadata (manufacturer, model, ...).
pub type Metadata = BTreeMap<String, String>;

/// Whether a device reads values or is controlled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Sensor,
    Actuator,
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceKind::Sensor => f.write_str("sensor"),
            DeviceKind::Actuator => f.write_str("actuator"),
        }
    }
}

// ─── Sensor ─────────────────────────────────────────────────────────────────

/// A sensor with a simulated reading range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorDevice {
    pub device_id: String,
    pub location: String,
    #[serde(default)]
    pub metadata: Metadata,
    pub unit: String,
    pub min_value: f64,
    pub max_value: f64,
}

impl SensorDevice {
    pub fn new(
        device_id: impl Into<String>,
        location: impl Into<String>,
        unit: impl Into<String>,
        min_value: f64,
        max_value: f64,
    ) -> Result<Self, DeviceError> {
        let device_id = device_id.into();
        if !min_value.is_finite() || !max_value.is_finite() || min_value > max_value {
            return Err(DeviceError::InvalidRange {
                device_id,
                min: min_value,
                max: max_value,
            });
        }
        Ok(Self {
            device_id,
            location: location.into(),
            metadata: Metadata::new(),
            unit: unit.into(),
            min_value,
            max_value,
        })
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    /// Simulated reading, uniform over the range, rounded to 2 decimals.
    pub fn read(&self) -> f64 {
        self.read_with(&mut rand::thread_rng())
    }

    pub fn read_with<R: Rng>(&self, rng: &mut R) -> f64 {
        let raw = if self.min_value == self.max_value {
            self.min_value
        } else {
            rng.gen_range(self.min_value..=self.max_value)
        };
        ((raw * 100.0).round() / 100.0).clamp(self.min_value, self.max_value)
    }
}

// ─── Actuator ───────────────────────────────────────────────────────────────

/// An actuator that can be moved between a fixed set of states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActuatorDevice {
    pub device_id: String,
    pub location: String,
    #[serde(default)]
    pub metadata: Metadata,
    pub states: Vec<String>,
    pub current_state: String,
}

impl ActuatorDevice {
    /// Create an actuator. Without an explicit `current_state` it starts in
    /// its first state.
    pub fn new(
        device_id: impl Into<String>,
        location: impl Into<String>,
        states: Vec<String>,
        current_state: Option<String>,
    ) -> Self {
        let current_state = current_state
            .filter(|s| !s.is_empty())
            .or_else(|| states.first().cloned())
            .unwrap_or_default();
        Self {
            device_id: device_id.into(),
            location: location.into(),
            metadata: Metadata::new(),
            states,
            current_state,
        }
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    /// Move to `new_state` if it is one of the valid states.
    pub fn set_state(&mut self, new_state: &str) -> bool {
        if self.states.iter().any(|s| s == new_state) {
            self.current_state = new_state.to_string();
            true
        } else {
            false
        }
    }

    pub fn valid_actions(&self) -> &[String] {
        &self.states
    }
}

// ─── Device ─────────────────────────────────────────────────────────────────

/// Any registered device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "device_type", rename_all = "lowercase")]
pub enum Device {
    Sensor(SensorDevice),
    Actuator(ActuatorDevice),
}

impl Device {
    pub fn device_id(&self) -> &str {
        match self {
            Device::Sensor(s) => &s.device_id,
            Device::Actuator(a) => &a.device_id,
        }
    }

    pub fn location(&self) -> &str {
        match self {
            Device::Sensor(s) => &s.location,
            Device::Actuator(a) => &a.location,
        }
    }

    pub fn kind(&self) -> DeviceKind {
        match self {
            Device::Sensor(_) => DeviceKind::Sensor,
            Device::Actuator(_) => DeviceKind::Actuator,
        }
    }

    pub fn metadata(&self) -> &Metadata {
        match self {
            Device::Sensor(s) => &s.metadata,
            Device::Actuator(a) => &a.metadata,
        }
    }
}

impl From<SensorDevice> for Device {
    fn from(s: SensorDevice) -> Self {
        Device::Sensor(s)
    }
}

impl From<ActuatorDevice> for Device {
    fn from(a: ActuatorDevice) -> Self {
        Device::Actuator(a)
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn test_sensor_reading_within_range() {
        let sensor = SensorDevice::new("t", "zone", "°C", -10.0, 50.0).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let v = sensor.read_with(&mut rng);
            assert!((-10.0..=50.0).contains(&v), "{v} out of range");
            assert_eq!((v * 100.0).round() / 100.0, v);
        }
    }

    #[test]
    fn test_sensor_degenerate_range() {
        let sensor = SensorDevice::new("p", "zone", "bar", 2.0, 2.0).unwrap();
        assert_eq!(sensor.read(), 2.0);
    }

    #[test]
    fn test_sensor_rejects_inverted_range() {
        let err = SensorDevice::new("h", "zone", "%", 100.0, 0.0).unwrap_err();
        assert!(matches!(err, DeviceError::InvalidRange { .. }));
    }

    #[test]
    fn test_actuator_defaults_to_first_state() {
        let valve = ActuatorDevice::new("v", "line", vec!["open".into(), "closed".into()], None);
        assert_eq!(valve.current_state, "open");
    }

    #[test]
    fn test_actuator_set_state() {
        let mut valve = ActuatorDevice::new(
            "v",
            "line",
            vec!["open".into(), "closed".into()],
            Some("closed".into()),
        );
        assert!(valve.set_state("open"));
        assert_eq!(valve.current_state, "open");
        assert!(!valve.set_state("half"));
        assert_eq!(valve.current_state, "open");
    }

    #[test]
    fn test_device_serializes_with_type_tag() {
        let device: Device = SensorDevice::new("t", "zone", "C", 0.0, 1.0).unwrap().into();
        let json = serde_json::to_value(&device).unwrap();
        assert_eq!(json["device_type"], "sensor");
        assert_eq!(device.kind(), DeviceKind::Sensor);
    }
}
