//! DeviceRegistry: the set of IoT devices an operator can reach.
//!
//! The registry is an ordinary value. Whoever needs devices receives a
//! registry (or a reference to one); there is no process-wide instance.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::errors::DeviceError;
use super::models::{ActuatorDevice, Device, DeviceKind, SensorDevice};

/// One sensor reading taken through the registry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorSample {
    pub device_id: String,
    pub location: String,
    pub value: f64,
    pub unit: String,
    pub timestamp: DateTime<Utc>,
}

/// Result of a successful actuator command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlOutcome {
    pub device_id: String,
    pub location: String,
    pub previous_state: String,
    pub new_state: String,
    pub timestamp: DateTime<Utc>,
}

/// Registered devices, kept in registration order.
#[derive(Debug, Clone, Default)]
pub struct DeviceRegistry {
    devices: Vec<Device>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the demo floor: a temperature sensor, a
    /// humidity sensor, and a cooling valve.
    pub fn with_sample_devices() -> Self {
        let mut registry = Self::new();

        // Ranges are static and valid, so construction cannot fail.
        if let Ok(temp) = SensorDevice::new(
            "temp-sensor",
            "Production Floor - Zone A",
            "°C",
            -10.0,
            50.0,
        ) {
            registry.register(
                temp.with_metadata("manufacturer", "SensorCorp")
                    .with_metadata("model", "TC-100"),
            );
        }

        if let Ok(humidity) = SensorDevice::new(
            "humidity-sensor",
            "Production Floor - Zone A",
            "%",
            0.0,
            100.0,
        ) {
            registry.register(
                humidity
                    .with_metadata("manufacturer", "SensorCorp")
                    .with_metadata("model", "HC-200"),
            );
        }

        registry.register(
            ActuatorDevice::new(
                "valve-actuator",
                "Cooling System - Main Line",
                vec!["open".into(), "closed".into(), "partial".into()],
                Some("closed".into()),
            )
            .with_metadata("manufacturer", "ActuatorTech")
            .with_metadata("model", "VA-500"),
        );

        registry
    }

    /// Register a device, replacing any existing device with the same id in
    /// place.
    pub fn register(&mut self, device: impl Into<Device>) {
        let device = device.into();
        match self
            .devices
            .iter_mut()
            .find(|d| d.device_id() == device.device_id())
        {
            Some(existing) => {
                tracing::debug!(device_id = %device.device_id(), "replacing registered device");
                *existing = device;
            }
            None => self.devices.push(device),
        }
    }

    pub fn get(&self, device_id: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.device_id() == device_id)
    }

    pub fn get_mut(&mut self, device_id: &str) -> Option<&mut Device> {
        self.devices.iter_mut().find(|d| d.device_id() == device_id)
    }

    pub fn list_devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn list_device_ids(&self) -> Vec<String> {
        self.devices.iter().map(|d| d.device_id().to_string()).collect()
    }

    pub fn sensors(&self) -> impl Iterator<Item = &SensorDevice> {
        self.devices.iter().filter_map(|d| match d {
            Device::Sensor(s) => Some(s),
            Device::Actuator(_) => None,
        })
    }

    pub fn actuators(&self) -> impl Iterator<Item = &ActuatorDevice> {
        self.devices.iter().filter_map(|d| match d {
            Device::Actuator(a) => Some(a),
            Device::Sensor(_) => None,
        })
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    // ─── Operations ─────────────────────────────────────────────────────

    /// Take a reading from a sensor.
    pub fn read_sensor(&self, device_id: &str) -> Result<SensorSample, DeviceError> {
        let device = self.get(device_id).ok_or_else(|| self.not_found(device_id))?;
        let Device::Sensor(sensor) = device else {
            return Err(DeviceError::WrongKind {
                device_id: device_id.to_string(),
                expected: DeviceKind::Sensor,
                actual: device.kind(),
            });
        };

        let sample = SensorSample {
            device_id: sensor.device_id.clone(),
            location: sensor.location.clone(),
            value: sensor.read(),
            unit: sensor.unit.clone(),
            timestamp: Utc::now(),
        };
        tracing::debug!(device_id = %sample.device_id, value = sample.value, "sensor read");
        Ok(sample)
    }

    /// Move an actuator to the state named by `action`.
    pub fn control_device(
        &mut self,
        device_id: &str,
        action: &str,
    ) -> Result<ControlOutcome, DeviceError> {
        let Some(idx) = self.devices.iter().position(|d| d.device_id() == device_id) else {
            return Err(self.not_found(device_id));
        };
        let device = &mut self.devices[idx];
        let kind = device.kind();
        let Device::Actuator(actuator) = device else {
            return Err(DeviceError::WrongKind {
                device_id: device_id.to_string(),
                expected: DeviceKind::Actuator,
                actual: kind,
            });
        };

        let previous_state = actuator.current_state.clone();
        if !actuator.set_state(action) {
            return Err(DeviceError::InvalidAction {
                device_id: device_id.to_string(),
                action: action.to_string(),
                valid: actuator.valid_actions().to_vec(),
            });
        }

        tracing::info!(
            device_id = %actuator.device_id,
            from = %previous_state,
            to = %actuator.current_state,
            "actuator state changed"
        );

        Ok(ControlOutcome {
            device_id: actuator.device_id.clone(),
            location: actuator.location.clone(),
            previous_state,
            new_state: actuator.current_state.clone(),
            timestamp: Utc::now(),
        })
    }

    fn not_found(&self, device_id: &str) -> DeviceError {
        DeviceError::NotFound {
            device_id: device_id.to_string(),
            available: self.list_device_ids(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_registry_contents() {
        let registry = DeviceRegistry::with_sample_devices();
        assert_eq!(
            registry.list_device_ids(),
            vec!["temp-sensor", "humidity-sensor", "valve-actuator"]
        );
        assert_eq!(registry.sensors().count(), 2);
        assert_eq!(registry.actuators().count(), 1);
        let valve = registry.actuators().next().unwrap();
        assert_eq!(valve.current_state, "closed");
    }

    #[test]
    fn test_registries_are_independent() {
        let mut a = DeviceRegistry::with_sample_devices();
        let b = DeviceRegistry::with_sample_devices();
        a.control_device("valve-actuator", "open").unwrap();
        let Some(Device::Actuator(valve)) = b.get("valve-actuator") else {
            panic!("valve missing");
        };
        assert_eq!(valve.current_state, "closed");
    }

    #[test]
    fn test_register_replaces_same_id() {
        let mut registry = DeviceRegistry::new();
        registry.register(SensorDevice::new("s", "a", "C", 0.0, 1.0).unwrap());
        registry.register(SensorDevice::new("s", "b", "C", 0.0, 1.0).unwrap());
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("s").unwrap().location(), "b");
    }

    #[test]
    fn test_read_sensor_in_range() {
        let registry = DeviceRegistry::with_sample_devices();
        let sample = registry.read_sensor("humidity-sensor").unwrap();
        assert!((0.0..=100.0).contains(&sample.value));
        assert_eq!(sample.unit, "%");
    }

    #[test]
    fn test_read_sensor_unknown_lists_available() {
        let registry = DeviceRegistry::with_sample_devices();
        match registry.read_sensor("pressure") {
            Err(DeviceError::NotFound { available, .. }) => assert_eq!(available.len(), 3),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_read_sensor_on_actuator() {
        let registry = DeviceRegistry::with_sample_devices();
        let err = registry.read_sensor("valve-actuator").unwrap_err();
        assert_eq!(
            err,
            DeviceError::WrongKind {
                device_id: "valve-actuator".into(),
                expected: DeviceKind::Sensor,
                actual: DeviceKind::Actuator,
            }
        );
    }

    #[test]
    fn test_control_device_changes_state() {
        let mut registry = DeviceRegistry::with_sample_devices();
        let outcome = registry.control_device("valve-actuator", "partial").unwrap();
        assert_eq!(outcome.previous_state, "closed");
        assert_eq!(outcome.new_state, "partial");
    }

    #[test]
    fn test_control_device_invalid_action_keeps_state() {
        let mut registry = DeviceRegistry::with_sample_devices();
        let err = registry.control_device("valve-actuator", "explode").unwrap_err();
        assert!(matches!(err, DeviceError::InvalidAction { ref valid, .. } if valid.len() == 3));
        let Some(Device::Actuator(valve)) = registry.get("valve-actuator") else {
            panic!("valve missing");
        };
        assert_eq!(valve.current_state, "closed");
    }

    #[test]
    fn test_control_device_on_sensor() {
        let mut registry = DeviceRegistry::with_sample_devices();
        let err = registry.control_device("temp-sensor", "open").unwrap_err();
        assert!(err.to_string().contains("expected actuator"));
    }
}
