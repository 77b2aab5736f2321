//! Device error types.

use thiserror::Error;

use super::models::DeviceKind;

/// Errors from device registry operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeviceError {
    /// No device with this id is registered.
    #[error("device '{device_id}' not found (available: {})", available.join(", "))]
    NotFound {
        device_id: String,
        available: Vec<String>,
    },

    /// The device exists but is the wrong kind for the operation.
    #[error("device '{device_id}' is a {actual}, expected {expected}")]
    WrongKind {
        device_id: String,
        expected: DeviceKind,
        actual: DeviceKind,
    },

    /// The actuator does not support the requested state.
    #[error("invalid action '{action}' for device '{device_id}' (valid: {})", valid.join(", "))]
    InvalidAction {
        device_id: String,
        action: String,
        valid: Vec<String>,
    },

    /// A sensor was declared with `min_value > max_value` or a non-finite bound.
    #[error("invalid range for sensor '{device_id}': {min} .. {max}")]
    InvalidRange {
        device_id: String,
        min: f64,
        max: f64,
    },
}
