//! IoT devices reachable from the operator assistant.
//!
//! - `models`: sensor and actuator devices
//! - `registry`: an explicitly owned registry plus the read/control operations
//! - `errors`: `DeviceError`

pub mod errors;
pub mod models;
pub mod registry;

pub use errors::DeviceError;
pub use models::{ActuatorDevice, Device, DeviceKind, Metadata, SensorDevice};
pub use registry::{ControlOutcome, DeviceRegistry, SensorSample};
