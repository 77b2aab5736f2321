//! OperatorTools: the tool surface the agent runtime calls into.
//!
//! Handles:
//! - Tool definitions for the model (IoT control + SCADA extraction)
//! - Validation (tool exists, required string arguments present)
//! - Execution against the owned `DeviceRegistry` / `StructuredExtractor`
//! - Rendering results and domain failures as operator-facing text

use std::time::Instant;

use serde_json::{json, Value};

use crate::devices::{Device, DeviceError, DeviceRegistry};
use crate::extraction::{format_extraction_error, format_production_metrics, StructuredExtractor};

use super::errors::ToolError;
use super::types::{ToolCall, ToolCallResult, ToolDefinition};

// ─── Tool names ─────────────────────────────────────────────────────────────

pub const READ_SENSOR: &str = "read_sensor";
pub const CONTROL_DEVICE: &str = "control_device";
pub const LIST_DEVICES: &str = "list_devices";
pub const EXTRACT_SCADA_METRICS: &str = "extract_scada_metrics";

/// Tools that change the physical plant and should be confirmed by the
/// operator before they run.
const MUTABLE_TOOLS: &[&str] = &[CONTROL_DEVICE];

// ─── OperatorTools ──────────────────────────────────────────────────────────

/// Owns the devices and extractor that the tools act on.
#[derive(Debug, Clone)]
pub struct OperatorTools {
    registry: DeviceRegistry,
    extractor: StructuredExtractor,
    definitions: Vec<ToolDefinition>,
}

impl OperatorTools {
    pub fn new(registry: DeviceRegistry, extractor: StructuredExtractor) -> Self {
        Self {
            registry,
            extractor,
            definitions: builtin_definitions(),
        }
    }

    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    pub fn extractor(&self) -> &StructuredExtractor {
        &self.extractor
    }

    /// Whether `tool_name` mutates device state.
    pub fn requires_confirmation(&self, tool_name: &str) -> bool {
        MUTABLE_TOOLS.contains(&tool_name)
    }

    // ─── Dispatch ───────────────────────────────────────────────────────

    /// Validate and execute a batch of tool calls in order.
    pub fn dispatch_tool_calls(&mut self, calls: &[ToolCall]) -> Vec<ToolCallResult> {
        calls
            .iter()
            .map(|call| {
                self.dispatch(call).unwrap_or_else(|e| ToolCallResult {
                    tool_call_id: call.id.clone(),
                    tool_name: call.name.clone(),
                    success: false,
                    content: format!("Error: {e}"),
                    execution_time_ms: 0,
                })
            })
            .collect()
    }

    /// Validate and execute a single tool call.
    pub fn dispatch(&mut self, call: &ToolCall) -> Result<ToolCallResult, ToolError> {
        let start = Instant::now();
        self.validate(call)?;

        let (success, content) = match call.name.as_str() {
            READ_SENSOR => self.read_sensor(str_arg(call, "device_id")?),
            CONTROL_DEVICE => {
                self.control_device(str_arg(call, "device_id")?, str_arg(call, "action")?)
            }
            LIST_DEVICES => (true, self.list_devices()),
            EXTRACT_SCADA_METRICS => self.extract_scada_metrics(str_arg(call, "report_text")?),
            other => {
                return Err(ToolError::UnknownTool {
                    name: other.to_string(),
                })
            }
        };

        let execution_time_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            tool = %call.name,
            call_id = %call.id,
            success,
            execution_time_ms,
            "tool call executed"
        );

        Ok(ToolCallResult {
            tool_call_id: call.id.clone(),
            tool_name: call.name.clone(),
            success,
            content,
            execution_time_ms,
        })
    }

    fn validate(&self, call: &ToolCall) -> Result<(), ToolError> {
        let def = self
            .definitions
            .iter()
            .find(|d| d.name() == call.name)
            .ok_or_else(|| ToolError::UnknownTool {
                name: call.name.clone(),
            })?;

        for field in def.required_params() {
            match call.arguments.get(field) {
                Some(Value::String(_)) => {}
                Some(_) => {
                    return Err(ToolError::InvalidArguments {
                        tool: call.name.clone(),
                        reason: format!("field '{field}' must be a string"),
                    })
                }
                None => {
                    return Err(ToolError::InvalidArguments {
                        tool: call.name.clone(),
                        reason: format!("missing required field: '{field}'"),
                    })
                }
            }
        }
        Ok(())
    }

    // ─── Tools ──────────────────────────────────────────────────────────

    fn read_sensor(&self, device_id: &str) -> (bool, String) {
        match self.registry.read_sensor(device_id) {
            Ok(sample) => (
                true,
                format!(
                    "Sensor Reading:\n  Device ID: {}\n  Type: sensor\n  Location: {}\n  Value: {} {}\n  Timestamp: {}",
                    sample.device_id,
                    sample.location,
                    sample.value,
                    sample.unit,
                    sample.timestamp.to_rfc3339()
                ),
            ),
            Err(e) => (false, format_device_error(&e)),
        }
    }

    fn control_device(&mut self, device_id: &str, action: &str) -> (bool, String) {
        match self.registry.control_device(device_id, action) {
            Ok(outcome) => (
                true,
                format!(
                    "Device Control Successful:\n  Device ID: {}\n  Type: actuator\n  Location: {}\n  Previous State: {}\n  New State: {}\n  Timestamp: {}",
                    outcome.device_id,
                    outcome.location,
                    outcome.previous_state,
                    outcome.new_state,
                    outcome.timestamp.to_rfc3339()
                ),
            ),
            Err(e) => (false, format_device_error(&e)),
        }
    }

    fn list_devices(&self) -> String {
        let devices = self.registry.list_devices();
        if devices.is_empty() {
            return "No devices registered in the system.".into();
        }

        let rule = "=".repeat(40);
        let mut lines = vec!["Available IoT Devices:".to_string(), rule.clone()];

        for device in devices {
            lines.push(format!("\nDevice ID: {}", device.device_id()));
            lines.push(format!("  Type: {}", device.kind()));
            lines.push(format!("  Location: {}", device.location()));
            match device {
                Device::Sensor(s) => {
                    lines.push(format!("  Unit: {}", s.unit));
                    lines.push(format!("  Range: {} - {}", s.min_value, s.max_value));
                }
                Device::Actuator(a) => {
                    lines.push(format!("  Valid States: {}", a.states.join(", ")));
                    lines.push(format!("  Current State: {}", a.current_state));
                }
            }
        }

        lines.push(format!("\n{rule}"));
        lines.push(format!("Total: {} device(s)", devices.len()));
        lines.join("\n")
    }

    fn extract_scada_metrics(&self, report_text: &str) -> (bool, String) {
        match self.extractor.extract(report_text) {
            Ok(metrics) => (true, format_production_metrics(&metrics)),
            Err(e) => {
                tracing::info!(error = %e, "SCADA extraction failed");
                (false, format_extraction_error(&e))
            }
        }
    }
}

impl Default for OperatorTools {
    fn default() -> Self {
        Self::new(DeviceRegistry::with_sample_devices(), StructuredExtractor::default())
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────────

fn str_arg<'a>(call: &'a ToolCall, key: &str) -> Result<&'a str, ToolError> {
    call.arguments
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ToolError::InvalidArguments {
            tool: call.name.clone(),
            reason: format!("missing required field: '{key}'"),
        })
}

fn format_device_error(err: &DeviceError) -> String {
    match err {
        DeviceError::NotFound {
            device_id,
            available,
        } => format!(
            "Error: Device '{device_id}' not found. Available devices: {}",
            available.join(", ")
        ),
        DeviceError::WrongKind {
            device_id,
            expected,
            actual,
        } => format!("Error: Device '{device_id}' is not {}. It is a {actual}.", article(*expected)),
        DeviceError::InvalidAction {
            device_id,
            action,
            valid,
        } => format!(
            "Error: Invalid action '{action}' for device '{device_id}'.\nValid actions: {}",
            valid.join(", ")
        ),
        other => format!("Error: {other}"),
    }
}

fn article(kind: crate::devices::DeviceKind) -> &'static str {
    match kind {
        crate::devices::DeviceKind::Sensor => "a sensor",
        crate::devices::DeviceKind::Actuator => "an actuator",
    }
}

fn builtin_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::function(
            READ_SENSOR,
            "Read current sensor values from an IoT device.",
            json!({
                "type": "object",
                "properties": {
                    "device_id": {
                        "type": "string",
                        "description": "The unique identifier of the sensor device to read"
                    }
                },
                "required": ["device_id"]
            }),
        ),
        ToolDefinition::function(
            CONTROL_DEVICE,
            "Send a control command to an IoT actuator device.",
            json!({
                "type": "object",
                "properties": {
                    "device_id": {
                        "type": "string",
                        "description": "The unique identifier of the actuator device to control"
                    },
                    "action": {
                        "type": "string",
                        "description": "The action/state to set the actuator to"
                    }
                },
                "required": ["device_id", "action"]
            }),
        ),
        ToolDefinition::function(
            LIST_DEVICES,
            "List all available IoT devices.",
            json!({ "type": "object", "properties": {} }),
        ),
        ToolDefinition::function(
            EXTRACT_SCADA_METRICS,
            "Extract structured production metrics (line, shift, units, efficiency, \
             equipment status) from an unstructured SCADA report.",
            json!({
                "type": "object",
                "properties": {
                    "report_text": {
                        "type": "string",
                        "description": "The raw text content of a SCADA report"
                    }
                },
                "required": ["report_text"]
            }),
        ),
    ]
}

// ─── Tests ──────────────────────────────────────────────────────────────────
