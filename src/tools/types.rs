//! Tool-calling wire types.
//!
//! These mirror the OpenAI Chat Completions tool shapes, so the definitions
//! can be handed to any agent runtime that speaks that API.

use serde::{Deserialize, Serialize};

/// Tool definition sent to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub r#type: String,
    pub function: FunctionDefinition,
}

impl ToolDefinition {
    pub fn function(name: &str, description: &str, parameters: serde_json::Value) -> Self {
        Self {
            r#type: "function".into(),
            function: FunctionDefinition {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.function.name
    }

    /// Names listed under `parameters.required`.
    pub fn required_params(&self) -> Vec<&str> {
        self.function
            .parameters
            .get("required")
            .and_then(|r| r.as_array())
            .map(|arr| arr.iter().filter_map(|v| v.as_str()).collect())
            .unwrap_or_default()
    }
}

/// Function definition within a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// A tool call chosen by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique ID for this tool call (generated if the model doesn't provide one).
    #[serde(default = "generate_call_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub arguments: serde_json::Value,
}

impl ToolCall {
    pub fn new(name: &str, arguments: serde_json::Value) -> Self {
        Self {
            id: generate_call_id(),
            name: name.to_string(),
            arguments,
        }
    }
}

fn generate_call_id() -> String {
    format!("call_{}", uuid::Uuid::new_v4().simple())
}

/// Outcome of executing one tool call.
///
/// `content` is always text for the model. `success` is false when the tool
/// ran but reported a domain error (unknown device, invalid report, ...).
#[derive(Debug, Clone, Serialize)]
pub struct ToolCallResult {
    pub tool_call_id: String,
    pub tool_name: String,
    pub success: bool,
    pub content: String,
    pub execution_time_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_call_id_generated_when_missing() {
        let call: ToolCall =
            serde_json::from_str(r#"{"name":"list_devices"}"#).unwrap();
        assert!(call.id.starts_with("call_"));
        assert!(call.arguments.is_null());
    }

    #[test]
    fn test_required_params() {
        let def = ToolDefinition::function(
            "read_sensor",
            "Read a sensor",
            serde_json::json!({
                "type": "object",
                "properties": { "device_id": { "type": "string" } },
                "required": ["device_id"]
            }),
        );
        assert_eq!(def.required_params(), vec!["device_id"]);
        assert_eq!(serde_json::to_value(&def).unwrap()["type"], "function");
    }
}
