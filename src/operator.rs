//! EdgeOperator: the facade an agent runtime (or the CLI) drives.
//!
//! Bundles the configuration, the `ModelRouter`, and the `OperatorTools`
//! behind the small surface the conversational layer needs: switch models,
//! ask which model is active, list tools, and run a tool call.

use crate::inference::{Mode, ModelHandle, ModelRouter, OperatorConfig};
use crate::tools::{OperatorTools, ToolCall, ToolCallResult, ToolDefinition, ToolError};

/// System prompt for the operator agent.
pub const SYSTEM_PROMPT: &str = "\
You are an Edge Operator Agent, an AI assistant designed to help field operators \
manage industrial equipment and access information in manufacturing environments.

Your capabilities include:
1. **IoT Device Control**: Read sensor values and control actuators through natural language commands
   - Use read_sensor to get current readings from sensors
   - Use control_device to send commands to actuators
   - Use list_devices to see all available devices

2. **Structured Data Extraction**: Extract validated production metrics from SCADA reports
   - Use extract_scada_metrics to parse unstructured SCADA reports into structured data

When responding:
- Be concise and clear in your explanations
- Always confirm actions before executing device controls
- Provide relevant context about device readings
- Suggest next steps when appropriate

You operate locally on edge devices and can function fully offline using local models.
When cloud connectivity is available, you can switch to more powerful cloud models.";

pub struct EdgeOperator {
    config: OperatorConfig,
    router: ModelRouter,
    tools: OperatorTools,
}

impl EdgeOperator {
    /// Build an operator with a TCP connectivity probe and the sample devices.
    pub fn new(config: OperatorConfig) -> Self {
        let router = ModelRouter::new(&config);
        Self::from_parts(config, router, OperatorTools::default())
    }

    pub fn from_parts(config: OperatorConfig, router: ModelRouter, tools: OperatorTools) -> Self {
        tracing::info!(
            session_id = %config.session_id,
            mode = %router.current_mode(),
            tools = tools.definitions().len(),
            "edge operator initialized"
        );
        Self {
            config,
            router,
            tools,
        }
    }

    pub fn config(&self) -> &OperatorConfig {
        &self.config
    }

    pub fn router(&self) -> &ModelRouter {
        &self.router
    }

    pub fn tools(&self) -> &OperatorTools {
        &self.tools
    }

    pub fn system_prompt(&self) -> &'static str {
        SYSTEM_PROMPT
    }

    pub fn current_mode(&self) -> Mode {
        self.router.current_mode()
    }

    pub fn active_model(&self) -> ModelHandle<'_> {
        self.router.get_active_model()
    }

    /// Switch models, returning `(success, message)` for the operator.
    ///
    /// On failure the previous mode stays active and the message says so.
    pub fn set_model_mode(&self, mode: &str) -> (bool, String) {
        match self.router.set_mode_str(mode) {
            Ok(switch) => (true, switch.message()),
            Err(e) => {
                let message = e.user_message(self.router.current_mode());
                tracing::warn!(requested = %mode, error = %e, "{message}");
                (false, message)
            }
        }
    }

    pub fn tool_definitions(&self) -> &[ToolDefinition] {
        self.tools.definitions()
    }

    pub fn dispatch_tool(&mut self, call: &ToolCall) -> Result<ToolCallResult, ToolError> {
        self.tools.dispatch(call)
    }
}

impl std::fmt::Debug for EdgeOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EdgeOperator")
            .field("session_id", &self.config.session_id)
            .field("router", &self.router)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::inference::{ConnectivityProbe, ProbeFailure};

    struct FixedProbe(bool);

    impl ConnectivityProbe for FixedProbe {
        fn check(&self, host: &str, port: u16) -> Result<(), ProbeFailure> {
            if self.0 {
                Ok(())
            } else {
                Err(ProbeFailure {
                    endpoint: format!("{host}:{port}"),
                    reason: "network unreachable".into(),
                })
            }
        }
    }

    fn operator(online: bool) -> EdgeOperator {
        let config = OperatorConfig::default();
        let router = ModelRouter::with_probe(&config, Box::new(FixedProbe(online)));
        EdgeOperator::from_parts(config, router, OperatorTools::default())
    }

    #[test]
    fn test_switch_to_cloud_when_online() {
        let op = operator(true);
        let (ok, msg) = op.set_model_mode("cloud");
        assert!(ok);
        assert_eq!(msg, "Successfully switched to cloud mode");
        assert_eq!(op.current_mode(), Mode::Cloud);
        assert_eq!(op.active_model().mode(), Mode::Cloud);
    }

    #[test]
    fn test_switch_to_cloud_offline_stays_local() {
        let op = operator(false);
        let (ok, msg) = op.set_model_mode("cloud");
        assert!(!ok);
        assert_eq!(
            msg,
            "Cannot switch to cloud mode: connectivity unavailable. Remaining in local mode."
        );
        assert_eq!(op.current_mode(), Mode::Local);
    }

    #[test]
    fn test_invalid_mode_message() {
        let op = operator(true);
        let (ok, msg) = op.set_model_mode("hybrid");
        assert!(!ok);
        assert_eq!(msg, "Failed to switch to hybrid mode");
        assert_eq!(op.current_mode(), Mode::Local);
    }

    #[test]
    fn test_tools_survive_mode_switch() {
        let mut op = operator(true);
        op.dispatch_tool(&ToolCall::new(
            "control_device",
            json!({ "device_id": "valve-actuator", "action": "partial" }),
        ))
        .unwrap();
        op.set_model_mode("cloud");
        op.set_model_mode("local");

        let listing = op
            .dispatch_tool(&ToolCall::new("list_devices", json!({})))
            .unwrap();
        assert!(listing.content.contains("Current State: partial"));
        assert_eq!(op.tool_definitions().len(), 4);
        assert!(op.system_prompt().contains("extract_scada_metrics"));
    }
}
