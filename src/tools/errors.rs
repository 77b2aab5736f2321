//! Tool dispatch error types.

use thiserror::Error;

/// Errors that stop a tool call before it runs.
///
/// Failures *inside* a tool (unknown device, unparseable report) are not
/// errors at this level; they come back as an unsuccessful `ToolCallResult`
/// whose text the model can relay to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    /// The model named a tool that is not registered.
    #[error("unknown tool: {name}")]
    UnknownTool { name: String },

    /// Arguments are missing or have the wrong shape.
    #[error("invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },
}
