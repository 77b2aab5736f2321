//! Tool surface exposed to the agent runtime.
//!
//! - `types`: OpenAI-style tool definitions, calls, and results
//! - `router`: `OperatorTools`, which validates and executes calls
//! - `errors`: `ToolError`

pub mod errors;
pub mod router;
pub mod types;

pub use errors::ToolError;
pub use router::{
    OperatorTools, CONTROL_DEVICE, EXTRACT_SCADA_METRICS, LIST_DEVICES, READ_SENSOR,
};
pub use types::{FunctionDefinition, ToolCall, ToolCallResult, ToolDefinition};
