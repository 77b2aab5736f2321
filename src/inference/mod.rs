//! Inference routing: chooses which model backend the agent runtime talks to.
//!
//! This module handles:
//! - Loading operator configuration from `edge-operator.yaml`
//! - The local (Ollama) and cloud (Bedrock) model handles
//! - Connectivity probing before entering cloud mode
//! - The `ModelRouter` state machine with lazy cloud initialization
//!
//! Offline-first: a fresh router is always in local mode, and a failed probe
//! never moves it.

pub mod config;
pub mod errors;
pub mod probe;
pub mod router;
pub mod types;

pub use config::{CloudModelConfig, LocalModelConfig, OperatorConfig, ProbeConfig};
pub use errors::{ConfigError, ModeSwitchError};
pub use probe::{ConnectivityProbe, ProbeFailure, TcpProbe};
pub use router::{ModeSwitch, ModelRouter};
pub use types::{CloudModelHandle, LocalModelHandle, Mode, ModelHandle};
