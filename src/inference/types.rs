//! Shared types for model routing.
//!
//! The handles are deliberately thin: they describe *where* a backend lives
//! and how it is parameterised. Invoking a handle to produce text belongs to
//! the agent runtime, not to this crate.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::config::{CloudModelConfig, LocalModelConfig};
use super::errors::ModeSwitchError;

/// Timeout for the local backend health check.
const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(3);

// ─── Mode ────────────────────────────────────────────────────────────────────

/// Which inference backend is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// On-device model (Ollama). Offline-first default.
    #[default]
    Local,
    /// Remote model (Bedrock).
    Cloud,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Local => "local",
            Mode::Cloud => "cloud",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ModeSwitchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Mode::Local),
            "cloud" => Ok(Mode::Cloud),
            _ => Err(ModeSwitchError::InvalidMode { mode: s.to_string() }),
        }
    }
}

// ─── Local Handle ────────────────────────────────────────────────────────────

/// Handle to the local (Ollama) inference backend.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalModelHandle {
    host: String,
    model_id: String,
    temperature: Option<f32>,
    keep_alive: String,
}

impl LocalModelHandle {
    pub fn new(config: &LocalModelConfig) -> Self {
        Self {
            host: config.host.trim_end_matches('/').to_string(),
            model_id: config.model_id.clone(),
            temperature: config.temperature,
            keep_alive: config.keep_alive.clone(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn temperature(&self) -> Option<f32> {
        self.temperature
    }

    pub fn keep_alive(&self) -> &str {
        &self.keep_alive
    }

    /// Check whether the local backend is running and reachable.
    ///
    /// Returns `true` if `GET {host}/api/tags` responds with 2xx.
    pub async fn check_health(&self) -> bool {
        let client = match reqwest::Client::builder()
            .timeout(HEALTH_CHECK_TIMEOUT)
            .build()
        {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(error = %e, "failed to build HTTP client for health check");
                return false;
            }
        };

        match client.get(format!("{}/api/tags", self.host)).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                tracing::debug!(host = %self.host, error = %e, "local model health check failed");
                false
            }
        }
    }
}

// ─── Cloud Handle ────────────────────────────────────────────────────────────

/// Handle to the remote (Bedrock) inference backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudModelHandle {
    model_id: String,
    region: String,
}

impl CloudModelHandle {
    pub fn new(config: &CloudModelConfig) -> Self {
        Self {
            model_id: config.model_id.clone(),
            region: config.region_name.clone(),
        }
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Runtime endpoint URL for this handle's region.
    pub fn endpoint(&self) -> String {
        format!("https://{}", runtime_host(&self.region))
    }
}

/// Hostname of the Bedrock runtime for `region`.
pub fn runtime_host(region: &str) -> String {
    format!("bedrock-runtime.{region}.amazonaws.com")
}

// ─── Active Handle ───────────────────────────────────────────────────────────

/// Borrowed view of whichever backend is active.
#[derive(Debug, Clone, Copy)]
pub enum ModelHandle<'a> {
    Local(&'a LocalModelHandle),
    Cloud(&'a CloudModelHandle),
}

impl ModelHandle<'_> {
    pub fn mode(&self) -> Mode {
        match self {
            ModelHandle::Local(_) => Mode::Local,
            ModelHandle::Cloud(_) => Mode::Cloud,
        }
    }

    pub fn model_id(&self) -> &str {
        match self {
            ModelHandle::Local(h) => h.model_id(),
            ModelHandle::Cloud(h) => h.model_id(),
        }
    }

    /// Short description for logs and status output.
    pub fn describe(&self) -> String {
        match self {
            ModelHandle::Local(h) => format!("{} @ {} (local)", h.model_id(), h.host()),
            ModelHandle::Cloud(h) => format!("{} @ {} (cloud)", h.model_id(), h.region()),
        }
    }
}
