//! Operator configuration loading and validation.
//!
//! Reads `edge-operator.yaml` and resolves environment variables. Config is
//! the single source of truth for the local and cloud model settings, the
//! connectivity probe, and storage paths handed to external collaborators.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use super::errors::ConfigError;

/// File name searched for by [`find_config_path`].
pub const CONFIG_FILE_NAME: &str = "edge-operator.yaml";

/// Env var that points directly at a config file.
pub const CONFIG_ENV_VAR: &str = "EDGE_OPERATOR_CONFIG";

// ─── Public Types ────────────────────────────────────────────────────────────

/// Local (Ollama) model settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LocalModelConfig {
    #[serde(default = "default_local_host")]
    pub host: String,
    #[serde(default = "default_local_model_id")]
    pub model_id: String,
    #[serde(default = "default_temperature")]
    pub temperature: Option<f32>,
    #[serde(default = "default_keep_alive")]
    pub keep_alive: String,
}

impl Default for LocalModelConfig {
    fn default() -> Self {
        Self {
            host: default_local_host(),
            model_id: default_local_model_id(),
            temperature: default_temperature(),
            keep_alive: default_keep_alive(),
        }
    }
}

/// Cloud (Bedrock) model settings. Only read when cloud mode is first used.
#[derive(Debug, Clone, Deserialize)]
pub struct CloudModelConfig {
    #[serde(default = "default_cloud_model_id")]
    pub model_id: String,
    #[serde(default = "default_region")]
    pub region_name: String,
}

impl Default for CloudModelConfig {
    fn default() -> Self {
        Self {
            model_id: default_cloud_model_id(),
            region_name: default_region(),
        }
    }
}

/// Connectivity probe settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeConfig {
    #[serde(default = "default_probe_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_probe_port")]
    pub port: u16,
}

impl ProbeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_probe_timeout_secs(),
            port: default_probe_port(),
        }
    }
}

/// Top-level configuration (mirrors `edge-operator.yaml`).
#[derive(Debug, Clone, Deserialize)]
pub struct OperatorConfig {
    #[serde(default = "default_session_id")]
    pub session_id: String,
    /// Handed to the session store; this crate never touches it.
    #[serde(default = "default_sessions_dir")]
    pub sessions_dir: String,
    /// Handed to the telemetry backend; this crate never touches it.
    #[serde(default = "default_db_path")]
    pub db_path: String,
    #[serde(default)]
    pub local: LocalModelConfig,
    #[serde(default)]
    pub cloud: CloudModelConfig,
    #[serde(default)]
    pub probe: ProbeConfig,
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            session_id: default_session_id(),
            sessions_dir: default_sessions_dir(),
            db_path: default_db_path(),
            local: LocalModelConfig::default(),
            cloud: CloudModelConfig::default(),
            probe: ProbeConfig::default(),
        }
    }
}

fn default_local_host() -> String {
    "http://localhost:11434".into()
}
fn default_local_model_id() -> String {
    "hoangquan456/qwen3-nothink:4b".into()
}
fn default_temperature() -> Option<f32> {
    Some(0.7)
}
fn default_keep_alive() -> String {
    "10m".into()
}
fn default_cloud_model_id() -> String {
    "anthropic.claude-3-sonnet-20240229-v1:0".into()
}
fn default_region() -> String {
    "us-east-1".into()
}
fn default_probe_timeout_secs() -> u64 {
    5
}
fn default_probe_port() -> u16 {
    443
}
fn default_session_id() -> String {
    format!("session-{}", uuid::Uuid::new_v4())
}
fn default_sessions_dir() -> String {
    "./sessions".into()
}
fn default_db_path() -> String {
    "./telemetry.db".into()
}

// ─── Loading ─────────────────────────────────────────────────────────────────

/// Locate the config file.
///
/// Checks `EDGE_OPERATOR_CONFIG` first, then searches upward from `start` for
/// `edge-operator.yaml`.
pub fn find_config_path(start: &Path) -> Result<PathBuf, ConfigError> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        let candidate = PathBuf::from(expand_tilde(&path));
        if candidate.exists() {
            return Ok(candidate);
        }
        tracing::warn!(path = %candidate.display(), "{CONFIG_ENV_VAR} points at a missing file");
    }

    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.exists() {
            return Ok(candidate);
        }
        if !dir.pop() {
            break;
        }
    }

    Err(ConfigError::new(format!("could not find {CONFIG_FILE_NAME}")))
}

/// Load and parse the configuration file.
///
/// Performs environment-variable interpolation on string values matching
/// `${VAR_NAME}` or `${VAR_NAME:-default}`.
pub fn load_config(path: &Path) -> Result<OperatorConfig, ConfigError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::new(format!("failed to read {}: {e}", path.display())))?;

    parse_config(&raw)
}

/// Parse configuration YAML (after env interpolation) and validate it.
pub fn parse_config(raw: &str) -> Result<OperatorConfig, ConfigError> {
    let interpolated = interpolate_env_vars(raw);

    let config: OperatorConfig = serde_yaml::from_str(&interpolated)
        .map_err(|e| ConfigError::new(format!("failed to parse config: {e}")))?;

    validate(&config)?;
    Ok(config)
}

/// Load the config found from `start`, or fall back to built-in defaults when
/// no file exists. A file that exists but fails to parse is still an error.
pub fn load_or_default(start: &Path) -> Result<OperatorConfig, ConfigError> {
    match find_config_path(start) {
        Ok(path) => {
            tracing::info!(path = %path.display(), "loading operator config");
            load_config(&path)
        }
        Err(_) => {
            tracing::info!("no {CONFIG_FILE_NAME} found, using defaults");
            Ok(OperatorConfig::default())
        }
    }
}

fn validate(config: &OperatorConfig) -> Result<(), ConfigError> {
    if config.local.host.trim().is_empty() {
        return Err(ConfigError::new("local.host must not be empty"));
    }
    if config.local.model_id.trim().is_empty() {
        return Err(ConfigError::new("local.model_id must not be empty"));
    }
    if config.cloud.region_name.trim().is_empty() {
        return Err(ConfigError::new("cloud.region_name must not be empty"));
    }
    if config.probe.timeout_secs == 0 {
        return Err(ConfigError::new("probe.timeout_secs must be at least 1"));
    }
    Ok(())
}

// ─── Env-var interpolation ───────────────────────────────────────────────────

/// Replace `${VAR}` and `${VAR:-default}` in a string.
fn interpolate_env_vars(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'
            let mut var_expr = String::new();
            for c in chars.by_ref() {
                if c == '}' {
                    break;
                }
                var_expr.push(c);
            }
            result.push_str(&resolve_var_expr(&var_expr));
        } else {
            result.push(ch);
        }
    }

    result
}

/// Resolve a variable expression like `VAR` or `VAR:-default`.
fn resolve_var_expr(expr: &str) -> String {
    if let Some((var_name, default)) = expr.split_once(":-") {
        std::env::var(var_name).unwrap_or_else(|_| expand_tilde(default))
    } else {
        std::env::var(expr).unwrap_or_default()
    }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix('~') {
        if let Some(home) = dirs::home_dir() {
            return format!("{}{rest}", home.display());
        }
    }
    path.to_string()
}

// ─── Tests ───────────────────────────────────────────────────────────────────
