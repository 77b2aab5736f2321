//! Model routing error types.
//!
//! All errors implement `std::error::Error` via `thiserror`. Structured logging
//! is the caller's responsibility; these types carry the context needed to build
//! meaningful log entries and operator-facing messages.

use thiserror::Error;

use super::types::Mode;

/// Errors that can occur while switching the active model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModeSwitchError {
    /// The cloud inference endpoint could not be reached. The router stays in
    /// whatever mode it was in before the call.
    #[error("connectivity unavailable to {endpoint}: {reason}")]
    ConnectivityUnavailable {
        endpoint: String,
        reason: String,
    },

    /// The requested mode name is not one of `local` / `cloud`.
    #[error("invalid mode '{mode}' (expected 'local' or 'cloud')")]
    InvalidMode {
        mode: String,
    },
}

impl ModeSwitchError {
    /// Operator-facing message for a failed switch.
    ///
    /// `current` is the mode the router remained in.
    pub fn user_message(&self, current: Mode) -> String {
        match self {
            ModeSwitchError::ConnectivityUnavailable { .. } => format!(
                "Cannot switch to cloud mode: connectivity unavailable. Remaining in {current} mode."
            ),
            ModeSwitchError::InvalidMode { mode } => format!("Failed to switch to {mode} mode"),
        }
    }

    /// Whether retrying later could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ModeSwitchError::ConnectivityUnavailable { .. })
    }
}

/// Configuration loading or validation error.
#[derive(Debug, Error)]
#[error("config error: {reason}")]
pub struct ConfigError {
    pub reason: String,
}

impl ConfigError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connectivity_message_names_remaining_mode() {
        let err = ModeSwitchError::ConnectivityUnavailable {
            endpoint: "bedrock-runtime.us-east-1.amazonaws.com:443".into(),
            reason: "timed out".into(),
        };
        assert_eq!(
            err.user_message(Mode::Local),
            "Cannot switch to cloud mode: connectivity unavailable. Remaining in local mode."
        );
        assert!(err.is_retryable());
    }

    #[test]
    fn test_invalid_mode_not_retryable() {
        let err = ModeSwitchError::InvalidMode {
            mode: "hybrid".into(),
        };
        assert!(!err.is_retryable());
        assert_eq!(err.user_message(Mode::Local), "Failed to switch to hybrid mode");
        assert!(err.to_string().contains("hybrid"));
    }
}
