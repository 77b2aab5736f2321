//! ModelRouter: switches inference between the local and cloud backends.
//!
//! The local handle is built eagerly; the cloud handle is built at most once,
//! the first time cloud mode is entered or read, and then cached for the
//! router's lifetime. Entering cloud mode is gated by a connectivity probe.
//!
//! ```text
//!            set_mode(Local)  (always ok)
//!        ┌──────────────────────────────────┐
//!        ▼                                  │
//!   ┌─────────┐  set_mode(Cloud), probe ok ┌─────────┐
//!   │  Local  │ ─────────────────────────▶ │  Cloud  │
//!   └─────────┘                            └─────────┘
//!        │ probe fails: stay                    │ probe fails: stay
//! ```

use std::fmt;
use std::sync::{OnceLock, RwLock};

use super::config::{CloudModelConfig, OperatorConfig};
use super::errors::ModeSwitchError;
use super::probe::{ConnectivityProbe, TcpProbe};
use super::types::{runtime_host, CloudModelHandle, LocalModelHandle, Mode, ModelHandle};

/// Builds the cloud handle on first use.
pub type CloudFactory = Box<dyn Fn(&CloudModelConfig) -> CloudModelHandle + Send + Sync>;

/// Successful mode change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeSwitch {
    pub previous: Mode,
    pub current: Mode,
}

impl ModeSwitch {
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }

    pub fn message(&self) -> String {
        format!("Successfully switched to {} mode", self.current)
    }
}

/// Routes inference to the local or cloud model.
///
/// All methods take `&self`; the router can be shared across threads.
pub struct ModelRouter {
    local: LocalModelHandle,
    cloud_config: CloudModelConfig,
    cloud: OnceLock<CloudModelHandle>,
    cloud_factory: CloudFactory,
    mode: RwLock<Mode>,
    probe: Box<dyn ConnectivityProbe>,
    probe_port: u16,
}

impl ModelRouter {
    /// Create a router using a TCP probe configured from `config.probe`.
    pub fn new(config: &OperatorConfig) -> Self {
        Self::with_probe(config, Box::new(TcpProbe::from_config(&config.probe)))
    }

    /// Create a router with a custom connectivity probe.
    pub fn with_probe(config: &OperatorConfig, probe: Box<dyn ConnectivityProbe>) -> Self {
        let local = LocalModelHandle::new(&config.local);
        tracing::info!(
            host = %local.host(),
            model = %local.model_id(),
            "local model handle initialized"
        );

        Self {
            local,
            cloud_config: config.cloud.clone(),
            cloud: OnceLock::new(),
            cloud_factory: Box::new(CloudModelHandle::new),
            mode: RwLock::new(Mode::Local),
            probe,
            probe_port: config.probe.port,
        }
    }

    /// Replace the function used to build the cloud handle.
    pub fn with_cloud_factory(mut self, factory: CloudFactory) -> Self {
        self.cloud_factory = factory;
        self
    }

    /// Current routing mode.
    pub fn current_mode(&self) -> Mode {
        match self.mode.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// The handle for the active backend.
    ///
    /// In cloud mode this builds the cloud handle if nothing has yet.
    pub fn get_active_model(&self) -> ModelHandle<'_> {
        match self.current_mode() {
            Mode::Local => ModelHandle::Local(&self.local),
            Mode::Cloud => ModelHandle::Cloud(self.cloud_handle()),
        }
    }

    /// The local handle, regardless of mode.
    pub fn local_model(&self) -> &LocalModelHandle {
        &self.local
    }

    /// Whether the cloud handle has been constructed.
    pub fn is_cloud_initialized(&self) -> bool {
        self.cloud.get().is_some()
    }

    /// `host:port` the probe targets.
    pub fn probe_target(&self) -> (String, u16) {
        (runtime_host(&self.cloud_config.region_name), self.probe_port)
    }

    /// Switch the active backend.
    ///
    /// Local always succeeds. Cloud runs one connectivity probe; if it fails
    /// the mode is left as it was.
    pub fn set_mode(&self, mode: Mode) -> Result<ModeSwitch, ModeSwitchError> {
        let previous = self.current_mode();

        if mode == Mode::Cloud {
            let (host, port) = self.probe_target();
            if let Err(failure) = self.probe.check(&host, port) {
                tracing::warn!(
                    endpoint = %failure.endpoint,
                    reason = %failure.reason,
                    mode = %previous,
                    "cannot switch to cloud mode: connectivity unavailable"
                );
                return Err(ModeSwitchError::ConnectivityUnavailable {
                    endpoint: failure.endpoint,
                    reason: failure.reason,
                });
            }
            self.cloud_handle();
        }

        self.store_mode(mode);
        tracing::info!(from = %previous, to = %mode, "model mode switched");

        Ok(ModeSwitch {
            previous,
            current: mode,
        })
    }

    /// Parse `mode` and switch to it.
    pub fn set_mode_str(&self, mode: &str) -> Result<ModeSwitch, ModeSwitchError> {
        let parsed = mode.parse::<Mode>().map_err(|e| {
            tracing::error!(mode = %mode, "invalid mode requested");
            e
        })?;
        self.set_mode(parsed)
    }

    fn store_mode(&self, mode: Mode) {
        match self.mode.write() {
            Ok(mut guard) => *guard = mode,
            Err(poisoned) => *poisoned.into_inner() = mode,
        }
    }

    fn cloud_handle(&self) -> &CloudModelHandle {
        self.cloud.get_or_init(|| {
            let handle = (self.cloud_factory)(&self.cloud_config);
            tracing::info!(
                model = %handle.model_id(),
                region = %handle.region(),
                "cloud model handle initialized"
            );
            handle
        })
    }
}

impl fmt::Debug for ModelRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelRouter")
            .field("mode", &self.current_mode())
            .field("local", &self.local)
            .field("cloud", &self.cloud.get())
            .finish_non_exhaustive()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
