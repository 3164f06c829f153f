//! Configuration types for the admin orchestration core.

use commerce_gateway::GatewayConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{AdminError, Result};

/// Environment variable overriding [`GatewayConfig::base_url`].
pub const ENV_API_URL: &str = "COMMERCE_API_URL";

/// Environment variable overriding [`GatewayConfig::token`].
pub const ENV_API_TOKEN: &str = "COMMERCE_API_TOKEN";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Backend location, auth, and endpoint paths.
    pub gateway: GatewayConfig,
    /// Command dispatch settings.
    pub dispatch: DispatchConfig,
    /// Relation reconciliation settings.
    pub reconcile: ReconcileConfig,
}

/// Command dispatch configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Deadline for one AI interpretation attempt, in milliseconds.
    pub ai_timeout_ms: u64,
    /// Deadline for the availability probe, in milliseconds. A probe that
    /// misses it counts as "AI unavailable".
    pub probe_timeout_ms: u64,
    /// Substrings (case-insensitive) that mark an error message as coming
    /// from the AI provider rather than from the backend's own validation.
    pub provider_error_markers: Vec<String>,
    /// File name announced when uploading audio without one.
    pub audio_filename: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            ai_timeout_ms: 30_000,
            probe_timeout_ms: 5_000,
            provider_error_markers: vec!["OpenAI".to_owned()],
            audio_filename: "reporte.webm".to_owned(),
        }
    }
}

impl DispatchConfig {
    /// AI deadline as a [`Duration`].
    pub fn ai_timeout(&self) -> Duration {
        Duration::from_millis(self.ai_timeout_ms)
    }

    /// Probe deadline as a [`Duration`].
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// Returns `true` if `message` names the AI provider.
    pub fn is_provider_message(&self, message: &str) -> bool {
        let lowered = message.to_lowercase();
        self.provider_error_markers
            .iter()
            .filter(|m| !m.trim().is_empty())
            .any(|m| lowered.contains(&m.to_lowercase()))
    }
}

/// Relation reconciliation configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Maximum create calls in flight. `1` issues strictly one at a time.
    pub max_in_flight: usize,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self { max_in_flight: 1 }
    }
}

impl AdminConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| AdminError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| AdminError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `<config dir>/commerce-admin/config.toml`.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("commerce-admin")
            .join("config.toml")
    }

    /// Overlay `COMMERCE_API_URL` / `COMMERCE_API_TOKEN` from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Overlay values from an arbitrary lookup. Blank values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(url) = non_blank(ENV_API_URL) {
            self.gateway.base_url = url;
        }
        if let Some(token) = non_blank(ENV_API_TOKEN) {
            self.gateway.token = Some(token);
        }
    }

    /// Validates this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Config`] naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        self.gateway
            .validate()
            .map_err(|e| AdminError::Config(e.message().to_owned()))?;
        if self.dispatch.ai_timeout_ms == 0 {
            return Err(AdminError::Config(
                "ai_timeout_ms must be greater than 0".into(),
            ));
        }
        if self.dispatch.probe_timeout_ms == 0 {
            return Err(AdminError::Config(
                "probe_timeout_ms must be greater than 0".into(),
            ));
        }
        if self.reconcile.max_in_flight == 0 {
            return Err(AdminError::Config(
                "max_in_flight must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}
