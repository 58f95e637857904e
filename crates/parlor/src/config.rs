//! Service configuration, loaded once at startup.
//!
//! The bootstrap reads a JSON file whose path comes from the
//! [`CONFIG_ENV`] environment variable and fails fast if the file is
//! missing or malformed. Nothing re-reads configuration after
//! startup.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Environment variable naming the config file path.
pub const CONFIG_ENV: &str = "PARLOR_CONFIG";

fn default_call_timeout_ms() -> u64 {
    5_000
}

/// Service configuration.
///
/// ```json
/// { "port": 44044, "call_timeout_ms": 1000 }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// TCP port the listener binds to.
    pub port: u16,

    /// Per-call timeout in milliseconds. Defaults to 5000.
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,
}

impl Config {
    /// Loads the config from the path named by [`CONFIG_ENV`].
    ///
    /// # Errors
    /// Fails if the variable is unset, the file can't be read, or
    /// the JSON doesn't parse. All of these are fatal to startup.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_ENV)
            .map_err(|_| ConfigError::PathNotSet)?;
        Self::from_path(Path::new(&path))
    }

    /// Loads the config from an explicit path.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::Unreadable(path.display().to_string(), e)
        })?;
        serde_json::from_str(&raw).map_err(ConfigError::Malformed)
    }

    /// The per-call timeout as a [`Duration`].
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    /// The address to bind the listener to.
    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

/// Errors that make configuration loading fail.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The environment variable naming the config file is unset.
    #[error("config path not set: export {CONFIG_ENV} first")]
    PathNotSet,

    /// The config file could not be read.
    #[error("cannot read config {0}: {1}")]
    Unreadable(String, #[source] std::io::Error),

    /// The config file is not valid JSON for [`Config`].
    #[error("malformed config: {0}")]
    Malformed(#[source] serde_json::Error),
}
