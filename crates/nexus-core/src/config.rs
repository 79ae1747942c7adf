//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! the backend base address, the storage backend for the session and the
//! request timeouts.
//!
//! Configuration is stored at `~/.config/nexus-explorer/config.json`; the
//! backend address can be overridden with `NEXUS_BACKEND_URL`.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Application name used for config/data directory paths
pub const APP_NAME: &str = "nexus-explorer";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable that overrides the backend address
pub const BACKEND_URL_ENV: &str = "NEXUS_BACKEND_URL";

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// HTTP request timeout in seconds.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Upper bound on the best-effort logout call, so signing out offline stays quick.
const DEFAULT_LOGOUT_TIMEOUT_SECS: u64 = 5;

/// Where the session token and profile are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// One file per key in the data directory
    #[default]
    File,
    /// OS keychain
    Keyring,
    /// Process memory only; nothing survives a restart
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend_url: String,
    pub storage: StorageBackend,
    pub request_timeout_secs: u64,
    pub logout_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            storage: StorageBackend::default(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            logout_timeout_secs: DEFAULT_LOGOUT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load the config file (defaults when absent) and apply environment overrides
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse config file")?
        } else {
            Self::default()
        };
        config.apply_env_override(std::env::var(BACKEND_URL_ENV).ok());
        Ok(config)
    }

    fn apply_env_override(&mut self, backend_url: Option<String>) {
        if let Some(url) = backend_url.filter(|u| !u.trim().is_empty()) {
            self.backend_url = url.trim().to_string();
        }
        self.backend_url = self.backend_url.trim_end_matches('/').to_string();
    }

    pub fn with_backend_url(mut self, url: &str) -> Self {
        self.apply_env_override(Some(url.to_string()));
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn logout_timeout(&self) -> Duration {
        Duration::from_secs(self.logout_timeout_secs)
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory holding persisted session state and logs
    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }
}
