//! Configuration management for todo-live.
//!
//! This module handles the `config.yaml` file in the data directory, which
//! stores where the task service lives and how push events are reconciled.
//! Every field has a default, so a missing or partial file is fine.

use crate::board::ReconcileStrategy;
use crate::error::{Error, Result};
use crate::paths;
use crate::tasks::InsertPosition;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Environment variable overriding [`ClientConfig::api_url`].
pub const API_URL_ENV_VAR: &str = "TODO_LIVE_API_URL";

/// Environment variable overriding [`ClientConfig::push_url`].
pub const PUSH_URL_ENV_VAR: &str = "TODO_LIVE_PUSH_URL";

const DEFAULT_API_URL: &str = "http://localhost:5000/api";
const DEFAULT_PUSH_URL: &str = "ws://localhost:5000/socket.io/?EIO=4&transport=websocket";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RECONNECT_DELAY_SECS: u64 = 5;

/// Client configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the task API, e.g. `https://todo.example.com/api`.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Websocket URL of the push channel.
    #[serde(default = "default_push_url")]
    pub push_url: String,

    /// How push events are folded into the local task list.
    #[serde(default)]
    pub reconcile: ReconcileStrategy,

    /// Where newly created tasks appear in the list.
    #[serde(default)]
    pub insert_position: InsertPosition,

    /// Timeout for each API request, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Delay before the push channel reconnects, in seconds.
    #[serde(default = "default_reconnect_delay_secs")]
    pub reconnect_delay_secs: u64,

    /// Log at debug level instead of info.
    #[serde(default)]
    pub debug_logging: bool,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_push_url() -> String {
    DEFAULT_PUSH_URL.to_string()
}

const fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

const fn default_reconnect_delay_secs() -> u64 {
    DEFAULT_RECONNECT_DELAY_SECS
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            push_url: default_push_url(),
            reconcile: ReconcileStrategy::default(),
            insert_position: InsertPosition::default(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            reconnect_delay_secs: DEFAULT_RECONNECT_DELAY_SECS,
            debug_logging: false,
        }
    }
}

impl ClientConfig {
    /// Load config from a data directory, returning None if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load_from(data_dir: &Path) -> Result<Option<Self>> {
        let config_path = paths::config_path(data_dir);
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(Some(config))
    }

    /// Load config from a data directory, falling back to defaults, then
    /// apply environment overrides and validate the URLs.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or a URL is invalid.
    pub fn resolve(data_dir: &Path) -> Result<Self> {
        let mut config = Self::load_from(data_dir)?.unwrap_or_default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Save config to a data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_to(&self, data_dir: &Path) -> Result<()> {
        let config_path = paths::config_path(data_dir);

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    /// Override URLs from a variable lookup (normally the process environment).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(api_url) = lookup(API_URL_ENV_VAR).filter(|v| !v.trim().is_empty()) {
            self.api_url = api_url;
        }
        if let Some(push_url) = lookup(PUSH_URL_ENV_VAR).filter(|v| !v.trim().is_empty()) {
            self.push_url = push_url;
        }
    }

    /// Check that both URLs parse and use the expected schemes.
    ///
    /// # Errors
    ///
    /// Returns a config error describing the first invalid URL.
    pub fn validate(&self) -> Result<()> {
        self.api_base()?;
        self.push_endpoint()?;
        Ok(())
    }

    /// The API base URL, with a trailing slash so relative joins append.
    ///
    /// # Errors
    ///
    /// Returns a config error if the URL is invalid or not http(s).
    pub fn api_base(&self) -> Result<Url> {
        let mut raw = self.api_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let url = Url::parse(&raw)
            .map_err(|e| Error::Config(format!("invalid api_url '{}': {e}", self.api_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "api_url must use http or https, got '{}'",
                url.scheme()
            )));
        }
        Ok(url)
    }

    /// The push channel URL.
    ///
    /// # Errors
    ///
    /// Returns a config error if the URL is invalid or not ws(s).
    pub fn push_endpoint(&self) -> Result<Url> {
        let url = Url::parse(self.push_url.trim())
            .map_err(|e| Error::Config(format!("invalid push_url '{}': {e}", self.push_url)))?;
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(Error::Config(format!(
                "push_url must use ws or wss, got '{}'",
                url.scheme()
            )));
        }
        Ok(url)
    }

    /// Timeout for each API request.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Delay before the push channel reconnects.
    #[must_use]
    pub const fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }
}

/// Ensure a config file exists in the data directory, creating one with
/// defaults if not.
///
/// # Errors
///
/// Returns an error if the existing file cannot be parsed or a new one cannot be written.
pub fn ensure_config(data_dir: &Path) -> Result<ClientConfig> {
    if let Some(config) = ClientConfig::load_from(data_dir)? {
        return Ok(config);
    }
    let config = ClientConfig::default();
    config.save_to(data_dir)?;
    Ok(config)
}
