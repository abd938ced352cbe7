use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::registry::{LayoutRegistry, ServiceLayout};

/// Snapshot endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// URL of the traffic snapshot endpoint.
    #[serde(default = "default_url")]
    pub url: String,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_url() -> String {
    "http://localhost:8080/api/traffic/snapshot".to_string()
}

fn default_timeout_ms() -> u64 {
    5000
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl EndpointConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Polling settings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PollConfig {
    /// Interval between polls in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Whether polling starts enabled.
    #[serde(default = "default_auto_refresh")]
    pub auto_refresh: bool,
}

fn default_interval_ms() -> u64 {
    2000
}

fn default_auto_refresh() -> bool {
    true
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            auto_refresh: default_auto_refresh(),
        }
    }
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Service layout overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Drop the built-in service placements instead of extending them.
    #[serde(default)]
    pub replace_defaults: bool,

    /// Extra or overriding service placements.
    #[serde(default)]
    pub services: Vec<ServiceLayout>,
}

impl LayoutConfig {
    /// Build the layout registry described by this configuration.
    pub fn registry(&self) -> LayoutRegistry {
        LayoutRegistry::from_config(&self.services, self.replace_defaults)
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format (default).
    #[default]
    Text,
    /// Structured JSON format.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format: "text" or "json".
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Top-level TrafficScope configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrafficScopeConfig {
    /// Snapshot endpoint settings.
    #[serde(default)]
    pub endpoint: EndpointConfig,

    /// Polling settings.
    #[serde(default)]
    pub poll: PollConfig,

    /// Service layout overrides.
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TrafficScopeConfig {
    /// Check values that serde cannot validate on its own.
    pub fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(self.endpoint.url.trim()).map_err(|e| {
            Error::Config(format!(
                "Invalid endpoint URL '{}': {}",
                self.endpoint.url, e
            ))
        })?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(Error::Config(format!(
                "Endpoint URL must be an http:// or https:// URL with a host, got '{}'",
                self.endpoint.url
            )));
        }

        if self.poll.interval_ms < 100 {
            return Err(Error::Config(format!(
                "Poll interval must be at least 100 ms, got {}",
                self.poll.interval_ms
            )));
        }

        if self.endpoint.timeout_ms == 0 {
            return Err(Error::Config("Endpoint timeout must be non-zero".to_string()));
        }

        Ok(())
    }
}

/// Load a configuration file in JSON5 format.
pub fn load_config<T: for<'de> Deserialize<'de>>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!(
            "Failed to read config file '{}': {}",
            path.display(),
            e
        ))
    })?;

    json5::from_str(&content).map_err(|e| {
        Error::Config(format!(
            "Failed to parse config file '{}': {}",
            path.display(),
            e
        ))
    })
}

/// Load a configuration from a JSON5 string.
pub fn parse_config<T: for<'de> Deserialize<'de>>(content: &str) -> Result<T> {
    json5::from_str(content).map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
}
