//! # Application configuration — `subwatch.toml`
//!
//! Defines the TOML configuration file read at start-up (filename:
//! [`SubwatchConfig::filename`] = `"subwatch.toml"`). It controls where the
//! sync server lives and how often the expiry scan runs.
//!
//! ## Structure
//!
//! ```toml
//! [api]
//! base_url = "http://localhost:3000/api"
//!
//! [alerts]
//! scan_interval_secs = 3600   # expiry scan period
//! ```
//!
//! All structs derive sensible defaults so a missing or empty config file is
//! equivalent to the default configuration.

use serde::{Deserialize, Serialize};

/// Top-level configuration stored in `subwatch.toml`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SubwatchConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub alerts: AlertConfig,
}

/// Sync server configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the sync/auth server.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

/// Expiry alert configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Seconds between expiry scans. The first scan runs immediately.
    #[serde(default = "default_scan_interval")]
    pub scan_interval_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_scan_interval() -> u64 {
    3600
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            scan_interval_secs: default_scan_interval(),
        }
    }
}

impl SubwatchConfig {
    /// Builder method to set the server base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.api.base_url = base_url.into();
        self
    }

    /// Builder method to set the expiry scan interval.
    pub fn with_scan_interval(mut self, secs: u64) -> Self {
        self.alerts.scan_interval_secs = secs;
        self
    }

    /// The well-known filename for the config file.
    pub fn filename() -> &'static str {
        "subwatch.toml"
    }

    /// Parse from TOML string.
    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Serialize to TOML string.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
