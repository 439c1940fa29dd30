//! Run configuration.
//!
//! This module holds the settings of one cleanup run with their defaults and
//! loads them from an optional YAML file. Environment variables and command
//! line flags are layered on top by the binary.

use crate::error::{CleanError, Result};
use config::{Config as ConfigRs, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[cfg(test)]
mod tests;

/// Settings for one cleanup run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Registry host, e.g. `gcr.io` or `eu.gcr.io`
    #[serde(default = "default_registry")]
    pub registry: String,

    /// Maximum number of deletions in flight
    #[serde(default = "default_parallel")]
    pub parallel: usize,

    /// When true, deletions are only logged
    #[serde(default = "default_noop")]
    pub noop: bool,

    /// Path to an account file holding the registry secret
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<PathBuf>,

    /// Accepted for compatibility; nothing listens on it.
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default)]
    pub log: Log,

    #[serde(default)]
    pub network: Network,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            registry: default_registry(),
            parallel: default_parallel(),
            noop: default_noop(),
            account: None,
            listen: default_listen(),
            log: Log::default(),
            network: Network::default(),
        }
    }
}

impl Config {
    /// Parses a `Config` from a YAML string.
    ///
    /// This function is primarily used for testing.
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let builder = Self::defaults_builder()?.add_source(File::from_str(s, FileFormat::Yaml));

        Self::from_builder(builder, None)
    }

    /// Loads a `Config` from an optional file path.
    ///
    /// With no path the defaults are returned. A path that is given must
    /// exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Self::defaults_builder()?;

        if let Some(p) = path {
            builder = builder.add_source(File::from(p).format(FileFormat::Yaml).required(true));
        }

        Self::from_builder(builder, path)
    }

    /// Checks values that serde alone cannot reject.
    pub fn validate(&self) -> Result<()> {
        if self.parallel == 0 {
            return Err(CleanError::config("parallel must be at least 1", None));
        }
        if self.registry.trim().is_empty() {
            return Err(CleanError::config("registry cannot be empty", None));
        }
        Ok(())
    }

    fn defaults_builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        let defaults = ConfigRs::try_from(&Config::default()).map_err(|e| {
            CleanError::config_with_source("Failed to build default configuration", None, e)
        })?;
        Ok(ConfigRs::builder().add_source(defaults))
    }

    /// Creates a `Config` from a `config::ConfigBuilder`.
    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
        path: Option<&Path>,
    ) -> Result<Self> {
        builder
            .build()
            .and_then(|cfg| cfg.try_deserialize())
            .map_err(|e| {
                CleanError::config_with_source(
                    "Failed to deserialize configuration".to_string(),
                    path.map(|p| p.display().to_string()),
                    e,
                )
            })
    }
}

fn default_registry() -> String {
    "gcr.io".to_string()
}

fn default_parallel() -> usize {
    10
}

// Destructive deletes require an explicit opt-out.
fn default_noop() -> bool {
    true
}

fn default_listen() -> String {
    ":3000".to_string()
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Log {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Enum for log line formats.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,

    Json,
}

impl From<&str> for LogFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Network settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Network {
    #[serde(default = "default_network_timeout")]
    pub timeout: u64,
}

impl Default for Network {
    fn default() -> Self {
        Self {
            timeout: default_network_timeout(),
        }
    }
}

fn default_network_timeout() -> u64 {
    30
}
