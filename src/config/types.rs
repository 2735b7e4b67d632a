//! Core configuration types and loading.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use super::defaults::{
    default_authority, default_console_name, default_log_level, default_max_args, default_prompt,
};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Defaults applied to listeners created through the dispatcher.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Interactive console host.
    #[serde(default)]
    pub console: ConsoleConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Listener defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    /// Upper arity bound for new listeners.
    #[serde(default = "default_max_args")]
    pub max_args: usize,
    /// Authority level for new listeners.
    #[serde(default = "default_authority")]
    pub default_authority: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_args: default_max_args(),
            default_authority: default_authority(),
        }
    }
}

/// Console session settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConsoleConfig {
    /// Invoker id lines typed on stdin run as.
    #[serde(default)]
    pub invoker_id: i32,
    #[serde(default)]
    pub authority: i32,
    #[serde(default = "default_console_name")]
    pub name: String,
    #[serde(default = "default_prompt")]
    pub prompt: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            invoker_id: 0,
            authority: 0,
            name: default_console_name(),
            prompt: default_prompt(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
