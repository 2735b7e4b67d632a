//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Config struct definitions (Config, EngineConfig, ConsoleConfig, LoggingConfig)
//! - [`defaults`]: serde default value functions
//! - [`validation`]: startup validation returning every problem found

mod defaults;
mod types;
mod validation;

pub use types::{Config, ConfigError, ConsoleConfig, EngineConfig, LoggingConfig};
pub use validation::{ValidationError, validate};
