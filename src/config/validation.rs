//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use slcmd_proto::MAX_SLOTS;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("engine.max_args must be between 1 and {max}, got {value}")]
    MaxArgsOutOfRange { value: usize, max: usize },
    #[error("console.name is required")]
    MissingConsoleName,
    #[error("console.name must not contain whitespace: '{0}'")]
    InvalidConsoleName(String),
    #[error("logging.level is required")]
    MissingLogLevel,
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let max_args = config.engine.max_args;
    if max_args == 0 || max_args > MAX_SLOTS {
        errors.push(ValidationError::MaxArgsOutOfRange {
            value: max_args,
            max: MAX_SLOTS,
        });
    }

    let name = &config.console.name;
    if name.is_empty() {
        errors.push(ValidationError::MissingConsoleName);
    } else if name.chars().any(char::is_whitespace) {
        errors.push(ValidationError::InvalidConsoleName(name.clone()));
    }

    if config.logging.level.trim().is_empty() {
        errors.push(ValidationError::MissingLogLevel);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
