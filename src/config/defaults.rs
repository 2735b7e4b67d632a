//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

use slcmd_proto::MAX_SLOTS;

// =============================================================================
// Engine Defaults
// =============================================================================

pub fn default_max_args() -> usize {
    MAX_SLOTS
}

/// Negative disables the default authority check.
pub fn default_authority() -> i32 {
    -1
}

// =============================================================================
// Console Defaults
// =============================================================================

pub fn default_console_name() -> String {
    "console".to_string()
}

pub fn default_prompt() -> String {
    "> ".to_string()
}

// =============================================================================
// Logging Defaults
// =============================================================================

pub fn default_log_level() -> String {
    "info".to_string()
}
