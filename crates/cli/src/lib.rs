//! Skarb CLI internals, exposed as a library so integration tests can
//! drive the commands directly.

pub mod commands;
pub mod exit_codes;

use exit_codes::EXIT_USAGE;

/// Command-level failure carrying its shell exit code.
#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self {
            code: EXIT_USAGE,
            message: msg.into(),
            hint: None,
        }
    }
}
