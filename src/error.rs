//! Error types for irequire operations.
//!
//! This module defines [`IrequireError`], the primary error type used
//! throughout the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Configuration problems are reported at load time and never mid-run
//! - `InstallStepFailed`, `TimedOut` and `CommandFailed` abort one recipe;
//!   the target moves on to its next recipe
//! - `InstallFailed`, `InvalidVersion` and `VersionQueryFailed` are fatal
//!   for the whole resolution run
//! - Use `anyhow::Error` (via `IrequireError::Other`) for unexpected errors

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Core error type for irequire operations.
#[derive(Debug, Error)]
pub enum IrequireError {
    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// No version number could be located in the given text.
    #[error("Invalid version string: '{raw}'")]
    InvalidVersion { raw: String },

    /// A target's binary exists but its version query could not be run.
    #[error("Version query for '{target}' failed: {command}: {message}")]
    VersionQueryFailed {
        target: String,
        command: String,
        message: String,
    },

    /// A placeholder string is malformed (unbalanced braces, empty name).
    #[error("Invalid placeholder in '{input}': {message}")]
    InvalidPlaceholder { input: String, message: String },

    /// A placeholder references a variable nobody defines.
    #[error("Unknown variable '{name}' in '{input}'")]
    UnknownVariable { name: String, input: String },

    /// A process could not be started at all.
    #[error("Failed to run '{command}': {message}")]
    CommandFailed { command: String, message: String },

    /// One command line of a template exited unsuccessfully.
    #[error("Template '{template}' failed ({}): {command}", exit_label(.code))]
    InstallStepFailed {
        template: String,
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// A command exceeded its time limit and was killed. `output` holds
    /// whatever it printed before that.
    #[error("Command timed out after {}s: {command}{}", seconds(.timeout), output_tail(.output))]
    TimedOut {
        command: String,
        timeout: Duration,
        output: String,
    },

    /// Every recipe of a target was exhausted without satisfying it.
    #[error("Failed to install '{target}' for {platform}")]
    InstallFailed { target: String, platform: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl IrequireError {
    /// Whether this error ends the resolution run rather than one recipe.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            IrequireError::InstallFailed { .. }
                | IrequireError::InvalidVersion { .. }
                | IrequireError::VersionQueryFailed { .. }
        )
    }

    /// Whether this error comes from loading or validating configuration.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            IrequireError::ConfigNotFound { .. }
                | IrequireError::ConfigParseError { .. }
                | IrequireError::ConfigValidationError { .. }
        )
    }
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "killed by signal".to_string(),
    }
}

fn seconds(timeout: &Duration) -> u64 {
    timeout.as_secs()
}

/// Lines of a hung command's output kept in its error message.
const OUTPUT_TAIL_LINES: usize = 5;

fn output_tail(output: &str) -> String {
    let lines: Vec<&str> = output.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.is_empty() {
        return String::new();
    }
    let tail = &lines[lines.len().saturating_sub(OUTPUT_TAIL_LINES)..];
    format!("\n  last output:\n    {}", tail.join("\n    "))
}

/// Result type alias for irequire operations.
pub type Result<T> = std::result::Result<T, IrequireError>;
