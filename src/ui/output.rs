//! Output mode.

use std::time::Duration;

/// How much the console prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Template evaluation, skipped recipes and captured command output too.
    Verbose,
    /// One line per recipe attempt plus a spinner per command.
    #[default]
    Normal,
    /// Spinners and final status lines.
    Quiet,
    /// Errors only.
    Silent,
}

impl OutputMode {
    /// Pick a mode from the `--verbose` / `--quiet` flags. `--quiet` wins.
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        if quiet {
            Self::Quiet
        } else if verbose {
            Self::Verbose
        } else {
            Self::Normal
        }
    }

    pub fn shows_command_output(self) -> bool {
        self == Self::Verbose
    }

    pub fn shows_spinners(self) -> bool {
        self != Self::Silent
    }

    pub fn shows_status(self) -> bool {
        self != Self::Silent
    }

    /// Per-recipe `target - try: template` lines.
    pub fn shows_progress(self) -> bool {
        matches!(self, Self::Verbose | Self::Normal)
    }
}

/// Format a duration for humans: `340ms`, `2.5s`, `1.5m`.
pub fn format_duration(d: Duration) -> String {
    match d.as_secs_f64() {
        secs if secs < 1.0 => format!("{}ms", d.as_millis()),
        secs if secs < 60.0 => format!("{:.1}s", secs),
        secs => format!("{:.1}m", secs / 60.0),
    }
}
