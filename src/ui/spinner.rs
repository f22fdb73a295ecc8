//! Progress spinners.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use super::theme::IrequireTheme;

/// A progress spinner for a running command.
pub struct ProgressSpinner {
    bar: ProgressBar,
    indent: usize,
    theme: IrequireTheme,
}

impl ProgressSpinner {
    /// Create a new spinner with a message.
    pub fn new(message: &str, theme: IrequireTheme) -> Self {
        Self::with_indent(message, 0, theme)
    }

    /// Create a new spinner with indentation.
    pub fn with_indent(message: &str, indent: usize, theme: IrequireTheme) -> Self {
        let bar = ProgressBar::new_spinner();
        let prefix = " ".repeat(indent);
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template(&format!("{}{{spinner:.magenta}} {{msg}}", prefix))
        {
            bar.set_style(style);
        }
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));

        Self { bar, indent, theme }
    }

    /// Create a spinner that doesn't show (for silent mode).
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            indent: 0,
            theme: IrequireTheme::plain(),
        }
    }

    /// Update the spinner message.
    pub fn set_message(&mut self, msg: &str) {
        self.bar.set_message(msg.to_string());
    }

    /// Mark the operation as successful.
    pub fn finish_success(&mut self, msg: &str) {
        let line = self.theme.format_success(msg);
        self.finish_with(line);
    }

    /// Mark the operation as failed.
    pub fn finish_error(&mut self, msg: &str) {
        let line = self.theme.format_error(msg);
        self.finish_with(line);
    }

    /// Mark as skipped.
    pub fn finish_skipped(&mut self, msg: &str) {
        let line = self.theme.format_skipped(msg);
        self.finish_with(line);
    }

    /// Remove the spinner without leaving a line behind.
    pub fn clear(&mut self) {
        self.bar.finish_and_clear();
    }

    fn finish_with(&mut self, line: String) {
        let prefix = " ".repeat(self.indent);
        if let Ok(style) = ProgressStyle::default_spinner().template("{msg}") {
            self.bar.set_style(style);
        }
        self.bar.finish_with_message(format!("{}{}", prefix, line));
    }
}

impl Drop for ProgressSpinner {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_spinner_accepts_all_calls() {
        let mut spinner = ProgressSpinner::hidden();
        spinner.set_message("sudo apt-get update");
        spinner.finish_success("sudo apt-get update");
        assert!(spinner.bar.is_finished());
    }

    #[test]
    fn spinner_finishes_with_error() {
        let mut spinner = ProgressSpinner::with_indent("wget", 2, IrequireTheme::plain());
        spinner.finish_error("wget (exit code 8)");
        assert!(spinner.bar.is_finished());
    }

    #[test]
    fn spinner_can_be_cleared() {
        let mut spinner = ProgressSpinner::new("brew install ninja", IrequireTheme::plain());
        spinner.clear();
        assert!(spinner.bar.is_finished());
    }
}
