//! Visual theme and styling.

use console::Style;

/// irequire's visual theme.
#[derive(Debug, Clone)]
pub struct IrequireTheme {
    /// Style for success messages (green).
    pub success: Style,
    /// Style for warning messages (orange).
    pub warning: Style,
    /// Style for error messages (red bold).
    pub error: Style,
    /// Style for running elements (magenta).
    pub info: Style,
    /// Style for dim/secondary text.
    pub dim: Style,
    /// Style for target and template names (bold).
    pub highlight: Style,
    /// Style for commands shown in output (dim italic).
    pub command: Style,
    /// Style for durations (dim).
    pub duration: Style,
    /// Style for contextual hints (magenta dim).
    pub hint: Style,
}

impl Default for IrequireTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl IrequireTheme {
    /// Create the default theme.
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().color256(208),
            error: Style::new().red().bold(),
            info: Style::new().magenta(),
            dim: Style::new().dim(),
            highlight: Style::new().bold(),
            command: Style::new().dim().italic(),
            duration: Style::new().dim(),
            hint: Style::new().magenta().dim(),
        }
    }

    /// Create a theme without colors (for non-TTY or --no-color).
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            info: Style::new(),
            dim: Style::new(),
            highlight: Style::new(),
            command: Style::new(),
            duration: Style::new(),
            hint: Style::new(),
        }
    }

    /// Pick colored or plain.
    pub fn for_colors(colors: bool) -> Self {
        if colors {
            Self::new()
        } else {
            Self::plain()
        }
    }

    /// Format a success message (icon + text in green).
    pub fn format_success(&self, msg: &str) -> String {
        format!("{}", self.success.apply_to(format!("✓ {}", msg)))
    }

    /// Format a warning message (icon + text in orange).
    pub fn format_warning(&self, msg: &str) -> String {
        format!("{}", self.warning.apply_to(format!("⚠ {}", msg)))
    }

    /// Format an error message (icon + text in red bold).
    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.error.apply_to(format!("✗ {}", msg)))
    }

    /// Format a skipped message (icon + text in dim).
    pub fn format_skipped(&self, msg: &str) -> String {
        format!("{}", self.dim.apply_to(format!("○ {}", msg)))
    }

    /// Format a recipe attempt: `ninja - try: apt-get`.
    pub fn format_attempt(&self, target: &str, template: &str) -> String {
        format!(
            "{} {} {}",
            self.highlight.apply_to(target),
            self.dim.apply_to("- try:"),
            self.info.apply_to(template)
        )
    }

    /// Format a hint line.
    pub fn format_hint(&self, msg: &str) -> String {
        format!("{}", self.hint.apply_to(msg))
    }
}

/// Check if colors should be enabled.
pub fn should_use_colors() -> bool {
    // Check NO_COLOR env var (https://no-color.org/)
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    // Check if stdout is a TTY
    console::Term::stdout().is_term()
}
