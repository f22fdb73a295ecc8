//! Terminal reporter for engine runs.

use console::Term;
use std::io::Write;

use super::output::format_duration;
use super::{IrequireTheme, OutputMode, ProgressSpinner};
use crate::engine::{EngineEvent, EngineObserver, TargetState};

/// Writes user-facing output and turns engine events into status lines.
pub struct Console {
    term: Term,
    theme: IrequireTheme,
    mode: OutputMode,
    spinner: Option<ProgressSpinner>,
    /// Whether the current target went through an install.
    installing: bool,
}

impl Console {
    /// Create a console writing to stdout.
    pub fn new(mode: OutputMode, colors: bool) -> Self {
        Self {
            term: Term::stdout(),
            theme: IrequireTheme::for_colors(colors),
            mode,
            spinner: None,
            installing: false,
        }
    }

    /// Get the current output mode.
    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn theme(&self) -> &IrequireTheme {
        &self.theme
    }

    /// Display a message to the user.
    pub fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", msg).ok();
        }
    }

    /// Display a success message.
    pub fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", self.theme.format_success(msg)).ok();
        }
    }

    /// Display a warning message.
    pub fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", self.theme.format_warning(msg)).ok();
        }
    }

    /// Display an error message. Shown in every mode.
    pub fn error(&mut self, msg: &str) {
        let line = self.theme.format_error(msg);
        Term::stderr().write_line(&line).ok();
    }

    /// Display a hint below an error.
    pub fn hint(&mut self, msg: &str) {
        let line = self.theme.format_hint(msg);
        Term::stderr().write_line(&line).ok();
    }

    fn verbose(&mut self, msg: &str) {
        if self.mode.shows_command_output() {
            writeln!(self.term, "{}", self.theme.dim.apply_to(msg)).ok();
        }
    }

    fn progress(&mut self, msg: &str) {
        if self.mode.shows_progress() {
            writeln!(self.term, "{}", msg).ok();
        }
    }

    fn start_spinner(&mut self, command: &str) {
        self.stop_spinner();
        if self.mode.shows_spinners() && self.term.is_term() {
            self.spinner = Some(ProgressSpinner::with_indent(
                command,
                2,
                self.theme.clone(),
            ));
        } else {
            let line = format!("  {}", self.theme.command.apply_to(command));
            self.progress(&line);
        }
    }

    fn stop_spinner(&mut self) {
        if let Some(mut spinner) = self.spinner.take() {
            spinner.clear();
        }
    }

    fn print_command_output(&mut self, stdout: &str, stderr: &str) {
        if !self.mode.shows_command_output() {
            return;
        }
        for line in stdout.lines().chain(stderr.lines()) {
            writeln!(self.term, "    {}", self.theme.dim.apply_to(line)).ok();
        }
    }
}

impl EngineObserver for Console {
    fn on_event(&mut self, event: &EngineEvent) {
        match event {
            EngineEvent::TemplateEvaluated {
                template,
                availability,
            } => self.verbose(&format!("template {}: {}", template, availability)),
            EngineEvent::TargetStateChanged { target, state } => match state {
                TargetState::Unchecked => self.installing = false,
                TargetState::Installing => self.installing = true,
                TargetState::Satisfied if !self.installing => {
                    if self.mode.shows_progress() {
                        self.success(target);
                    }
                }
                TargetState::Satisfied | TargetState::Failed => self.stop_spinner(),
            },
            EngineEvent::RecipeSkipped { target, template } => {
                let line = self
                    .theme
                    .format_skipped(&format!("{}: {} not available", target, template));
                self.verbose(&line);
            }
            EngineEvent::RecipeStarted {
                target, template, ..
            } => {
                let line = self.theme.format_attempt(target, template);
                self.progress(&line);
            }
            EngineEvent::CommandStarted { command, .. } => self.start_spinner(command),
            EngineEvent::CommandFinished {
                command,
                exit_code,
                success,
                duration,
                stdout,
                stderr,
                ..
            } => {
                let summary = match (success, exit_code) {
                    (true, _) => format!("{} ({})", command, format_duration(*duration)),
                    (false, Some(code)) => format!("{} (exit code {})", command, code),
                    (false, None) => format!("{} (killed by signal)", command),
                };
                match self.spinner.take() {
                    Some(mut spinner) if *success => spinner.finish_success(&summary),
                    Some(mut spinner) => spinner.finish_error(&summary),
                    None if *success => self.verbose(&summary),
                    None => {
                        let line = format!("  {}", self.theme.format_error(&summary));
                        self.progress(&line);
                    }
                }
                self.print_command_output(stdout, stderr);
            }
            EngineEvent::RecipeFailed {
                target,
                template,
                error,
            } => {
                self.stop_spinner();
                self.warning(&format!(
                    "{}: template {} failed with: {}",
                    target, template, error
                ));
            }
            EngineEvent::RecipeUnsatisfied { target, template } => self.warning(&format!(
                "{}: {} finished but {} is still not satisfied",
                target, template, target
            )),
            EngineEvent::TargetInstalled {
                target, template, ..
            } => self.success(&format!("{} installed with {}", target, template)),
            // The caller reports the fatal error itself.
            EngineEvent::TargetFailed { .. } => self.stop_spinner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::Availability;
    use std::time::Duration;

    fn events() -> Vec<EngineEvent> {
        vec![
            EngineEvent::TemplateEvaluated {
                template: "brew".to_string(),
                availability: Availability::UnsupportedPlatform,
            },
            EngineEvent::TargetStateChanged {
                target: "ninja".to_string(),
                state: TargetState::Unchecked,
            },
            EngineEvent::TargetStateChanged {
                target: "ninja".to_string(),
                state: TargetState::Installing,
            },
            EngineEvent::RecipeSkipped {
                target: "ninja".to_string(),
                template: "port".to_string(),
            },
            EngineEvent::RecipeStarted {
                target: "ninja".to_string(),
                template: "apt-get".to_string(),
                attempt: 1,
            },
            EngineEvent::CommandStarted {
                template: "apt-get".to_string(),
                command: "sudo apt-get update".to_string(),
            },
            EngineEvent::CommandFinished {
                template: "apt-get".to_string(),
                command: "sudo apt-get update".to_string(),
                exit_code: Some(100),
                success: false,
                duration: Duration::from_millis(40),
                stdout: String::new(),
                stderr: "E: lock".to_string(),
            },
            EngineEvent::RecipeFailed {
                target: "ninja".to_string(),
                template: "apt-get".to_string(),
                error: "Template 'apt-get' failed (exit code 100): sudo apt-get update"
                    .to_string(),
            },
            EngineEvent::TargetFailed {
                target: "ninja".to_string(),
                platform: "linux".to_string(),
            },
        ]
    }

    #[test]
    fn silent_console_handles_every_event() {
        let mut console = Console::new(OutputMode::Silent, false);
        for event in events() {
            console.on_event(&event);
        }
        assert!(console.spinner.is_none());
    }

    #[test]
    fn verbose_console_handles_every_event() {
        let mut console = Console::new(OutputMode::Verbose, false);
        for event in events() {
            console.on_event(&event);
        }
        assert!(console.spinner.is_none());
        assert!(console.installing);
    }

    #[test]
    fn new_target_resets_install_tracking() {
        let mut console = Console::new(OutputMode::Quiet, false);
        console.on_event(&EngineEvent::TargetStateChanged {
            target: "meson".to_string(),
            state: TargetState::Installing,
        });
        console.on_event(&EngineEvent::TargetStateChanged {
            target: "gem".to_string(),
            state: TargetState::Unchecked,
        });
        assert!(!console.installing);
    }
}
