//! Installation strategies.

use crate::config::interpolation::{resolve_tokens, InterpolationContext, Variables};
use crate::config::schema::TemplateConfig;
use crate::engine::observer::{EngineEvent, EngineObserver};
use crate::error::{IrequireError, Result};
use crate::platform::Platform;
use crate::shell::{BinaryLookup, CommandSpec, ProcessRunner};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Whether a template can be used on this host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "binary")]
pub enum Availability {
    /// Usable right now.
    Active,
    /// The current platform is not in the template's list.
    UnsupportedPlatform,
    /// A required binary is not on PATH.
    MissingBinary(String),
}

impl Availability {
    pub fn is_active(&self) -> bool {
        matches!(self, Availability::Active)
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Availability::Active => f.write_str("active"),
            Availability::UnsupportedPlatform => f.write_str("unsupported platform"),
            Availability::MissingBinary(name) => write!(f, "missing '{}'", name),
        }
    }
}

/// Per-recipe process options applied to every command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeOptions {
    pub cwd: Option<PathBuf>,
    pub shell: bool,
    pub env: Variables,
}

/// A named installation strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub name: String,
    pub platforms: Vec<Platform>,
    pub requires: Vec<String>,
    pub cmd_list: Vec<Vec<String>>,
    /// Placeholder defaults, consulted after the recipe's variables.
    pub vars: Variables,
    pub timeout: Option<Duration>,
}

impl Template {
    /// Build from config. `default_timeout` applies when the template sets none.
    pub fn from_config(
        name: &str,
        config: &TemplateConfig,
        default_timeout: Option<Duration>,
    ) -> Self {
        Self {
            name: name.to_string(),
            platforms: config.platforms.clone(),
            requires: config.requires.clone(),
            cmd_list: config.cmd_list.clone(),
            vars: config.vars.clone(),
            timeout: config.timeout.map(Duration::from_secs).or(default_timeout),
        }
    }

    /// Check platform support first, then every required binary.
    pub fn availability(&self, platform: Platform, lookup: &dyn BinaryLookup) -> Availability {
        if !self.platforms.contains(&platform) {
            return Availability::UnsupportedPlatform;
        }

        match self.requires.iter().find(|bin| lookup.find(bin).is_none()) {
            Some(missing) => Availability::MissingBinary(missing.clone()),
            None => Availability::Active,
        }
    }

    /// Whether the template can be used on `platform` right now.
    pub fn is_valid(&self, platform: Platform, lookup: &dyn BinaryLookup) -> bool {
        self.availability(platform, lookup).is_active()
    }

    /// Run every command line in order, stopping at the first failure.
    ///
    /// Placeholders resolve against `variables` first and the template's
    /// own `vars` second. Each command is substituted right before it runs.
    ///
    /// # Errors
    ///
    /// `InstallStepFailed` when a command exits unsuccessfully; runner
    /// errors (`CommandFailed`, `TimedOut`) and substitution errors
    /// propagate unchanged.
    pub fn execute(
        &self,
        variables: &Variables,
        options: &RecipeOptions,
        runner: &dyn ProcessRunner,
        observer: &mut dyn EngineObserver,
    ) -> Result<()> {
        let context = InterpolationContext::new()
            .with_layer(variables)
            .with_layer(&self.vars);

        for tokens in &self.cmd_list {
            let spec = CommandSpec {
                argv: resolve_tokens(tokens, &context)?,
                cwd: options.cwd.clone(),
                shell: options.shell,
                env: options.env.clone(),
                timeout: self.timeout,
            };
            let command = spec.display();

            observer.on_event(&EngineEvent::CommandStarted {
                template: self.name.clone(),
                command: command.clone(),
            });

            let result = runner.run(&spec)?;

            observer.on_event(&EngineEvent::CommandFinished {
                template: self.name.clone(),
                command: command.clone(),
                exit_code: result.exit_code,
                success: result.success,
                duration: result.duration,
                stdout: result.stdout.clone(),
                stderr: result.stderr.clone(),
            });

            if !result.success {
                return Err(IrequireError::InstallStepFailed {
                    template: self.name.clone(),
                    command,
                    code: result.exit_code,
                    stderr: result.stderr.trim().to_string(),
                });
            }
        }

        Ok(())
    }
}
