//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandContext`] for the settings every command shares
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::catalogue::Catalogue;
use crate::cli::args::{Cli, Commands};
use crate::config::load_catalogue_config;
use crate::error::Result;
use crate::platform::{HostFacts, Platform};
use crate::ui::Console;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// # Arguments
    ///
    /// * `console` - Terminal output and engine event reporting
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] indicating success/failure and exit code.
    fn execute(&self, console: &mut Console) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Settings shared by every command that reads the catalogue.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub project_root: PathBuf,
    /// Explicit `--config` path.
    pub config: Option<PathBuf>,
    /// Platform to evaluate against.
    pub platform: Platform,
    /// Mirror engine events into the log.
    pub trace_events: bool,
}

impl CommandContext {
    /// Create a context for the host platform.
    pub fn new(project_root: PathBuf) -> Self {
        let platform = Platform::current();
        if platform == Platform::Other {
            tracing::warn!(
                "{} is not a supported platform; no template will be active",
                std::env::consts::OS
            );
        }
        Self {
            project_root,
            config: None,
            platform,
            trace_events: false,
        }
    }

    /// Whether `--platform` names a platform other than the host's.
    pub fn is_foreign_platform(&self) -> bool {
        self.platform != Platform::current()
    }

    /// Load, validate and build the catalogue.
    pub fn load_catalogue(&self) -> Result<Catalogue> {
        let config = load_catalogue_config(&self.project_root, self.config.as_deref())?;
        Catalogue::from_config(&config, &HostFacts::for_platform(self.platform))
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    context: CommandContext,
}

impl CommandDispatcher {
    /// Create a new dispatcher for the given context.
    pub fn new(context: CommandContext) -> Self {
        Self { context }
    }

    /// Build the dispatcher from parsed arguments.
    pub fn from_cli(cli: &Cli, project_root: PathBuf) -> Self {
        let mut context = CommandContext::new(project_root);
        context.config = cli.config.clone();
        if let Some(platform) = cli.platform {
            context.platform = platform;
        }
        context.trace_events = cli.debug;
        Self::new(context)
    }

    /// Get the project root path.
    pub fn project_root(&self) -> &Path {
        &self.context.project_root
    }

    /// Dispatch and execute a command.
    ///
    /// Routes the CLI subcommand to the appropriate command implementation
    /// and executes it. No subcommand means `run`.
    pub fn dispatch(&self, cli: &Cli, console: &mut Console) -> Result<CommandResult> {
        match &cli.command {
            None | Some(Commands::Run) => {
                super::run::RunCommand::new(self.context.clone()).execute(console)
            }
            Some(Commands::Check(args)) => {
                super::check::CheckCommand::new(self.context.clone(), args.clone())
                    .execute(console)
            }
            Some(Commands::List) => {
                super::list::ListCommand::new(self.context.clone()).execute(console)
            }
            Some(Commands::Schema) => super::schema::SchemaCommand.execute(console),
            Some(Commands::Completions(args)) => {
                super::completions::CompletionsCommand::new(args.clone()).execute(console)
            }
        }
    }
}
