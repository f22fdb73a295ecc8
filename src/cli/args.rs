//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::platform::Platform;

/// irequire - Make sure the tools a project needs are installed.
#[derive(Debug, Parser)]
#[command(name = "irequire")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file, or `-` for stdin (overrides irequire.yml discovery)
    #[arg(short, long, global = true, env = "IREQUIRE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to project root (overrides current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Evaluate templates and conditionals as if on another platform
    #[arg(long, global = true, value_parser = parse_platform)]
    pub platform: Option<Platform>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

fn parse_platform(s: &str) -> Result<Platform, String> {
    s.parse()
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Install every missing target (default if no command specified)
    Run,

    /// Report which targets are satisfied without installing anything
    Check(CheckArgs),

    /// List templates with their availability and targets with their recipes
    List,

    /// Print the JSON Schema of the config format
    Schema,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `check` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct CheckArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
