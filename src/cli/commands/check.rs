//! Check command implementation.
//!
//! `irequire check` reports each target's status without installing
//! anything. The exit code is 1 if any target is not satisfied.

use crate::cli::args::CheckArgs;
use crate::engine::{CheckStatus, Host, RecordingObserver, Resolver, TargetCheck};
use crate::error::{IrequireError, Result};
use crate::shell::{PathLookup, SystemRunner};
use crate::ui::Console;

use super::dispatcher::{Command, CommandContext, CommandResult};

/// The check command implementation.
pub struct CheckCommand {
    context: CommandContext,
    args: CheckArgs,
}

impl CheckCommand {
    /// Create a new check command.
    pub fn new(context: CommandContext, args: CheckArgs) -> Self {
        Self { context, args }
    }

    fn print_human(&self, console: &mut Console, checks: &[TargetCheck]) {
        for check in checks {
            match check.status {
                CheckStatus::Satisfied => console.success(&check.target),
                CheckStatus::Unsatisfied => {
                    console.warning(&format!("{}: not installed", check.target))
                }
                CheckStatus::Unusable => console.error(&format!(
                    "{}: {}",
                    check.target,
                    check.error.as_deref().unwrap_or("unusable")
                )),
            }
        }
    }
}

impl Command for CheckCommand {
    fn execute(&self, console: &mut Console) -> Result<CommandResult> {
        let catalogue = self.context.load_catalogue()?;
        let lookup = PathLookup::system();
        let runner = SystemRunner::new();
        let host = Host::new(self.context.platform, &lookup, &runner)
            .with_version_timeout(catalogue.command_timeout);

        let mut observer = RecordingObserver::default();
        let checks = Resolver::new(host, &mut observer).check(&catalogue);

        if self.args.json {
            let json = serde_json::to_string_pretty(&checks)
                .map_err(|e| IrequireError::Other(e.into()))?;
            println!("{}", json);
        } else {
            self.print_human(console, &checks);
        }

        if checks.iter().all(TargetCheck::is_satisfied) {
            Ok(CommandResult::success())
        } else {
            Ok(CommandResult::failure(1))
        }
    }
}
