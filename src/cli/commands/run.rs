//! Run command implementation.
//!
//! `irequire run` (or plain `irequire`) checks every target in order and
//! installs the missing ones, stopping at the first target that cannot be
//! installed.

use crate::engine::{EngineObserver, Host, Resolver, Tee, TracingObserver};
use crate::error::Result;
use crate::shell::{PathLookup, SystemRunner};
use crate::ui::Console;

use super::dispatcher::{Command, CommandContext, CommandResult};

/// The run command implementation.
pub struct RunCommand {
    context: CommandContext,
}

impl RunCommand {
    /// Create a new run command.
    pub fn new(context: CommandContext) -> Self {
        Self { context }
    }
}

impl Command for RunCommand {
    fn execute(&self, console: &mut Console) -> Result<CommandResult> {
        if self.context.is_foreign_platform() {
            console.error(&format!(
                "Cannot install for {} while running on another platform",
                self.context.platform
            ));
            console.hint("--platform only applies to `check` and `list`");
            return Ok(CommandResult::failure(2));
        }

        let catalogue = self.context.load_catalogue()?;
        let lookup = PathLookup::system();
        let runner = SystemRunner::new();
        let host = Host::new(self.context.platform, &lookup, &runner)
            .with_version_timeout(catalogue.command_timeout);

        let mut tracer = TracingObserver;
        let resolved = if self.context.trace_events {
            let mut tee = Tee::new(&mut *console, &mut tracer);
            Resolver::new(host, &mut tee).resolve(&catalogue)
        } else {
            let observer: &mut dyn EngineObserver = &mut *console;
            Resolver::new(host, observer).resolve(&catalogue)
        };
        let report = resolved?;

        let installed = report.installed().count();
        if installed == 0 {
            console.success("All requirements satisfied");
        } else {
            console.success(&format!(
                "All requirements satisfied ({} installed)",
                installed
            ));
        }

        Ok(CommandResult::success())
    }
}
