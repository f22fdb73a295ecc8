//! List command implementation.
//!
//! The `irequire list` command shows every template with its availability
//! on this host, then every target with its recipes in the order they
//! would be tried.

use crate::catalogue::{Availability, Catalogue};
use crate::error::Result;
use crate::shell::{BinaryLookup, PathLookup};
use crate::ui::Console;

use super::dispatcher::{Command, CommandContext, CommandResult};

/// The list command implementation.
pub struct ListCommand {
    context: CommandContext,
}

impl ListCommand {
    /// Create a new list command.
    pub fn new(context: CommandContext) -> Self {
        Self { context }
    }

    fn render(&self, catalogue: &Catalogue, lookup: &dyn BinaryLookup) -> Vec<String> {
        let mut lines = Vec::new();

        lines.push(format!("Templates ({}):", self.context.platform));
        let availability: Vec<(&str, Availability)> = catalogue
            .templates
            .iter()
            .map(|t| (t.name.as_str(), t.availability(self.context.platform, lookup)))
            .collect();
        for (name, status) in &availability {
            let marker = if status.is_active() { "+" } else { "-" };
            lines.push(format!("  {} {} ({})", marker, name, status));
        }

        lines.push(String::new());
        lines.push("Targets:".to_string());
        for target in &catalogue.targets {
            match &target.version {
                Some(constraint) => {
                    let mut bounds = Vec::new();
                    if let Some(min) = &constraint.minimum {
                        bounds.push(format!(">= {}", min));
                    }
                    if let Some(exactly) = &constraint.exactly {
                        bounds.push(format!("== {}", exactly));
                    }
                    lines.push(format!("  {} {}", target.name, bounds.join(", ")))
                }
                None => lines.push(format!("  {}", target.name)),
            }

            for recipe in &target.recipes {
                let active = availability
                    .iter()
                    .any(|(name, status)| *name == recipe.template && status.is_active());
                let suffix = if active { "" } else { " (inactive)" };
                lines.push(format!("    - {}{}", recipe.template, suffix));
            }
        }

        lines
    }
}

impl Command for ListCommand {
    fn execute(&self, console: &mut Console) -> Result<CommandResult> {
        let catalogue = self.context.load_catalogue()?;
        let lookup = PathLookup::system();

        for line in self.render(&catalogue, &lookup) {
            console.message(&line);
        }

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Platform;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn render_marks_inactive_recipes() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("irequire.yml"),
            r#"
targets:
  ninja:
    version: { minimum: "1.7.2" }
    recipes:
      - { template: apt-get, vars: { pkg_name: ninja-build } }
      - { template: port, vars: { pkg_name: ninja } }
"#,
        )
        .unwrap();

        let mut context = CommandContext::new(temp.path().to_path_buf());
        context.platform = Platform::Linux;
        let catalogue = context.load_catalogue().unwrap();
        let lookup = |name: &str| Some(PathBuf::from("/usr/bin").join(name));

        let lines = ListCommand::new(context).render(&catalogue, &lookup);

        assert!(lines.contains(&"Templates (linux):".to_string()));
        assert!(lines.contains(&"  + apt-get (active)".to_string()));
        assert!(lines.contains(&"  - port (unsupported platform)".to_string()));
        assert!(lines.contains(&"  ninja >= 1.7.2".to_string()));
        assert!(lines.contains(&"    - apt-get".to_string()));
        assert!(lines.contains(&"    - port (inactive)".to_string()));
    }
}
