//! Schema command implementation.
//!
//! `irequire schema` prints the JSON Schema of the config file format, for
//! editor integration.

use crate::config::CatalogueConfig;
use crate::error::{IrequireError, Result};
use crate::ui::Console;

use super::dispatcher::{Command, CommandResult};

/// The schema command implementation.
pub struct SchemaCommand;

/// The config format's JSON Schema, pretty-printed.
pub fn config_schema() -> Result<String> {
    let schema = schemars::schema_for!(CatalogueConfig);
    serde_json::to_string_pretty(&schema).map_err(|e| IrequireError::Other(e.into()))
}

impl Command for SchemaCommand {
    fn execute(&self, _console: &mut Console) -> Result<CommandResult> {
        println!("{}", config_schema()?);
        Ok(CommandResult::success())
    }
}
