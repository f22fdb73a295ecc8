//! Boundary collaborators: process execution and executable discovery.

pub mod command;
pub mod lookup;

pub use command::{CommandResult, CommandSpec, ProcessRunner, SystemRunner};
pub use lookup::{parse_system_path, resolve_tool_path, BinaryLookup, PathLookup};
