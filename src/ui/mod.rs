//! Terminal user interface.
//!
//! This module provides:
//! - [`Console`], the terminal [`EngineObserver`](crate::engine::EngineObserver)
//! - [`OutputMode`] verbosity levels
//! - Spinners and the color theme
//!
//! # Example
//!
//! ```
//! use irequire::ui::{Console, OutputMode};
//!
//! let mut console = Console::new(OutputMode::Silent, false);
//! console.success("all targets satisfied");
//! ```

pub mod console;
pub mod output;
pub mod spinner;
pub mod theme;

pub use console::Console;
pub use output::{format_duration, OutputMode};
pub use spinner::ProgressSpinner;
pub use theme::{should_use_colors, IrequireTheme};
