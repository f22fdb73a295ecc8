//! irequire - declarative host requirement installer.
//!
//! irequire reads a catalogue of installation templates and target tools,
//! checks which targets are missing or too old on the current host, and
//! installs each one by trying its recipes in order until one works.
//!
//! # Modules
//!
//! - [`catalogue`] - Templates, targets and recipes built from config
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading, parsing, and validation
//! - [`engine`] - Template evaluation and target resolution
//! - [`error`] - Error types and result aliases
//! - [`platform`] - Host platform detection and facts
//! - [`shell`] - Binary lookup and process execution
//! - [`ui`] - Spinners, themes, and terminal output
//! - [`version`] - Version parsing and comparison
//!
//! # Example
//!
//! ```
//! use irequire::config::{resolve_string, InterpolationContext, Variables};
//!
//! let mut vars = Variables::new();
//! vars.insert("pkg_name".to_string(), "ninja-build".to_string());
//! let ctx = InterpolationContext::new().with_layer(&vars);
//! let command = resolve_string("apt-get install {pkg_name}", &ctx).unwrap();
//! assert_eq!(command, "apt-get install ninja-build");
//! ```
//!
//! For file-based config loading, see the integration tests.

pub mod catalogue;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod platform;
pub mod shell;
pub mod ui;
pub mod version;

pub use error::{IrequireError, Result};
