//! Configuration loading, parsing, and validation for irequire.
//!
//! This module handles all aspects of configuration:
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//! - Built-in templates in [`builtin`]
//! - Validation in [`validator`]
//! - Placeholder substitution in [`interpolation`]
//!
//! # Example
//!
//! ```
//! use irequire::config::{load_catalogue_config, validate};
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! fs::write(
//!     temp.path().join("irequire.yml"),
//!     "targets:\n  meson:\n    recipes: [{ template: pip3, vars: { pkg_name: meson } }]\n",
//! )
//! .unwrap();
//!
//! let config = load_catalogue_config(temp.path(), None).unwrap();
//! validate(&config).unwrap();
//! assert!(config.templates.contains_key("pip3"));
//! ```

pub mod builtin;
pub mod interpolation;
pub mod loader;
pub mod schema;
pub mod validator;

// Schema re-exports
pub use schema::{
    CatalogueConfig, ConditionalConfig, OrderedMap, RecipeConfig, Settings, TargetConfig,
    TemplateConfig, VersionConfig,
};

// Loader re-exports
pub use loader::{
    find_config, load_catalogue_config, load_config_file, parse_config, CONFIG_CANDIDATES,
    STDIN_PATH,
};

pub use builtin::{load_templates as load_builtin_templates, with_builtin_templates};

// Validator re-exports
pub use validator::{validate, validate_config, ValidationError};

// Interpolation re-exports
pub use interpolation::{
    extract_variables, has_interpolation, parse_interpolation, resolve_string, resolve_tokens,
    InterpolationContext, Segment, Variables,
};
