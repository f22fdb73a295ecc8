//! Typed, validated templates and targets.
//!
//! A [`Catalogue`] is built once per run from a [`CatalogueConfig`]; it keeps
//! the config's declaration order for both templates and targets.

pub mod target;
pub mod template;

pub use target::{InstallOutcome, Recipe, Target, VersionConstraint};
pub use template::{Availability, RecipeOptions, Template};

use crate::config::schema::CatalogueConfig;
use crate::config::validator::validate;
use crate::error::Result;
use crate::platform::HostFacts;
use std::time::Duration;

/// Every template and target of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalogue {
    pub templates: Vec<Template>,
    pub targets: Vec<Target>,
    /// Default time limit for commands and version queries.
    pub command_timeout: Option<Duration>,
}

impl Catalogue {
    /// Validate `config` and build the catalogue for a host.
    ///
    /// # Errors
    ///
    /// `ConfigValidationError` listing every problem found.
    pub fn from_config(config: &CatalogueConfig, facts: &HostFacts) -> Result<Self> {
        validate(config)?;

        let command_timeout = config.settings.command_timeout.map(Duration::from_secs);

        let templates = config
            .templates
            .iter()
            .map(|(name, template)| Template::from_config(name, template, command_timeout))
            .collect();

        let targets = config
            .targets
            .iter()
            .map(|(name, target)| Target::from_config(name, target, &config.settings, facts))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            templates,
            targets,
            command_timeout,
        })
    }

    /// Look a template up by name.
    pub fn template(&self, name: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.name == name)
    }

    /// Look a target up by name.
    pub fn target(&self, name: &str) -> Option<&Target> {
        self.targets.iter().find(|t| t.name == name)
    }
}
