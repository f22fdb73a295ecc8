//! Configuration validation rules.
//!
//! This module validates a catalogue for correctness before anything runs:
//! - Templates must name at least one platform and one non-empty command
//! - Targets must have recipes, and every recipe must name a known template
//! - Version constraints must parse
//! - Placeholders must be well formed and refer to defined variables

use crate::config::interpolation::extract_variables;
use crate::config::schema::{CatalogueConfig, TargetConfig};
use crate::error::{IrequireError, Result};
use crate::version::Version;
use std::collections::BTreeSet;

/// Validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Rule identifier
    pub rule: String,
    /// Human-readable error message
    pub message: String,
    /// Template name if error is template-specific
    pub template: Option<String>,
    /// Target name if error is target-specific
    pub target: Option<String>,
}

impl ValidationError {
    fn template(rule: &str, name: &str, message: String) -> Self {
        Self {
            rule: rule.to_string(),
            message,
            template: Some(name.to_string()),
            target: None,
        }
    }

    fn target(rule: &str, name: &str, message: String) -> Self {
        Self {
            rule: rule.to_string(),
            message,
            template: None,
            target: Some(name.to_string()),
        }
    }
}

/// Validate a configuration and return all errors.
///
/// This function collects all validation errors rather than stopping
/// at the first one, allowing users to fix multiple issues at once.
pub fn validate_config(config: &CatalogueConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    errors.extend(validate_settings(config));
    errors.extend(validate_templates(config));
    errors.extend(validate_targets(config));

    errors
}

fn validate_settings(config: &CatalogueConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if config.settings.version_cmd.trim().is_empty() {
        errors.push(ValidationError {
            rule: "empty-version-cmd".to_string(),
            message: "settings.version_cmd must not be empty".to_string(),
            template: None,
            target: None,
        });
    }

    errors
}

/// Validate template definitions.
fn validate_templates(config: &CatalogueConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (name, template) in config.templates.iter() {
        if template.platforms.is_empty() {
            errors.push(ValidationError::template(
                "empty-platforms",
                name,
                format!("Template '{}' lists no platforms", name),
            ));
        }

        if template.cmd_list.is_empty() {
            errors.push(ValidationError::template(
                "empty-cmd-list",
                name,
                format!("Template '{}' has no commands", name),
            ));
        }

        for (index, command) in template.cmd_list.iter().enumerate() {
            if command.is_empty() {
                errors.push(ValidationError::template(
                    "empty-command",
                    name,
                    format!("Template '{}' command #{} is empty", name, index + 1),
                ));
            }

            for token in command {
                if let Err(e) = extract_variables(token) {
                    errors.push(ValidationError::template(
                        "invalid-placeholder",
                        name,
                        format!("Template '{}': {}", name, e),
                    ));
                }
            }
        }
    }

    errors
}

/// Validate target definitions and their recipes.
fn validate_targets(config: &CatalogueConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (name, target) in config.targets.iter() {
        if target.recipes.is_empty() {
            errors.push(ValidationError::target(
                "empty-recipes",
                name,
                format!("Target '{}' has no recipes", name),
            ));
        }

        errors.extend(validate_version(name, target));

        for (var, conditional) in &target.conditionals {
            if conditional.values.is_empty() && conditional.default.is_none() {
                errors.push(ValidationError::target(
                    "empty-conditional",
                    name,
                    format!(
                        "Target '{}' conditional '{}' has no values and no default",
                        name, var
                    ),
                ));
            }
        }

        errors.extend(validate_recipes(config, name, target));
    }

    errors
}

fn validate_version(name: &str, target: &TargetConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let Some(version) = &target.version else {
        return errors;
    };

    for (field, value) in [("minimum", &version.minimum), ("exactly", &version.exactly)] {
        if let Some(raw) = value {
            if Version::parse(raw).is_err() {
                errors.push(ValidationError::target(
                    "invalid-version",
                    name,
                    format!(
                        "Target '{}' version.{} '{}' is not a version",
                        name, field, raw
                    ),
                ));
            }
        }
    }

    if let Some(cmd) = &version.version_cmd {
        let usable = shell_words::split(cmd)
            .map(|args| !args.is_empty())
            .unwrap_or(false);
        if !usable {
            errors.push(ValidationError::target(
                "empty-version-cmd",
                name,
                format!("Target '{}' version_cmd '{}' is not usable", name, cmd),
            ));
        }
    }

    errors
}

fn validate_recipes(
    config: &CatalogueConfig,
    name: &str,
    target: &TargetConfig,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let target_vars = target.declared_variables();

    for (index, recipe) in target.recipes.iter().enumerate() {
        let Some(template) = config.templates.get(&recipe.template) else {
            errors.push(ValidationError::target(
                "unknown-template",
                name,
                format!(
                    "Target '{}' recipe #{} uses template '{}' which does not exist",
                    name,
                    index + 1,
                    recipe.template
                ),
            ));
            continue;
        };

        // Recipe values only see the target's own namespace.
        for (var, value) in &recipe.vars {
            match extract_variables(value) {
                Ok(used) => {
                    for missing in used.difference(&target_vars) {
                        errors.push(ValidationError::target(
                            "undefined-variable",
                            name,
                            format!(
                                "Target '{}' recipe variable '{}' references undefined '{}'",
                                name, var, missing
                            ),
                        ));
                    }
                }
                Err(e) => errors.push(ValidationError::target(
                    "invalid-placeholder",
                    name,
                    format!("Target '{}': {}", name, e),
                )),
            }
        }

        let mut available: BTreeSet<String> = target_vars.clone();
        available.extend(recipe.vars.keys().cloned());
        available.extend(template.vars.keys().cloned());

        let mut reported = BTreeSet::new();
        for token in template.cmd_list.iter().flatten() {
            let Ok(used) = extract_variables(token) else {
                // Already reported against the template.
                continue;
            };
            for missing in used.difference(&available) {
                if reported.insert(missing.clone()) {
                    errors.push(ValidationError::target(
                        "undefined-variable",
                        name,
                        format!(
                            "Target '{}' recipe #{} ({}) does not define '{}'",
                            name,
                            index + 1,
                            recipe.template,
                            missing
                        ),
                    ));
                }
            }
        }
    }

    errors
}

/// Validate and return Result.
///
/// # Errors
///
/// Returns `ConfigValidationError` if any validation rules fail.
pub fn validate(config: &CatalogueConfig) -> Result<()> {
    let errors = validate_config(config);

    if errors.is_empty() {
        Ok(())
    } else {
        let messages: Vec<_> = errors.iter().map(|e| e.message.clone()).collect();
        Err(IrequireError::ConfigValidationError {
            message: messages.join("; "),
        })
    }
}
