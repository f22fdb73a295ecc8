//! Required tools and their recipes.

use crate::catalogue::template::RecipeOptions;
use crate::config::interpolation::{resolve_string, InterpolationContext, Variables};
use crate::config::schema::{Settings, TargetConfig, VersionConfig};
use crate::engine::observer::{EngineEvent, EngineObserver};
use crate::engine::{ActiveTemplates, Host};
use crate::error::{IrequireError, Result};
use crate::platform::HostFacts;
use crate::shell::CommandSpec;
use crate::version::Version;

/// Version requirement for a target's binary.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionConstraint {
    pub minimum: Option<Version>,
    pub exactly: Option<Version>,
    /// Arguments passed to the binary to make it print its version.
    pub version_args: Vec<String>,
}

impl VersionConstraint {
    /// Build from config, using `default_cmd` when the target sets none.
    pub fn from_config(config: &VersionConfig, default_cmd: &str) -> Result<Self> {
        let cmd = config.version_cmd.as_deref().unwrap_or(default_cmd);
        let version_args =
            shell_words::split(cmd).map_err(|e| IrequireError::ConfigValidationError {
                message: format!("version_cmd '{}': {}", cmd, e),
            })?;

        Ok(Self {
            minimum: config.minimum.as_deref().map(Version::parse).transpose()?,
            exactly: config.exactly.as_deref().map(Version::parse).transpose()?,
            version_args,
        })
    }

    /// Both bounds must hold when both are set.
    pub fn is_satisfied_by(&self, installed: &Version) -> bool {
        let above_minimum = self.minimum.as_ref().is_none_or(|min| installed >= min);
        let exact_match = self.exactly.as_ref().is_none_or(|want| installed == want);
        above_minimum && exact_match
    }
}

/// One installation attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    pub template: String,
    /// Recipe-local variables, still holding placeholders.
    pub vars: Variables,
    pub options: RecipeOptions,
}

/// How a successful install went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOutcome {
    /// Template of the recipe that satisfied the target.
    pub template: String,
    /// Recipes actually executed, the successful one included.
    pub attempts: usize,
}

/// A required tool.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub name: String,
    pub version: Option<VersionConstraint>,
    /// Variables every recipe can reference: `name`, `version.*`, free-form
    /// `vars` and resolved conditionals.
    pub namespace: Variables,
    pub recipes: Vec<Recipe>,
}

impl Target {
    /// Build from config, resolving conditional variables against `facts`.
    pub fn from_config(
        name: &str,
        config: &TargetConfig,
        settings: &Settings,
        facts: &HostFacts,
    ) -> Result<Self> {
        let mut namespace = config.vars.clone();
        namespace.insert("name".to_string(), name.to_string());

        let version = match &config.version {
            Some(version_config) => {
                let constraint =
                    VersionConstraint::from_config(version_config, &settings.version_cmd)?;
                if let Some(min) = &version_config.minimum {
                    namespace.insert("version.minimum".to_string(), min.clone());
                }
                if let Some(exactly) = &version_config.exactly {
                    namespace.insert("version.exactly".to_string(), exactly.clone());
                }
                namespace.insert(
                    "version.version_cmd".to_string(),
                    version_config
                        .version_cmd
                        .clone()
                        .unwrap_or_else(|| settings.version_cmd.clone()),
                );
                Some(constraint)
            }
            None => None,
        };

        for (var, conditional) in &config.conditionals {
            let fact = facts.resolve(conditional.fact);
            match conditional.values.get(&fact).or(conditional.default.as_ref()) {
                Some(value) => {
                    namespace.insert(var.clone(), value.clone());
                }
                None => tracing::debug!(
                    "{}: conditional '{}' has no value for {}",
                    name,
                    var,
                    fact
                ),
            }
        }

        let recipes = config
            .recipes
            .iter()
            .map(|recipe| Recipe {
                template: recipe.template.clone(),
                vars: recipe.vars.clone(),
                options: RecipeOptions {
                    cwd: recipe.cwd.clone(),
                    shell: recipe.shell,
                    env: recipe.env.clone(),
                },
            })
            .collect();

        Ok(Self {
            name: name.to_string(),
            version,
            namespace,
            recipes,
        })
    }

    /// Whether the target is installed and meets its version constraint.
    ///
    /// # Errors
    ///
    /// `VersionQueryFailed` when the binary exists but its version query
    /// cannot be run or exits unsuccessfully; `InvalidVersion` when the
    /// output holds no version.
    pub fn ok(&self, host: &Host<'_>) -> Result<bool> {
        let Some(path) = host.lookup.find(&self.name) else {
            tracing::debug!("{}: not found on PATH", self.name);
            return Ok(false);
        };

        let Some(constraint) = &self.version else {
            return Ok(true);
        };

        let mut argv = vec![path.to_string_lossy().into_owned()];
        argv.extend(constraint.version_args.iter().cloned());
        let spec = CommandSpec::new(argv).with_timeout(host.version_timeout);
        let command = spec.display();

        let query_failed = |message: String| IrequireError::VersionQueryFailed {
            target: self.name.clone(),
            command: command.clone(),
            message,
        };

        let result = host
            .runner
            .run(&spec)
            .map_err(|e| query_failed(e.to_string()))?;

        if !result.success {
            let message = match result.exit_code {
                Some(code) => format!("exit code {}", code),
                None => "killed by signal".to_string(),
            };
            return Err(query_failed(message));
        }

        let installed = Version::extract(&result.stdout, &result.stderr)?;
        let satisfied = constraint.is_satisfied_by(&installed);
        tracing::debug!(
            "{}: found {} at {} (satisfied: {})",
            self.name,
            installed,
            path.display(),
            satisfied
        );
        Ok(satisfied)
    }

    /// The variables a recipe's commands see.
    ///
    /// Recipe values are expanded against the target namespace, then laid
    /// over it.
    pub fn recipe_variables(&self, recipe: &Recipe) -> Result<Variables> {
        let context = InterpolationContext::new().with_layer(&self.namespace);
        let mut merged = self.namespace.clone();
        for (key, value) in &recipe.vars {
            merged.insert(key.clone(), resolve_string(value, &context)?);
        }
        Ok(merged)
    }

    /// Try recipes in order until one leaves the target satisfied.
    ///
    /// Recipes whose template is not active are skipped. A recipe that
    /// fails, or runs cleanly but leaves the target unsatisfied, hands over
    /// to the next one.
    ///
    /// # Errors
    ///
    /// `InstallFailed` once every recipe has been tried.
    pub fn install(
        &self,
        templates: &ActiveTemplates<'_>,
        host: &Host<'_>,
        observer: &mut dyn EngineObserver,
    ) -> Result<InstallOutcome> {
        let mut attempts = 0;

        for recipe in &self.recipes {
            let Some(template) = templates.get(&recipe.template) else {
                observer.on_event(&EngineEvent::RecipeSkipped {
                    target: self.name.clone(),
                    template: recipe.template.clone(),
                });
                continue;
            };

            attempts += 1;
            observer.on_event(&EngineEvent::RecipeStarted {
                target: self.name.clone(),
                template: template.name.clone(),
                attempt: attempts,
            });

            let executed = self.recipe_variables(recipe).and_then(|variables| {
                template.execute(&variables, &recipe.options, host.runner, &mut *observer)
            });

            if let Err(e) = executed {
                observer.on_event(&EngineEvent::RecipeFailed {
                    target: self.name.clone(),
                    template: template.name.clone(),
                    error: e.to_string(),
                });
                continue;
            }

            match self.ok(host) {
                Ok(true) => {
                    observer.on_event(&EngineEvent::TargetInstalled {
                        target: self.name.clone(),
                        template: template.name.clone(),
                        attempts,
                    });
                    return Ok(InstallOutcome {
                        template: template.name.clone(),
                        attempts,
                    });
                }
                Ok(false) => observer.on_event(&EngineEvent::RecipeUnsatisfied {
                    target: self.name.clone(),
                    template: template.name.clone(),
                }),
                Err(e) => observer.on_event(&EngineEvent::RecipeFailed {
                    target: self.name.clone(),
                    template: template.name.clone(),
                    error: e.to_string(),
                }),
            }
        }

        let platform = host.platform.to_string();
        observer.on_event(&EngineEvent::TargetFailed {
            target: self.name.clone(),
            platform: platform.clone(),
        });
        Err(IrequireError::InstallFailed {
            target: self.name.clone(),
            platform,
        })
    }
}
