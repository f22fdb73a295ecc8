//! Drives every target of a catalogue to satisfaction.

use crate::catalogue::Catalogue;
use crate::engine::active::ActiveTemplates;
use crate::engine::observer::{EngineEvent, EngineObserver};
use crate::engine::Host;
use crate::error::Result;
use serde::Serialize;
use std::fmt;

/// Where a target is in its lifecycle for the current run.
///
/// `Unchecked -> Satisfied` when already installed, otherwise
/// `Unchecked -> Installing -> Satisfied | Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetState {
    Unchecked,
    Satisfied,
    Installing,
    Failed,
}

impl fmt::Display for TargetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TargetState::Unchecked => "unchecked",
            TargetState::Satisfied => "satisfied",
            TargetState::Installing => "installing",
            TargetState::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Final state of one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetOutcome {
    pub target: String,
    pub state: TargetState,
    /// Template whose recipe installed the target, when one did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installed_by: Option<String>,
    /// Recipes executed for this target.
    pub attempts: usize,
}

/// Result of a successful run; every target ended satisfied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolveReport {
    pub outcomes: Vec<TargetOutcome>,
}

impl ResolveReport {
    /// Targets that had to be installed.
    pub fn installed(&self) -> impl Iterator<Item = &TargetOutcome> {
        self.outcomes.iter().filter(|o| o.installed_by.is_some())
    }

    /// Targets that were already satisfied.
    pub fn already_satisfied(&self) -> impl Iterator<Item = &TargetOutcome> {
        self.outcomes.iter().filter(|o| o.installed_by.is_none())
    }
}

/// Status reported by [`Resolver::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Satisfied,
    Unsatisfied,
    /// The binary exists but its version could not be determined.
    Unusable,
}

/// One target's status, without installing anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetCheck {
    pub target: String,
    pub status: CheckStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TargetCheck {
    pub fn is_satisfied(&self) -> bool {
        self.status == CheckStatus::Satisfied
    }
}

/// Resolves a catalogue against a host.
pub struct Resolver<'a> {
    host: Host<'a>,
    observer: &'a mut dyn EngineObserver,
}

impl<'a> Resolver<'a> {
    pub fn new(host: Host<'a>, observer: &'a mut dyn EngineObserver) -> Self {
        Self { host, observer }
    }

    /// Evaluate template availability for this run.
    pub fn active_templates<'c>(&mut self, catalogue: &'c Catalogue) -> ActiveTemplates<'c> {
        ActiveTemplates::evaluate(&catalogue.templates, &self.host, &mut *self.observer)
    }

    /// Check every target in order and install the unsatisfied ones.
    ///
    /// # Errors
    ///
    /// Stops at the first target that errors: `InstallFailed` when its
    /// recipes are exhausted, or the version-check error when its binary
    /// is present but unusable. Later targets are not looked at.
    pub fn resolve(&mut self, catalogue: &Catalogue) -> Result<ResolveReport> {
        let active = self.active_templates(catalogue);
        tracing::debug!("active templates: {:?}", active.names());

        let mut report = ResolveReport::default();

        for target in &catalogue.targets {
            self.transition(&target.name, TargetState::Unchecked);

            let satisfied = match target.ok(&self.host) {
                Ok(satisfied) => satisfied,
                Err(e) => {
                    self.transition(&target.name, TargetState::Failed);
                    return Err(e);
                }
            };

            if satisfied {
                self.transition(&target.name, TargetState::Satisfied);
                report.outcomes.push(TargetOutcome {
                    target: target.name.clone(),
                    state: TargetState::Satisfied,
                    installed_by: None,
                    attempts: 0,
                });
                continue;
            }

            self.transition(&target.name, TargetState::Installing);
            match target.install(&active, &self.host, &mut *self.observer) {
                Ok(outcome) => {
                    self.transition(&target.name, TargetState::Satisfied);
                    report.outcomes.push(TargetOutcome {
                        target: target.name.clone(),
                        state: TargetState::Satisfied,
                        installed_by: Some(outcome.template),
                        attempts: outcome.attempts,
                    });
                }
                Err(e) => {
                    self.transition(&target.name, TargetState::Failed);
                    return Err(e);
                }
            }
        }

        Ok(report)
    }

    /// Report each target's status without installing anything.
    pub fn check(&mut self, catalogue: &Catalogue) -> Vec<TargetCheck> {
        catalogue
            .targets
            .iter()
            .map(|target| {
                let (status, error) = match target.ok(&self.host) {
                    Ok(true) => (CheckStatus::Satisfied, None),
                    Ok(false) => (CheckStatus::Unsatisfied, None),
                    Err(e) => (CheckStatus::Unusable, Some(e.to_string())),
                };
                TargetCheck {
                    target: target.name.clone(),
                    status,
                    error,
                }
            })
            .collect()
    }

    fn transition(&mut self, target: &str, state: TargetState) {
        self.observer.on_event(&EngineEvent::TargetStateChanged {
            target: target.to_string(),
            state,
        });
    }
}
