//! Progress reporting out of the engine.
//!
//! The engine never prints. It emits [`EngineEvent`]s to an
//! [`EngineObserver`] the caller hands in; the terminal UI, the log and
//! tests each bring their own.

use crate::catalogue::Availability;
use crate::engine::resolver::TargetState;
use std::time::Duration;

/// Something that happened during a run.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// A template's availability was decided.
    TemplateEvaluated {
        template: String,
        availability: Availability,
    },
    /// A target moved to a new state.
    TargetStateChanged { target: String, state: TargetState },
    /// A recipe was passed over because its template is not active.
    RecipeSkipped { target: String, template: String },
    /// A recipe is about to run. `attempt` counts from 1.
    RecipeStarted {
        target: String,
        template: String,
        attempt: usize,
    },
    CommandStarted { template: String, command: String },
    CommandFinished {
        template: String,
        command: String,
        exit_code: Option<i32>,
        success: bool,
        duration: Duration,
        stdout: String,
        stderr: String,
    },
    /// A recipe errored; the target moves on to its next recipe.
    RecipeFailed {
        target: String,
        template: String,
        error: String,
    },
    /// A recipe ran cleanly but the target is still not satisfied.
    RecipeUnsatisfied { target: String, template: String },
    TargetInstalled {
        target: String,
        template: String,
        attempts: usize,
    },
    /// Every recipe was tried without success.
    TargetFailed { target: String, platform: String },
}

/// Receives engine events.
pub trait EngineObserver {
    fn on_event(&mut self, event: &EngineEvent);
}

/// Logs every event through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl EngineObserver for TracingObserver {
    fn on_event(&mut self, event: &EngineEvent) {
        match event {
            EngineEvent::TemplateEvaluated {
                template,
                availability,
            } => tracing::debug!("template {}: {}", template, availability),
            EngineEvent::TargetStateChanged { target, state } => {
                tracing::info!("{}: {}", target, state)
            }
            EngineEvent::RecipeSkipped { target, template } => {
                tracing::debug!("{}: skipping inactive template {}", target, template)
            }
            EngineEvent::RecipeStarted {
                target,
                template,
                attempt,
            } => tracing::info!("{} - try: {} (attempt {})", target, template, attempt),
            EngineEvent::CommandStarted { template, command } => {
                tracing::debug!("[{}] {}", template, command)
            }
            EngineEvent::CommandFinished {
                template,
                command,
                exit_code,
                duration,
                ..
            } => tracing::debug!(
                "[{}] {} exited with {:?} after {:?}",
                template,
                command,
                exit_code,
                duration
            ),
            EngineEvent::RecipeFailed {
                target,
                template,
                error,
            } => tracing::warn!("{}: template {} failed with: {}", target, template, error),
            EngineEvent::RecipeUnsatisfied { target, template } => tracing::warn!(
                "{}: template {} ran but the target is still unsatisfied",
                target,
                template
            ),
            EngineEvent::TargetInstalled {
                target,
                template,
                attempts,
            } => tracing::info!(
                "{}: installed by {} after {} attempt(s)",
                target,
                template,
                attempts
            ),
            EngineEvent::TargetFailed { target, platform } => {
                tracing::error!("failed to install {} for {}", target, platform)
            }
        }
    }
}

/// Keeps every event, for inspection in tests and reports.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    pub events: Vec<EngineEvent>,
}

impl RecordingObserver {
    /// Number of recorded events matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&EngineEvent) -> bool) -> usize {
        self.events.iter().filter(|e| predicate(e)).count()
    }
}

impl EngineObserver for RecordingObserver {
    fn on_event(&mut self, event: &EngineEvent) {
        self.events.push(event.clone());
    }
}

/// Sends each event to two observers in turn.
pub struct Tee<'a> {
    first: &'a mut dyn EngineObserver,
    second: &'a mut dyn EngineObserver,
}

impl<'a> Tee<'a> {
    pub fn new(first: &'a mut dyn EngineObserver, second: &'a mut dyn EngineObserver) -> Self {
        Self { first, second }
    }
}

impl EngineObserver for Tee<'_> {
    fn on_event(&mut self, event: &EngineEvent) {
        self.first.on_event(event);
        self.second.on_event(event);
    }
}
