//! Resolution engine.
//!
//! The engine walks a [`Catalogue`](crate::catalogue::Catalogue) in order
//! and makes every target satisfied, failing fast on the first target that
//! cannot be installed. All host access goes through the collaborators
//! bundled in [`Host`]; progress is reported to an [`EngineObserver`].

pub mod active;
pub mod observer;
pub mod resolver;

pub use active::ActiveTemplates;
pub use observer::{EngineEvent, EngineObserver, RecordingObserver, Tee, TracingObserver};
pub use resolver::{CheckStatus, ResolveReport, Resolver, TargetCheck, TargetOutcome, TargetState};

use crate::platform::Platform;
use crate::shell::{BinaryLookup, ProcessRunner};
use std::time::Duration;

/// The host as the engine sees it.
#[derive(Clone, Copy)]
pub struct Host<'a> {
    pub platform: Platform,
    pub lookup: &'a dyn BinaryLookup,
    pub runner: &'a dyn ProcessRunner,
    /// Time limit for version queries.
    pub version_timeout: Option<Duration>,
}

impl<'a> Host<'a> {
    pub fn new(
        platform: Platform,
        lookup: &'a dyn BinaryLookup,
        runner: &'a dyn ProcessRunner,
    ) -> Self {
        Self {
            platform,
            lookup,
            runner,
            version_timeout: None,
        }
    }

    pub fn with_version_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.version_timeout = timeout;
        self
    }
}

impl std::fmt::Debug for Host<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host")
            .field("platform", &self.platform)
            .field("version_timeout", &self.version_timeout)
            .finish_non_exhaustive()
    }
}
