//! The set of templates usable on this host for one run.

use crate::catalogue::Template;
use crate::engine::observer::{EngineEvent, EngineObserver};
use crate::engine::Host;

/// Templates that passed [`Template::availability`], in catalogue order.
///
/// Computed once at the start of a run; binaries installed later in the
/// run do not activate more templates.
#[derive(Debug, Clone, Default)]
pub struct ActiveTemplates<'c> {
    templates: Vec<&'c Template>,
}

impl<'c> ActiveTemplates<'c> {
    /// Evaluate every template against the host, reporting each verdict.
    pub fn evaluate(
        templates: &'c [Template],
        host: &Host<'_>,
        observer: &mut dyn EngineObserver,
    ) -> Self {
        let mut active = Vec::new();
        for template in templates {
            let availability = template.availability(host.platform, host.lookup);
            observer.on_event(&EngineEvent::TemplateEvaluated {
                template: template.name.clone(),
                availability: availability.clone(),
            });
            if availability.is_active() {
                active.push(template);
            }
        }
        Self { templates: active }
    }

    pub fn get(&self, name: &str) -> Option<&'c Template> {
        self.templates.iter().copied().find(|t| t.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> Vec<&'c str> {
        self.templates.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::Availability;
    use crate::config::Variables;
    use crate::engine::RecordingObserver;
    use crate::error::Result;
    use crate::platform::Platform;
    use crate::shell::{CommandResult, CommandSpec};
    use std::path::PathBuf;

    fn template(name: &str, platforms: &[Platform], requires: &[&str]) -> Template {
        Template {
            name: name.to_string(),
            platforms: platforms.to_vec(),
            requires: requires.iter().map(|s| s.to_string()).collect(),
            cmd_list: vec![vec!["true".to_string()]],
            vars: Variables::new(),
            timeout: None,
        }
    }

    fn no_commands(_: &CommandSpec) -> Result<CommandResult> {
        panic!("evaluation must not run commands")
    }

    #[test]
    fn only_platform_and_binary_matches_are_active() {
        let templates = vec![
            template("apt-get", &[Platform::Linux], &["apt-get"]),
            template("brew", &[Platform::Darwin], &["brew"]),
            template("gem", &[Platform::Linux, Platform::Darwin], &["gem"]),
        ];
        let lookup = |name: &str| (name != "gem").then(|| PathBuf::from("/usr/bin").join(name));
        let host = Host::new(Platform::Linux, &lookup, &no_commands);
        let mut observer = RecordingObserver::default();

        let active = ActiveTemplates::evaluate(&templates, &host, &mut observer);

        assert_eq!(active.names(), vec!["apt-get"]);
        assert!(!active.contains("brew"));
        assert_eq!(active.len(), 1);
        assert_eq!(observer.events.len(), 3);
        assert!(observer.events.contains(&EngineEvent::TemplateEvaluated {
            template: "gem".to_string(),
            availability: Availability::MissingBinary("gem".to_string()),
        }));
    }

    #[test]
    fn platform_exclusion_ignores_binaries() {
        let templates = vec![template("port", &[Platform::Darwin], &[])];
        let everything = |name: &str| Some(PathBuf::from("/opt/local/bin").join(name));
        let host = Host::new(Platform::Linux, &everything, &no_commands);

        let active =
            ActiveTemplates::evaluate(&templates, &host, &mut RecordingObserver::default());
        assert!(active.is_empty());
    }
}
