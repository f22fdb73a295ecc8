//! Configuration schema definitions.
//!
//! This module contains the struct definitions that map to the catalogue
//! file format. These are raw, unvalidated records; see
//! [`crate::catalogue`] for the typed records the engine runs on.
//!
//! ```yaml
//! settings:
//!   command_timeout: 600
//! templates:
//!   apt-get:
//!     platforms: [linux]
//!     requires: [apt-get]
//!     cmd_list:
//!       - [sudo, apt-get, update]
//!       - [sudo, apt-get, -y, install, "{pkg_name}"]
//! targets:
//!   ninja:
//!     version: { minimum: "1.7.2" }
//!     recipes:
//!       - template: apt-get
//!         vars: { pkg_name: ninja-build }
//! ```

use crate::config::interpolation::Variables;
use crate::platform::{Platform, PlatformFact};
use schemars::JsonSchema;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::marker::PhantomData;
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogueConfig {
    /// Global settings
    pub settings: Settings,

    /// Installation strategies by name
    #[schemars(with = "BTreeMap<String, TemplateConfig>")]
    pub templates: OrderedMap<TemplateConfig>,

    /// Required tools by name, resolved in the order written
    #[schemars(with = "BTreeMap<String, TargetConfig>")]
    pub targets: OrderedMap<TargetConfig>,
}

/// Global settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Merge the built-in templates into the catalogue
    pub builtin_templates: bool,

    /// Default time limit for every command, in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_timeout: Option<u64>,

    /// Default argument used to query a binary's version
    pub version_cmd: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            builtin_templates: true,
            command_timeout: None,
            version_cmd: default_version_cmd(),
        }
    }
}

fn default_version_cmd() -> String {
    "--version".to_string()
}

/// A named installation strategy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct TemplateConfig {
    /// Platforms on which this strategy applies
    #[serde(alias = "platform")]
    pub platforms: Vec<Platform>,

    /// Binaries that must be on PATH for the template to be usable
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,

    /// Command lines run in order; tokens may contain `{placeholders}`
    pub cmd_list: Vec<Vec<String>>,

    /// Template-supplied defaults for placeholders
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub vars: Variables,

    /// Time limit for each command, in seconds (overrides settings)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

/// A required tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    /// Version constraint checked against `<name> --version`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<VersionConfig>,

    /// Variables computed from host facts
    #[serde(default, alias = "cond", skip_serializing_if = "BTreeMap::is_empty")]
    pub conditionals: BTreeMap<String, ConditionalConfig>,

    /// Free-form attributes available to every recipe
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub vars: Variables,

    /// Installation attempts, in priority order
    pub recipes: Vec<RecipeConfig>,
}

impl TargetConfig {
    /// Names this target defines for its recipes, given the target name.
    ///
    /// Conditional variables are included even when the current host
    /// leaves them unresolved.
    pub fn declared_variables(&self) -> BTreeSet<String> {
        let mut names: BTreeSet<String> = ["name".to_string()].into_iter().collect();

        if let Some(version) = &self.version {
            names.insert("version.version_cmd".to_string());
            if version.minimum.is_some() {
                names.insert("version.minimum".to_string());
            }
            if version.exactly.is_some() {
                names.insert("version.exactly".to_string());
            }
        }

        names.extend(self.vars.keys().cloned());
        names.extend(self.conditionals.keys().cloned());
        names
    }
}

/// Version requirement for a target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct VersionConfig {
    /// Installed version must be at least this
    #[serde(
        default,
        deserialize_with = "version_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub minimum: Option<String>,

    /// Installed version must equal this
    #[serde(
        default,
        deserialize_with = "version_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub exactly: Option<String>,

    /// Argument(s) that make the binary print its version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_cmd: Option<String>,
}

/// A variable whose value depends on a host fact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ConditionalConfig {
    /// Fact to query
    #[serde(alias = "eval")]
    pub fact: PlatformFact,

    /// Fact value -> variable value
    #[serde(default, alias = "ret")]
    pub values: Variables,

    /// Value used when the fact's value is not in `values`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

/// One installation attempt: a template plus recipe-local variables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RecipeConfig {
    /// Template name
    pub template: String,

    /// Recipe-local variables; values may reference target variables
    #[serde(default, alias = "recipe", skip_serializing_if = "BTreeMap::is_empty")]
    pub vars: Variables,

    /// Working directory for every command
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,

    /// Run commands through the platform shell
    #[serde(default, skip_serializing_if = "is_false")]
    pub shell: bool,

    /// Extra environment variables for every command
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: Variables,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Accept quoted versions and bare integers; reject YAML floats, which
/// would silently turn `1.10` into `1.1`.
fn version_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Integer(u64),
        Float(f64),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Text(text)) => Ok(Some(text)),
        Some(Raw::Integer(n)) => Ok(Some(n.to_string())),
        Some(Raw::Float(f)) => Err(de::Error::custom(format!(
            "unquoted version reads as the number {:?}; versions must be quoted, e.g. \"1.10\"",
            f
        ))),
    }
}

/// A string-keyed map that keeps document order and rejects duplicates.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V> {
    entries: Vec<(String, V)>,
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V> OrderedMap<V> {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry. Replacing keeps the original position.
    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Look an entry up by key.
    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct OrderedMapVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<V> {
            type Value = OrderedMap<V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping from names to entries")
            }

            fn visit_unit<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
                Ok(OrderedMap::new())
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut map = OrderedMap::new();
                while let Some((key, value)) = access.next_entry::<String, V>()? {
                    if map.contains_key(&key) {
                        return Err(de::Error::custom(format!("duplicate entry '{}'", key)));
                    }
                    map.entries.push((key, value));
                }
                Ok(map)
            }
        }

        deserializer.deserialize_any(OrderedMapVisitor(PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let config: CatalogueConfig = serde_yaml::from_str("targets: {}").unwrap();
        assert!(config.targets.is_empty());
        assert!(config.settings.builtin_templates);
        assert_eq!(config.settings.version_cmd, "--version");
    }

    #[test]
    fn targets_keep_document_order() {
        let yaml = r#"
targets:
  zeta:
    recipes: [{ template: brew }]
  alpha:
    recipes: [{ template: brew }]
  mid:
    recipes: [{ template: brew }]
"#;
        let config: CatalogueConfig = serde_yaml::from_str(yaml).unwrap();
        let names: Vec<&str> = config.targets.keys().collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn duplicate_target_is_rejected() {
        let yaml = r#"
targets:
  ninja:
    recipes: [{ template: brew }]
  ninja:
    recipes: [{ template: port }]
"#;
        assert!(serde_yaml::from_str::<CatalogueConfig>(yaml).is_err());
    }

    #[test]
    fn null_sections_are_empty() {
        let config: CatalogueConfig = serde_yaml::from_str("templates:\ntargets:\n").unwrap();
        assert!(config.templates.is_empty());
        assert!(config.targets.is_empty());
    }

    #[test]
    fn unknown_top_level_key_is_rejected() {
        assert!(serde_yaml::from_str::<CatalogueConfig>("steps: {}").is_err());
    }

    #[test]
    fn parse_template_with_legacy_platform_key() {
        let yaml = r#"
platform: [linux, darwin]
requires: [mkdir, wget, unzip]
vars:
  install_d: /usr/local/bin
cmd_list:
  - [mkdir, -p, "{temp_dir}"]
"#;
        let template: TemplateConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(template.platforms, vec![Platform::Linux, Platform::Darwin]);
        assert_eq!(template.requires.len(), 3);
        assert_eq!(template.vars["install_d"], "/usr/local/bin");
    }

    #[test]
    fn template_requires_defaults_to_empty() {
        let template: TemplateConfig =
            serde_yaml::from_str("platforms: [linux]\ncmd_list: [[\"true\"]]").unwrap();
        assert!(template.requires.is_empty());
        assert!(template.timeout.is_none());
    }

    #[test]
    fn parse_target_with_legacy_keys() {
        let yaml = r#"
version: { minimum: "1.7.2" }
cond:
  bin-type:
    eval: sys.platform
    ret: { darwin: mac, linux: linux }
recipes:
  - template: apt-get
    recipe: { pkg_name: ninja-build }
"#;
        let target: TargetConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            target.version.as_ref().unwrap().minimum.as_deref(),
            Some("1.7.2")
        );
        let cond = &target.conditionals["bin-type"];
        assert_eq!(cond.fact, PlatformFact::CurrentPlatform);
        assert_eq!(cond.values["darwin"], "mac");
        assert_eq!(target.recipes[0].vars["pkg_name"], "ninja-build");
    }

    #[test]
    fn integer_versions_are_accepted() {
        let version: VersionConfig = serde_yaml::from_str("minimum: 3").unwrap();
        assert_eq!(version.minimum.as_deref(), Some("3"));
    }

    #[test]
    fn float_versions_must_be_quoted() {
        assert!(serde_yaml::from_str::<VersionConfig>("minimum: 1.10").is_err());

        let err = serde_yaml::from_str::<VersionConfig>("minimum: 2.0").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("must be quoted"));
        assert!(msg.contains("2.0"));
        assert!(!msg.contains("\"2\""));
    }

    #[test]
    fn recipe_options_parse() {
        let yaml = r#"
template: zip-install
cwd: /tmp
shell: true
env: { LANG: C }
"#;
        let recipe: RecipeConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(recipe.cwd, Some(PathBuf::from("/tmp")));
        assert!(recipe.shell);
        assert_eq!(recipe.env["LANG"], "C");
    }

    #[test]
    fn declared_variables_cover_namespace() {
        let yaml = r#"
version: { minimum: "1.7.2" }
vars: { homepage: "https://ninja-build.org" }
conditionals:
  bin-type: { fact: current_platform, values: { linux: linux } }
recipes: []
"#;
        let target: TargetConfig = serde_yaml::from_str(yaml).unwrap();
        let names = target.declared_variables();
        for expected in [
            "name",
            "version.minimum",
            "version.version_cmd",
            "homepage",
            "bin-type",
        ] {
            assert!(names.contains(expected), "missing {}", expected);
        }
        assert!(!names.contains("version.exactly"));
    }

    #[test]
    fn ordered_map_insert_replaces_in_place() {
        let mut map: OrderedMap<i32> = [("a", 1), ("b", 2)].into_iter().collect();
        map.insert("a", 10);
        map.insert("c", 3);
        let entries: Vec<(&str, &i32)> = map.iter().collect();
        assert_eq!(entries, vec![("a", &10), ("b", &2), ("c", &3)]);
    }

    #[test]
    fn ordered_map_serializes_in_order() {
        let map: OrderedMap<i32> = [("z", 1), ("a", 2)].into_iter().collect();
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"z":1,"a":2}"#);
    }
}
