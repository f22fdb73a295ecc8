//! Integration tests for config module public API.

use irequire::catalogue::Catalogue;
use irequire::config::{
    find_config, load_builtin_templates, load_catalogue_config, validate_config, CatalogueConfig,
};
use irequire::platform::{HostFacts, Platform};
use irequire::IrequireError;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn project(file: &str, content: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join(file);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
    temp
}

#[test]
fn public_api_is_accessible() {
    let config = CatalogueConfig::default();
    assert!(config.settings.builtin_templates);
    assert!(validate_config(&config).is_empty());
}

#[test]
fn full_config_workflow() {
    let temp = project(
        "irequire.yml",
        r#"
targets:
  meson:
    version: { minimum: "0.41.2" }
    recipes:
      - template: pip3
        vars: { pkg_name: meson }
  md2man-roff:
    recipes:
      - template: gem
        vars: { pkg_name: md2man }
"#,
    );

    let config = load_catalogue_config(temp.path(), None).unwrap();
    let catalogue = Catalogue::from_config(&config, &HostFacts::for_platform(Platform::Linux))
        .unwrap();

    let names: Vec<&str> = catalogue.targets.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["meson", "md2man-roff"]);
    assert!(catalogue.template("apt-get").is_some());
    assert_eq!(
        catalogue.target("meson").unwrap().recipes[0].template,
        "pip3"
    );
}

#[test]
fn discovers_dot_directory_config() {
    let temp = project(".irequire/config.yml", "targets: {}\n");
    assert_eq!(
        find_config(temp.path()),
        Some(temp.path().join(".irequire/config.yml"))
    );
}

#[test]
fn json_configs_are_accepted() {
    let temp = project(
        "irequire.json",
        r#"{"targets": {"pip3": {"recipes": [{"template": "apt-get", "vars": {"pkg_name": "python3-pip"}}]}}}"#,
    );
    let config = load_catalogue_config(temp.path(), None).unwrap();
    assert!(config.targets.contains_key("pip3"));
}

#[test]
fn missing_config_is_a_config_error() {
    let temp = TempDir::new().unwrap();
    let err = load_catalogue_config(temp.path(), None).unwrap_err();
    assert!(matches!(err, IrequireError::ConfigNotFound { .. }));
    assert!(err.is_config_error());
}

#[test]
fn explicit_path_wins_over_discovery() {
    let temp = project("irequire.yml", "targets: {}\n");
    let other = temp.path().join("other.yml");
    fs::write(
        &other,
        "targets:\n  ninja:\n    recipes: [{ template: brew, vars: { pkg_name: ninja } }]\n",
    )
    .unwrap();

    let config = load_catalogue_config(temp.path(), Some(&other)).unwrap();
    assert!(config.targets.contains_key("ninja"));
}

#[test]
fn project_templates_override_builtins() {
    let temp = project(
        "irequire.yml",
        r#"
templates:
  brew:
    platforms: [darwin, linux]
    requires: [brew]
    cmd_list: [[brew, install, --quiet, "{pkg_name}"]]
  custom:
    platforms: [linux]
    cmd_list: [[make, install]]
"#,
    );

    let config = load_catalogue_config(temp.path(), None).unwrap();
    let names: Vec<&str> = config.templates.keys().collect();
    let builtins = load_builtin_templates().unwrap();
    let builtin_names: Vec<&str> = builtins.keys().collect();

    // Builtins keep their position; new templates come after them.
    assert_eq!(&names[..builtin_names.len()], builtin_names.as_slice());
    assert_eq!(names.last(), Some(&"custom"));
    assert_eq!(
        config.templates.get("brew").unwrap().platforms,
        vec![Platform::Darwin, Platform::Linux]
    );
}

#[test]
fn builtins_can_be_disabled() {
    let temp = project(
        "irequire.yml",
        "settings: { builtin_templates: false }\ntemplates:\n  local: { platforms: [linux], cmd_list: [[\"true\"]] }\n",
    );
    let config = load_catalogue_config(temp.path(), None).unwrap();
    let names: Vec<&str> = config.templates.keys().collect();
    assert_eq!(names, vec!["local"]);
}

#[test]
fn validation_reports_every_problem() {
    let temp = project(
        "irequire.yml",
        r#"
targets:
  ninja:
    version: { minimum: "one point seven" }
    recipes:
      - template: apt-get
      - template: no-such-template
  empty:
    recipes: []
"#,
    );

    let config = load_catalogue_config(temp.path(), None).unwrap();
    let rules: Vec<String> = validate_config(&config)
        .into_iter()
        .map(|e| e.rule)
        .collect();
    assert!(rules.contains(&"invalid-version".to_string()));
    assert!(rules.contains(&"undefined-variable".to_string()));
    assert!(rules.contains(&"unknown-template".to_string()));
    assert!(rules.contains(&"empty-recipes".to_string()));

    let err = Catalogue::from_config(&config, &HostFacts::for_platform(Platform::Linux))
        .unwrap_err();
    assert!(matches!(err, IrequireError::ConfigValidationError { .. }));
    assert!(err.to_string().contains("no-such-template"));
}

#[test]
fn legacy_key_aliases_are_accepted() {
    let temp = project(
        "irequire.yml",
        r#"
templates:
  fetch:
    platform: [linux]
    cmd_list: [[curl, -o, "{bin_name}", "{url}"]]
targets:
  ninja:
    cond:
      bin-type:
        eval: sys.platform
        ret: { linux: linux }
    recipes:
      - template: fetch
        recipe: { bin_name: ninja, url: "https://example.invalid/ninja-{bin-type}.zip" }
"#,
    );

    let config = load_catalogue_config(temp.path(), None).unwrap();
    assert!(validate_config(&config).is_empty());

    let catalogue = Catalogue::from_config(&config, &HostFacts::for_platform(Platform::Linux))
        .unwrap();
    let ninja = catalogue.target("ninja").unwrap();
    let vars = ninja.recipe_variables(&ninja.recipes[0]).unwrap();
    assert_eq!(vars["url"], "https://example.invalid/ninja-linux.zip");
}

#[test]
fn malformed_yaml_is_a_parse_error() {
    let temp = project("irequire.yml", "targets: [unclosed\n");
    let err = load_catalogue_config(temp.path(), None).unwrap_err();
    assert!(matches!(err, IrequireError::ConfigParseError { .. }));
    assert!(err.to_string().contains(&Path::new("irequire.yml").display().to_string()));
}
