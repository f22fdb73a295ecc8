//! Configuration file discovery and loading.
//!
//! A project keeps its catalogue in one file at the project root. The
//! first existing candidate wins:
//!
//! 1. `irequire.yml`
//! 2. `irequire.yaml`
//! 3. `irequire.json`
//! 4. `.irequire/config.yml`

use crate::config::builtin::with_builtin_templates;
use crate::config::schema::CatalogueConfig;
use crate::error::{IrequireError, Result};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Paths checked by [`find_config`], relative to the project root.
pub const CONFIG_CANDIDATES: &[&str] = &[
    "irequire.yml",
    "irequire.yaml",
    "irequire.json",
    ".irequire/config.yml",
];

/// Path meaning "read the config from stdin".
pub const STDIN_PATH: &str = "-";

/// Find the project's config file.
pub fn find_config(project_root: &Path) -> Option<PathBuf> {
    CONFIG_CANDIDATES
        .iter()
        .map(|candidate| project_root.join(candidate))
        .find(|path| path.is_file())
}

/// Load a single config file and parse it.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the document is invalid.
pub fn load_config_file(path: &Path) -> Result<CatalogueConfig> {
    let content = if path == Path::new(STDIN_PATH) {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                IrequireError::ConfigNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                IrequireError::Io(e)
            }
        })?
    };

    parse_config(&content, path)
}

/// Parse YAML (or JSON) content into a config.
///
/// An empty document is an empty catalogue.
///
/// # Arguments
///
/// * `content` - The document to parse
/// * `source_path` - Path for error reporting
pub fn parse_config(content: &str, source_path: &Path) -> Result<CatalogueConfig> {
    if content.trim().is_empty() {
        return Ok(CatalogueConfig::default());
    }

    serde_yaml::from_str(content).map_err(|e| IrequireError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load the catalogue config for a project, with built-in templates merged.
///
/// `explicit` is the `--config` argument, if any. The result is not yet
/// validated.
///
/// # Errors
///
/// Returns `ConfigNotFound` if no config file exists.
pub fn load_catalogue_config(
    project_root: &Path,
    explicit: Option<&Path>,
) -> Result<CatalogueConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => find_config(project_root).ok_or_else(|| IrequireError::ConfigNotFound {
            path: project_root.join(CONFIG_CANDIDATES[0]),
        })?,
    };

    tracing::debug!("Loading config from {}", path.display());
    let config = load_config_file(&path)?;
    with_builtin_templates(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, content: &str) -> PathBuf {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn find_config_prefers_yml() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "irequire.json", "{}");
        write(temp.path(), "irequire.yml", "targets: {}");

        assert_eq!(
            find_config(temp.path()),
            Some(temp.path().join("irequire.yml"))
        );
    }

    #[test]
    fn find_config_checks_dot_directory() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), ".irequire/config.yml", "targets: {}");

        assert_eq!(
            find_config(temp.path()),
            Some(temp.path().join(".irequire/config.yml"))
        );
    }

    #[test]
    fn find_config_returns_none_for_empty_dir() {
        let temp = TempDir::new().unwrap();
        assert!(find_config(temp.path()).is_none());
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let temp = TempDir::new().unwrap();
        let result = load_config_file(&temp.path().join("nope.yml"));
        assert!(matches!(result, Err(IrequireError::ConfigNotFound { .. })));
    }

    #[test]
    fn parse_error_names_the_file() {
        let err = parse_config("targets: [", Path::new("irequire.yml")).unwrap_err();
        match err {
            IrequireError::ConfigParseError { path, .. } => {
                assert_eq!(path, PathBuf::from("irequire.yml"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_document_is_empty_catalogue() {
        let config = parse_config("  \n", Path::new("irequire.yml")).unwrap();
        assert!(config.targets.is_empty());
    }

    #[test]
    fn json_documents_are_accepted() {
        let json = r#"{"targets": {"pip3": {"recipes": [{"template": "apt-get", "recipe": {"pkg_name": "python3-pip"}}]}}}"#;
        let config = parse_config(json, Path::new("irequire.json")).unwrap();
        assert!(config.targets.contains_key("pip3"));
    }

    #[test]
    fn load_catalogue_config_merges_builtins() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "irequire.yml",
            "targets:\n  md2man-roff:\n    recipes:\n      - template: gem\n        vars: { pkg_name: md2man }\n",
        );

        let config = load_catalogue_config(temp.path(), None).unwrap();
        assert!(config.templates.contains_key("gem"));
        assert!(config.targets.contains_key("md2man-roff"));
    }

    #[test]
    fn explicit_path_wins_over_discovery() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "irequire.yml", "targets: {}");
        let other = write(
            temp.path(),
            "other.yml",
            "targets:\n  gem:\n    recipes: [{ template: apt-get, vars: { pkg_name: ruby } }]\n",
        );

        let config = load_catalogue_config(temp.path(), Some(&other)).unwrap();
        assert!(config.targets.contains_key("gem"));
    }

    #[test]
    fn missing_project_config_is_not_found() {
        let temp = TempDir::new().unwrap();
        let result = load_catalogue_config(temp.path(), None);
        assert!(matches!(result, Err(IrequireError::ConfigNotFound { .. })));
    }
}
