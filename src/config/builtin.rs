//! Built-in templates embedded at compile time.
//!
//! Each `templates/<name>.yml` file holds one template; the file stem is
//! the template name.

use crate::config::schema::{CatalogueConfig, OrderedMap, TemplateConfig};
use crate::error::{IrequireError, Result};
use include_dir::{include_dir, Dir};

/// Embedded templates directory.
static TEMPLATES_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/templates");

/// Load all built-in templates, sorted by name.
pub fn load_templates() -> Result<OrderedMap<TemplateConfig>> {
    let mut files: Vec<_> = TEMPLATES_DIR
        .files()
        .filter(|file| {
            file.path()
                .extension()
                .is_some_and(|ext| ext == "yml" || ext == "yaml")
        })
        .collect();
    files.sort_by(|a, b| a.path().cmp(b.path()));

    let mut templates = OrderedMap::new();
    for file in files {
        let path = file.path();
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let content = file
            .contents_utf8()
            .ok_or_else(|| IrequireError::ConfigParseError {
                path: path.to_path_buf(),
                message: "Invalid UTF-8".to_string(),
            })?;

        let template: TemplateConfig =
            serde_yaml::from_str(content).map_err(|e| IrequireError::ConfigParseError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        templates.insert(name, template);
    }

    Ok(templates)
}

/// Merge the built-in templates underneath the config's own.
///
/// Config templates replace built-ins of the same name. Does nothing when
/// `settings.builtin_templates` is off.
pub fn with_builtin_templates(config: CatalogueConfig) -> Result<CatalogueConfig> {
    if !config.settings.builtin_templates {
        return Ok(config);
    }

    let mut templates = load_templates()?;
    for (name, template) in config.templates.iter() {
        templates.insert(name, template.clone());
    }

    Ok(CatalogueConfig {
        templates,
        ..config
    })
}
