//! Rendering and parsing helpers for CLI commands.

use std::path::Path;

use stratus_template::Template;

/// Renders a template as pretty JSON, or as YAML when `yaml` is set.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render(template: &Template, yaml: bool) -> anyhow::Result<String> {
    if yaml {
        Ok(serde_yaml::to_string(template)?)
    } else {
        Ok(template.to_json_pretty()?)
    }
}

/// Parses a template from JSON or YAML, chosen by the file extension.
///
/// # Errors
///
/// Returns an error if the content does not parse as a template.
pub fn parse_template(path: &Path, raw: &str) -> anyhow::Result<Template> {
    match path.extension().and_then(|extension| extension.to_str()) {
        Some("yml" | "yaml") => Ok(serde_yaml::from_str(raw)?),
        _ => Ok(serde_json::from_str(raw)?),
    }
}

/// Writes `rendered` to `path`, or to stdout when no path is given.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_rendered(path: Option<&Path>, rendered: &str) -> anyhow::Result<()> {
    match path {
        Some(path) => std::fs::write(path, rendered)?,
        None => print!("{rendered}"),
    }
    Ok(())
}
