use std::fs;
use std::path::{Path, PathBuf};

use super::types::RunConfiguration;
use crate::error::{ConfigError, Result};

/// File names probed in a directory when no explicit path is given
pub const CONFIG_FILE_CANDIDATES: &[&str] = &["runconfig.yaml", "runconfig.yml", "runconfig.json"];

/// Parse a config file, dispatching on its extension
pub fn parse_config_file(path: &Path) -> Result<RunConfiguration> {
    let content = fs::read_to_string(path)?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => parse_yaml_content(&content),
        Some("json") => parse_json_content(&content),
        _ => Err(ConfigError::validation(format!(
            "unsupported config format for {} (expected .yaml, .yml or .json)",
            path.display()
        ))),
    }
}

/// Parse YAML content into a RunConfiguration
pub fn parse_yaml_content(content: &str) -> Result<RunConfiguration> {
    serde_yaml::from_str(content).map_err(|e| ConfigError::validation(e.to_string()))
}

/// Parse JSON content into a RunConfiguration
pub fn parse_json_content(content: &str) -> Result<RunConfiguration> {
    serde_json::from_str(content).map_err(|e| ConfigError::validation(e.to_string()))
}

pub fn to_yaml_string(config: &RunConfiguration) -> Result<String> {
    serde_yaml::to_string(config)
        .map_err(|e| ConfigError::validation(format!("failed to serialize configuration: {}", e)))
}

pub fn to_json_string(config: &RunConfiguration) -> Result<String> {
    serde_json::to_string_pretty(config)
        .map_err(|e| ConfigError::validation(format!("failed to serialize configuration: {}", e)))
}

/// Resolve which config file to load: an explicit path wins, otherwise the
/// first candidate found in the working directory
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => resolve_in(Path::new(".")),
    }
}

/// First config file candidate present under `dir`
pub fn resolve_in(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_CANDIDATES
        .iter()
        .map(|name| dir.join(name))
        .find(|candidate| candidate.is_file())
}

/// Write the default configuration as a starter file
pub fn write_default_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(ConfigError::validation(format!(
            "config file {} already exists",
            path.display()
        )));
    }

    let config = RunConfiguration::default();
    let content = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => to_json_string(&config)?,
        _ => to_yaml_string(&config)?,
    };
    fs::write(path, content)?;
    Ok(())
}
