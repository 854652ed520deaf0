pub mod file;
pub mod types;
pub mod validate;

pub use file::{
    parse_config_file, parse_json_content, parse_yaml_content, resolve_config_path,
    to_json_string, to_yaml_string, write_default_config,
};
pub use types::{
    BrowserContextDefaults, BrowserEngine, BrowserProjectSpec, CapturePolicy, ContextOverrides,
    DevServerSpec, OpenPolicy, ReporterSpec, RunConfiguration, TracePolicy, Viewport,
};
pub use validate::ConfigValidator;

use std::path::{Path, PathBuf};

use crate::error::Result;

/// The baked-in configuration, used when no config file is present
///
/// Pure construction: no I/O, no validation, no shared state. Each call
/// returns a fresh record the caller owns.
pub fn load() -> RunConfiguration {
    RunConfiguration::default()
}

/// Load the effective configuration and report where it came from
///
/// An explicit path wins; otherwise the working directory is probed for
/// a config file; otherwise the baked-in record is returned with no path.
pub fn load_effective(explicit: Option<&Path>) -> Result<(RunConfiguration, Option<PathBuf>)> {
    match file::resolve_config_path(explicit) {
        Some(path) => {
            let config = file::parse_config_file(&path)?;
            Ok((config, Some(path)))
        }
        None => Ok((load(), None)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_returns_fresh_equal_records() {
        let first = load();
        let second = load();
        assert_eq!(first, second);

        // mutating one run's record cannot leak into the next
        let mut mutated = load();
        mutated.global_timeout_ms = 1;
        assert_eq!(mutated.global_timeout_ms, 1);
        assert_eq!(load().global_timeout_ms, 30_000);
    }

    #[test]
    fn test_load_effective_prefers_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.yaml");
        std::fs::write(&path, "globalTimeoutMs: 90000\n").unwrap();

        let (config, source) = load_effective(Some(&path)).unwrap();
        assert_eq!(config.global_timeout_ms, 90_000);
        assert_eq!(source, Some(path));
    }

    #[test]
    fn test_load_effective_propagates_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        std::fs::write(&path, "reporters:\n  - junit\n").unwrap();

        assert!(load_effective(Some(&path)).is_err());
    }
}
