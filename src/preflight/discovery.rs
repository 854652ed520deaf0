use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

/// File-name markers that identify a test file
const TEST_MARKERS: &[&str] = &[".spec.", ".test."];

/// Extensions a test file may carry
const TEST_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx", "mjs", "cjs"];

/// Recursively collect test files under `dir`, sorted by path
///
/// A missing directory or a scan with zero matches is a discovery
/// failure: the engine has nothing to run.
pub fn discover_test_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(ConfigError::Discovery {
            path: dir.to_path_buf(),
            reason: "test directory does not exist".to_string(),
        });
    }

    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| {
            let path = e.path();
            let in_node_modules = path
                .components()
                .any(|c| c.as_os_str() == "node_modules");

            e.file_type().is_file() && !in_node_modules && is_test_file(path)
        })
    {
        files.push(entry.path().to_path_buf());
    }

    if files.is_empty() {
        return Err(ConfigError::Discovery {
            path: dir.to_path_buf(),
            reason: "no test files found".to_string(),
        });
    }

    files.sort();
    Ok(files)
}

fn is_test_file(path: &Path) -> bool {
    let has_test_ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| TEST_EXTENSIONS.contains(&ext));
    if !has_test_ext {
        return false;
    }

    path.file_name()
        .and_then(|name| name.to_str())
        .map_or(false, |name| {
            TEST_MARKERS.iter().any(|marker| name.contains(marker))
        })
}
