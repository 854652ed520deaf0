pub mod devserver;
pub mod discovery;

pub use devserver::{server_plan, wait_until_ready, ServerPlan};
pub use discovery::discover_test_files;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::types::RunConfiguration;
use crate::config::validate::ConfigValidator;

/// Which preflight steps to run
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Skip the dev server probe entirely
    pub skip_server: bool,
    /// Also wait on the readiness URL. Only meaningful when a server is
    /// already running, since checks never launch one.
    pub wait_server: bool,
}

/// Outcome of a single preflight check
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CheckStatus {
    Passed,
    Failed { error: String },
    Skipped { reason: String },
}

impl CheckStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, CheckStatus::Failed { .. })
    }
}

/// A named check with its outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub detail: Option<String>,
}

impl CheckResult {
    fn passed(name: &str, detail: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Passed,
            detail,
        }
    }

    fn failed(name: &str, error: String) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Failed { error },
            detail: None,
        }
    }

    fn skipped(name: &str, reason: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Skipped {
                reason: reason.to_string(),
            },
            detail: None,
        }
    }
}

/// Aggregated preflight report
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckReport {
    pub checked_at: String,
    pub config_path: Option<String>,
    pub checks: Vec<CheckResult>,
}

impl CheckReport {
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|check| !check.status.is_failed())
    }

    pub fn failures(&self) -> Vec<&CheckResult> {
        self.checks
            .iter()
            .filter(|check| check.status.is_failed())
            .collect()
    }
}

/// Run every preflight check against a configuration
///
/// Checks validate structure, discover test files, and probe the dev
/// server address. Nothing is launched and no test executes.
pub async fn run_checks(
    config: &RunConfiguration,
    config_path: Option<&Path>,
    options: &CheckOptions,
) -> CheckReport {
    let mut checks = Vec::new();

    match ConfigValidator::validate(config) {
        Ok(()) => checks.push(CheckResult::passed("configuration", None)),
        Err(e) => checks.push(CheckResult::failed("configuration", e.to_string())),
    }

    match discovery::discover_test_files(&config.test_directory) {
        Ok(files) => checks.push(CheckResult::passed(
            "test discovery",
            Some(format!(
                "{} test file(s) under {}",
                files.len(),
                config.test_directory.display()
            )),
        )),
        Err(e) => checks.push(CheckResult::failed("test discovery", e.to_string())),
    }

    let plan = if options.skip_server {
        checks.push(CheckResult::skipped("dev server", "skipped by request"));
        None
    } else {
        match devserver::server_plan(&config.dev_server) {
            Ok(ServerPlan::ReuseExisting) => {
                checks.push(CheckResult::passed(
                    "dev server",
                    Some(format!("reusing server at {}", config.dev_server.url)),
                ));
                Some(ServerPlan::ReuseExisting)
            }
            Ok(ServerPlan::StartNew) => {
                checks.push(CheckResult::passed(
                    "dev server",
                    Some(format!(
                        "nothing listens at {}; the engine will launch `{}`",
                        config.dev_server.url, config.dev_server.command
                    )),
                ));
                Some(ServerPlan::StartNew)
            }
            Err(e) => {
                checks.push(CheckResult::failed("dev server", e.to_string()));
                None
            }
        }
    };

    // The launch command only matters when the engine would start one.
    if plan == Some(ServerPlan::StartNew) {
        match devserver::command_on_path(&config.dev_server) {
            Some(path) => checks.push(CheckResult::passed(
                "launch command",
                Some(path.display().to_string()),
            )),
            None => checks.push(CheckResult::failed(
                "launch command",
                format!(
                    "`{}` not found on PATH",
                    config.dev_server.program().unwrap_or("")
                ),
            )),
        }
    }

    if options.wait_server && !options.skip_server {
        match plan {
            Some(ServerPlan::ReuseExisting) => {
                match devserver::wait_until_ready(&config.dev_server).await {
                    Ok(waited_ms) => checks.push(CheckResult::passed(
                        "server readiness",
                        Some(format!("ready after {}ms", waited_ms)),
                    )),
                    Err(e) => checks.push(CheckResult::failed("server readiness", e.to_string())),
                }
            }
            Some(ServerPlan::StartNew) => {
                checks.push(CheckResult::skipped(
                    "server readiness",
                    "no server is running and checks never launch one",
                ));
            }
            None => {}
        }
    }

    CheckReport {
        checked_at: chrono::Utc::now().to_rfc3339(),
        config_path: config_path.map(|p| p.display().to_string()),
        checks,
    }
}
