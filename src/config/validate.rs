use std::collections::HashSet;

use log::warn;
use reqwest::Url;

use super::types::{BrowserProjectSpec, DevServerSpec, RunConfiguration};
use crate::error::{ConfigError, Result};

/// Configuration validator
///
/// Hard violations fail with a Validation error; advisory findings are
/// logged as warnings and never fail the run.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the entire configuration
    pub fn validate(config: &RunConfiguration) -> Result<()> {
        Self::validate_timeouts(config)?;
        Self::validate_projects(&config.projects)?;
        Self::validate_viewports(config)?;
        Self::validate_urls(config)?;
        Self::validate_dev_server(&config.dev_server)?;
        Ok(())
    }

    fn validate_timeouts(config: &RunConfiguration) -> Result<()> {
        if config.global_timeout_ms == 0 {
            return Err(ConfigError::validation(
                "globalTimeoutMs must be greater than zero",
            ));
        }

        if config.assertion_timeout_ms == 0 {
            return Err(ConfigError::validation(
                "assertionTimeoutMs must be greater than zero",
            ));
        }

        // Misconfiguration, not an error: the assertion budget can outlive
        // the test that owns it.
        if config.assertion_timeout_ms > config.global_timeout_ms {
            warn!(
                "assertionTimeoutMs ({}) exceeds globalTimeoutMs ({})",
                config.assertion_timeout_ms, config.global_timeout_ms
            );
        }

        Ok(())
    }

    fn validate_projects(projects: &[BrowserProjectSpec]) -> Result<()> {
        if projects.is_empty() {
            return Err(ConfigError::validation(
                "projects must not be empty: no tests can execute without at least one project",
            ));
        }

        let mut seen = HashSet::new();
        for project in projects {
            if project.name.trim().is_empty() {
                return Err(ConfigError::validation("project name must not be empty"));
            }
            if !seen.insert(project.name.as_str()) {
                return Err(ConfigError::validation(format!(
                    "duplicate project name `{}`",
                    project.name
                )));
            }
        }

        Ok(())
    }

    fn validate_viewports(config: &RunConfiguration) -> Result<()> {
        let shared = &config.shared_context.viewport;
        if shared.width == 0 || shared.height == 0 {
            return Err(ConfigError::validation(format!(
                "sharedContext.viewport must have non-zero dimensions (got {}x{})",
                shared.width, shared.height
            )));
        }

        for project in &config.projects {
            if let Some(viewport) = &project.overrides.viewport {
                if viewport.width == 0 || viewport.height == 0 {
                    return Err(ConfigError::validation(format!(
                        "project `{}` viewport must have non-zero dimensions (got {}x{})",
                        project.name, viewport.width, viewport.height
                    )));
                }
            }
        }

        Ok(())
    }

    fn validate_urls(config: &RunConfiguration) -> Result<()> {
        let base = Url::parse(&config.shared_context.base_url).map_err(|e| {
            ConfigError::validation(format!(
                "sharedContext.baseURL `{}` is not a valid URL: {}",
                config.shared_context.base_url, e
            ))
        })?;

        let server = Url::parse(&config.dev_server.url).map_err(|e| {
            ConfigError::validation(format!(
                "devServer.url `{}` is not a valid URL: {}",
                config.dev_server.url, e
            ))
        })?;

        // Navigation consistency: the suite navigates relative to baseURL
        // while readiness is probed against devServer.url.
        if base.scheme() != server.scheme() {
            return Err(ConfigError::validation(format!(
                "devServer.url scheme `{}` does not match sharedContext.baseURL scheme `{}`",
                server.scheme(),
                base.scheme()
            )));
        }

        if base.host_str() != server.host_str() {
            return Err(ConfigError::validation(format!(
                "devServer.url host `{}` does not match sharedContext.baseURL host `{}`",
                server.host_str().unwrap_or(""),
                base.host_str().unwrap_or("")
            )));
        }

        if base.port_or_known_default() != server.port_or_known_default() {
            warn!(
                "devServer.url port ({:?}) differs from sharedContext.baseURL port ({:?})",
                server.port_or_known_default(),
                base.port_or_known_default()
            );
        }

        // Per-project baseURL overrides must parse as well
        for project in &config.projects {
            if let Some(url) = &project.overrides.base_url {
                Url::parse(url).map_err(|e| {
                    ConfigError::validation(format!(
                        "project `{}` baseURL `{}` is not a valid URL: {}",
                        project.name, url, e
                    ))
                })?;
            }
        }

        Ok(())
    }

    fn validate_dev_server(server: &DevServerSpec) -> Result<()> {
        if server.program().is_none() {
            return Err(ConfigError::validation("devServer.command must not be empty"));
        }

        if server.timeout_ms == 0 {
            return Err(ConfigError::validation(
                "devServer.timeoutMs must be greater than zero",
            ));
        }

        Ok(())
    }
}
