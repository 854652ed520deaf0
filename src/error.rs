use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced while loading, validating, or preflighting a run
/// configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Test directory missing or no test files under it
    #[error("test discovery failed in {}: {reason}", path.display())]
    Discovery { path: PathBuf, reason: String },

    /// Structurally invalid configuration value
    #[error("invalid configuration: {0}")]
    Validation(String),

    /// Dev server never answered on its readiness URL within the budget
    #[error("dev server at {url} not ready after {waited_ms}ms")]
    ServerStartup { url: String, waited_ms: u64 },

    /// Dev server address already bound while reuseExistingServer is false
    #[error("port conflict: {url} is already in use and reuseExistingServer is false")]
    PortConflict { url: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ConfigError::Validation(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_offender() {
        let err = ConfigError::Discovery {
            path: PathBuf::from("./e2e"),
            reason: "no test files found".to_string(),
        };
        assert!(err.to_string().contains("./e2e"));
        assert!(err.to_string().contains("no test files found"));

        let err = ConfigError::PortConflict {
            url: "http://localhost:3000".to_string(),
        };
        assert!(err.to_string().contains("http://localhost:3000"));

        let err = ConfigError::ServerStartup {
            url: "http://localhost:3000".to_string(),
            waited_ms: 120_000,
        };
        assert!(err.to_string().contains("120000ms"));
    }
}
