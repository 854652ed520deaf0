pub mod config;
pub mod error;
pub mod preflight;

// Re-export common items
pub use config::{load, load_effective, ConfigValidator, RunConfiguration};
pub use error::{ConfigError, Result};
pub use preflight::{run_checks, CheckOptions, CheckReport};
