//! Error types for mend-driver.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for mend-driver operations.
pub type Result<T> = std::result::Result<T, DriverError>;

/// Errors that stop a check before any diagnostics can be produced.
#[derive(Error, Diagnostic, Debug)]
pub enum DriverError {
    /// Failed to read configuration file.
    #[error("Failed to read config file {path}: {source}")]
    #[diagnostic(code(mend::config::read))]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML configuration.
    #[error("Failed to parse TOML config: {0}")]
    #[diagnostic(code(mend::config::parse))]
    ParseToml(#[from] toml::de::Error),

    /// Configuration validation error.
    #[error("Config validation error: {0}")]
    #[diagnostic(code(mend::config::invalid))]
    Validation(String),

    /// Failed to read a template or data file.
    #[error("Failed to read {path}: {source}")]
    #[diagnostic(code(mend::input::read))]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No engine command configured.
    #[error("No template engine command configured")]
    #[diagnostic(
        code(mend::engine::missing),
        help("set `engine.command` in mend.toml or pass --engine")
    )]
    NoEngine,
}
