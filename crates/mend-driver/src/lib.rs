//! File-level driver for template checks.
//!
//! This crate provides:
//! - Check configuration (`mend.toml`)
//! - A template engine backed by an external command
//! - The [`Driver`] that reads inputs and runs checks
//!
//! # Example
//!
//! ```toml
//! # mend.toml
//! functions = ["upper"]
//!
//! [engine]
//! command = ["go-template-shim"]
//! template_name = "input template"
//!
//! [recovery]
//! max_fixes = 10
//! ```

mod config;
mod error;
mod process;

pub use config::{EngineConfig, MendConfig, RecoveryConfig, CONFIG_FILE, DEFAULT_TEMPLATE_NAME};
pub use error::{DriverError, Result};
pub use process::{ProcessEngine, ShimTemplate};

use mend_core::{check, CheckRequest, Report};
use std::io::Read;
use std::path::Path;

/// Runs checks with one configuration and engine.
pub struct Driver {
    config: MendConfig,
    engine: ProcessEngine,
}

impl Driver {
    pub fn new(config: MendConfig) -> Result<Self> {
        config.validate()?;
        let engine = ProcessEngine::new(&config.engine.command)?;
        Ok(Self { config, engine })
    }

    pub fn config(&self) -> &MendConfig {
        &self.config
    }

    /// Check template text. Configured functions are declared before
    /// `functions`.
    pub fn check_source(&self, text: String, data: Option<String>, functions: &[String]) -> Report {
        let request = CheckRequest {
            name: self.config.engine.template_name.clone(),
            text,
            data,
            functions: self
                .config
                .functions
                .iter()
                .chain(functions)
                .cloned()
                .collect(),
        };
        check(&self.engine, &request, self.config.recovery_options())
    }

    /// Check a template file, with optional sample data from a file.
    pub fn check_file(
        &self,
        template: impl AsRef<Path>,
        data: Option<&Path>,
        functions: &[String],
    ) -> Result<Report> {
        let text = read_input(template.as_ref())?;
        let data = data.map(read_input).transpose()?;
        Ok(self.check_source(text, data, functions))
    }
}

/// Read a file, or stdin when the path is `-`.
pub fn read_input(path: &Path) -> Result<String> {
    let read_err = |source| DriverError::ReadInput {
        path: path.to_path_buf(),
        source,
    };

    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text).map_err(read_err)?;
        return Ok(text);
    }
    std::fs::read_to_string(path).map_err(read_err)
}
