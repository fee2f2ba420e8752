//! Check configuration (mend.toml format).

use mend_core::{RecoveryOptions, MAX_FIXES};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up when no config path is given.
pub const CONFIG_FILE: &str = "mend.toml";

/// Template name used when none is configured.
pub const DEFAULT_TEMPLATE_NAME: &str = "input template";

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MendConfig {
    /// Functions declared for every check.
    #[serde(default)]
    pub functions: Vec<String>,

    /// Template engine settings.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Recovery settings.
    #[serde(default)]
    pub recovery: RecoveryConfig,
}

/// Template engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Program and leading arguments; `parse` or `exec` is appended.
    #[serde(default)]
    pub command: Vec<String>,

    /// Name the engine gives the template in its messages.
    #[serde(default = "default_template_name")]
    pub template_name: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            command: Vec::new(),
            template_name: default_template_name(),
        }
    }
}

fn default_template_name() -> String {
    DEFAULT_TEMPLATE_NAME.to_string()
}

/// Recovery settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RecoveryConfig {
    #[serde(default = "default_max_fixes")]
    pub max_fixes: usize,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            max_fixes: MAX_FIXES,
        }
    }
}

fn default_max_fixes() -> usize {
    MAX_FIXES
}

impl MendConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| {
            crate::DriverError::ReadConfig {
                path: path.to_path_buf(),
                source,
            }
        })?;
        let config: MendConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `mend.toml` from `dir` if there is one.
    pub fn discover(dir: &Path) -> crate::Result<Option<Self>> {
        let path = Self::path_in(dir);
        if !path.is_file() {
            return Ok(None);
        }
        Self::from_file(&path).map(Some)
    }

    /// Reject settings no check could run with.
    pub fn validate(&self) -> crate::Result<()> {
        if self.engine.command.first().is_some_and(|program| program.trim().is_empty()) {
            return Err(crate::DriverError::Validation(
                "engine.command must start with a program".to_string(),
            ));
        }
        if self.engine.template_name.is_empty() {
            return Err(crate::DriverError::Validation(
                "engine.template_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn recovery_options(&self) -> RecoveryOptions {
        RecoveryOptions {
            max_fixes: self.recovery.max_fixes,
        }
    }

    /// Where the config file for `dir` lives.
    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(CONFIG_FILE)
    }
}
