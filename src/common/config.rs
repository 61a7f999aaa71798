//! Configuration file handling

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::testing::{REFERENCE_EXECUTABLE, REFERENCE_INPUT};

use super::paths::config_path;
use super::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Default settings for the reference scenario
    #[serde(default)]
    pub defaults: Defaults,

    /// Report settings
    #[serde(default)]
    pub report: ReportConfig,
}

/// Default settings
#[derive(Debug, Deserialize)]
pub struct Defaults {
    /// Executable run when no scenario file is given
    #[serde(default = "default_executable")]
    pub executable: PathBuf,

    /// Text written to the executable's stdin
    #[serde(default = "default_input")]
    pub input: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            input: default_input(),
        }
    }
}

fn default_executable() -> PathBuf {
    PathBuf::from(REFERENCE_EXECUTABLE)
}

fn default_input() -> String {
    REFERENCE_INPUT.to_string()
}

/// Report settings
#[derive(Debug, Deserialize)]
pub struct ReportConfig {
    /// Print the assembly and machine code blocks when a run fails
    #[serde(default = "default_true")]
    pub dump_blocks_on_failure: bool,

    /// Colorize the report
    #[serde(default = "default_true")]
    pub color: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            dump_blocks_on_failure: true,
            color: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| super::Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        toml::from_str(&content).map_err(|e| super::Error::ConfigParse(e.to_string()))
    }
}
