//! Configuration file handling

use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::paths::config_path;
use super::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Integration binary settings
    #[serde(default)]
    pub runner: RunnerConfig,

    /// Payload comparison settings
    #[serde(default)]
    pub validator: ValidatorConfig,

    /// Fixture staging settings
    #[serde(default)]
    pub fixtures: FixtureConfig,
}

/// How the integration binary is located and invoked
#[derive(Debug, Deserialize)]
pub struct RunnerConfig {
    /// Path to the integration executable
    #[serde(default = "default_binary")]
    pub binary: PathBuf,

    /// Flag naming the configuration file on the command line
    #[serde(default = "default_config_flag")]
    pub config_flag: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            config_flag: default_config_flag(),
        }
    }
}

fn default_binary() -> PathBuf {
    PathBuf::from("/bin/nri-flex")
}

fn default_config_flag() -> String {
    "-config_path".to_string()
}

/// Payload comparison settings
#[derive(Debug, Deserialize, Default, Clone, Copy)]
pub struct ValidatorConfig {
    /// Fail validation when expected and actual event totals differ
    #[serde(default)]
    pub check_events: bool,
}

/// Fixture staging settings
#[derive(Debug, Deserialize)]
pub struct FixtureConfig {
    /// Token in a fixture's configuration replaced by the staged file path
    #[serde(default = "default_placeholder")]
    pub placeholder: String,

    /// Keep staged configuration and data files after the run
    #[serde(default)]
    pub keep_artifacts: bool,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            placeholder: default_placeholder(),
            keep_artifacts: false,
        }
    }
}

fn default_placeholder() -> String {
    "FILE_PATH".to_string()
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

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| super::Error::file_read(path, e))?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| super::Error::ConfigParse(e.to_string()))
    }
}

impl RunnerConfig {
    /// Resolve the integration binary
    ///
    /// An existing path is used as is. Otherwise the file name is looked up
    /// in PATH, so `binary = "nri-flex"` works on developer machines.
    pub fn resolve_binary(&self) -> Result<PathBuf> {
        if self.binary.exists() {
            return Ok(self.binary.clone());
        }

        let name = self
            .binary
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| self.binary.as_os_str().to_os_string());

        which::which(&name).map_err(|_| {
            super::Error::Config(format!(
                "Integration binary '{}' not found and '{}' is not in PATH",
                self.binary.display(),
                name.to_string_lossy()
            ))
        })
    }
}
