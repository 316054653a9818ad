//! Configuration handling for the scheduler
//!
//! Configuration is read from `config.toml` in the platform config directory
//! (e.g. `~/.config/scheduler/config.toml`) or from an explicit path.
//! Command-line flags and environment variables take precedence over it.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Database file used when nothing else is configured
pub const DEFAULT_DATABASE: &str = "scheduler.db";

/// Default number of tasks returned by a listing
pub const DEFAULT_SEARCH_LIMIT: usize = 50;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Scheduler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database file holding the tasks
    pub database: PathBuf,

    /// Maximum number of tasks returned by `sched tasks`
    pub search_limit: usize,

    /// Output format when `--format` is not given
    pub default_format: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: PathBuf::from(DEFAULT_DATABASE),
            search_limit: DEFAULT_SEARCH_LIMIT,
            default_format: OutputFormat::Text,
        }
    }
}

impl Config {
    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "scheduler", "scheduler")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads configuration from `explicit`, or from the global location
    ///
    /// An explicit path must exist; a missing global file yields defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        match Self::global_config_dir().map(|dir| dir.join("config.toml")) {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Loads configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        Self::parse(&content).with_context(|| format!("Failed to load config: {}", path.display()))
    }

    /// Parses and validates TOML configuration text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values serde cannot
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search_limit == 0 {
            return Err(ConfigError::Invalid(
                "search_limit must be at least 1".to_string(),
            ));
        }
        if self.database.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("database must not be empty".to_string()));
        }
        Ok(())
    }
}
