//! Per-invocation state shared by commands
//!
//! Resolves the effective "today" and database location once, so every
//! command sees the same values.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};

use crate::domain::calendar;
use crate::storage::{Config, TaskStore};

pub struct Session {
    config: Config,
    database: PathBuf,
    today: NaiveDate,
}

impl Session {
    /// Builds a session from loaded config and command-line overrides
    ///
    /// `database` wins over the configured path; `today` (`YYYYMMDD`) replaces
    /// the local calendar date.
    pub fn new(config: Config, database: Option<PathBuf>, today: Option<&str>) -> Result<Self> {
        let database = database
            .filter(|path| !path.as_os_str().is_empty())
            .unwrap_or_else(|| config.database.clone());

        let today = match today.map(str::trim).filter(|t| !t.is_empty()) {
            Some(text) => calendar::parse_date(text)
                .with_context(|| format!("Invalid --today value '{}'", text))?,
            None => Local::now().date_naive(),
        };

        Ok(Self {
            config,
            database,
            today,
        })
    }

    /// Returns the effective current date
    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the database path in use
    pub fn database(&self) -> &PathBuf {
        &self.database
    }

    /// Opens the task store
    pub fn store(&self) -> Result<TaskStore> {
        TaskStore::open(&self.database)
    }
}
