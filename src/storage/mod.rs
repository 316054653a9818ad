//! # Storage Layer
//!
//! Persistence and configuration for the scheduler.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Tasks | SQLite table `scheduler` | `scheduler.db` (configurable) |
//! | Config | TOML | `<config dir>/scheduler/config.toml` |
//!
//! ## Task Table
//!
//! ```text
//! scheduler
//! ├── id        INTEGER PRIMARY KEY AUTOINCREMENT
//! ├── date      CHAR(8)        -- YYYYMMDD, indexed
//! ├── title     VARCHAR(255)
//! ├── comment   TEXT
//! └── repeat    VARCHAR(128)   -- repeat rule, empty for one-shot tasks
//! ```
//!
//! ## Key Types
//!
//! - [`TaskStore`] - Create, read, update, delete and search tasks
//! - [`Config`] - Database location and listing defaults

mod db;
mod config;

pub use db::{StoreError, TaskStore};
pub use config::{Config, ConfigError, OutputFormat, DEFAULT_DATABASE, DEFAULT_SEARCH_LIMIT};
