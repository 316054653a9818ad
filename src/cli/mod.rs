//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Rules | Repeat rule evaluation | `next-date`, `rule check` |
//! | Task | Task management | `task add`, `task update`, `task done` |
//! | Listing | Upcoming tasks | `tasks`, `tasks --search milk` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Reproducible Runs
//!
//! `--today 20240115` (or `SCHED_TODAY`) pins the current date, and
//! `--db` (or `TODO_DBFILE`) selects the database:
//! ```bash
//! sched --today 20240115 --db /tmp/tasks.db task done 3
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod rule;
mod session;
mod task;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
pub use session::Session;
