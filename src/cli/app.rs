//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::session::Session;
use super::{rule, task};
use crate::domain::calendar;
use crate::storage::Config;

#[derive(Parser)]
#[command(name = "sched")]
#[command(author, version, about = "Plan tasks and recurring reminders")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the configured format)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Task database file
    #[arg(long, global = true, env = "TODO_DBFILE")]
    pub db: Option<PathBuf>,

    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true, env = "SCHED_CONFIG")]
    pub config: Option<PathBuf>,

    /// Date to use as today (YYYYMMDD)
    #[arg(long, global = true, env = "SCHED_TODAY")]
    pub today: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute the next date produced by a repeat rule
    NextDate {
        /// Reference date (YYYYMMDD, defaults to today)
        #[arg(long)]
        now: Option<String>,

        /// Start date of the task (YYYYMMDD)
        #[arg(long)]
        date: String,

        /// Repeat rule
        #[arg(long)]
        repeat: String,
    },

    /// Manage tasks
    #[command(subcommand)]
    Task(task::TaskCommands),

    /// List upcoming tasks
    Tasks {
        /// Text in title/comment, or a date as DD.MM.YYYY
        #[arg(long, short)]
        search: Option<String>,
    },

    /// Work with repeat rules
    #[command(subcommand)]
    Rule(rule::RuleCommands),
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;
    let format = cli.format.unwrap_or_else(|| config.default_format.into());
    let output = Output::new(format, cli.verbose);

    output.verbose("Scheduler starting");

    let session = Session::new(config, cli.db, cli.today.as_deref())?;
    output.verbose_ctx(
        "session",
        &format!(
            "today={}, database={}",
            calendar::format_date(session.today()),
            session.database().display()
        ),
    );

    match cli.command {
        Commands::NextDate { now, date, repeat } => {
            rule::next_date(&session, &output, now.as_deref(), &date, &repeat)?
        }

        Commands::Task(cmd) => task::run(cmd, &session, &output)?,

        Commands::Tasks { search } => list_tasks(&session, &output, search.as_deref())?,

        Commands::Rule(cmd) => rule::run(cmd, &output)?,
    }

    output.verbose("Command completed successfully");
    Ok(())
}

/// Lists tasks ordered by date, optionally filtered
fn list_tasks(session: &Session, output: &Output, search: Option<&str>) -> Result<()> {
    let store = session.store()?;
    let limit = session.config().search_limit;
    let search = search.unwrap_or_default();

    output.verbose_ctx("tasks", &format!("Listing up to {} tasks, search: {:?}", limit, search));
    let tasks = store.list(limit, search)?;
    output.verbose_ctx("tasks", &format!("Found {} tasks", tasks.len()));

    if output.is_json() {
        output.data(&serde_json::json!({ "tasks": tasks }))?;
    } else if tasks.is_empty() {
        if search.trim().is_empty() {
            println!("No tasks");
        } else {
            println!("No tasks matching '{}'", search);
        }
    } else {
        output.task_header();
        for task in &tasks {
            output.task_row(task);
        }
    }

    Ok(())
}
