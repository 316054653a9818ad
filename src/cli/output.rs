//! Output formatting for CLI commands

use anyhow::{Context, Result};
use serde::Serialize;

use crate::domain::Task;
use crate::storage;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl From<storage::OutputFormat> for OutputFormat {
    fn from(format: storage::OutputFormat) -> Self {
        match format {
            storage::OutputFormat::Text => OutputFormat::Text,
            storage::OutputFormat::Json => OutputFormat::Json,
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    format: OutputFormat,
    verbose: bool,
}

impl Output {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self { format, verbose }
    }

    /// Prints a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Text => println!("{}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({
                        "success": true,
                        "message": message
                    })
                );
            }
        }
    }

    /// Prints structured data (JSON mode), pretty-printed in text mode
    pub fn data<T: Serialize>(&self, data: &T) -> Result<()> {
        let json = match self.format {
            OutputFormat::Text => serde_json::to_string_pretty(data),
            OutputFormat::Json => serde_json::to_string(data),
        }
        .context("Failed to serialize output")?;

        println!("{}", json);
        Ok(())
    }

    /// Prints a bare date, or `{"date": ...}` in JSON mode
    pub fn date(&self, date: &str) -> Result<()> {
        match self.format {
            OutputFormat::Text => {
                println!("{}", date);
                Ok(())
            }
            OutputFormat::Json => self.data(&serde_json::json!({ "date": date })),
        }
    }

    /// Prints a task table header (text only)
    pub fn task_header(&self) {
        if self.is_text() {
            println!("{:<8} {:<10} {:<14} TITLE", "ID", "DATE", "REPEAT");
            println!("{}", "-".repeat(60));
        }
    }

    /// Prints one task as a table row (text only)
    pub fn task_row(&self, task: &Task) {
        if self.is_text() {
            let id = task.id.map(|id| id.to_string()).unwrap_or_default();
            let repeat = if task.repeat.is_empty() { "-" } else { &task.repeat };
            println!("{:<8} {:<10} {:<14} {}", id, task.date, repeat, task.title);
        }
    }

    /// Returns true if using JSON format
    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Returns true if using text format
    pub fn is_text(&self) -> bool {
        self.format == OutputFormat::Text
    }

    /// Prints a verbose debug message (only when --verbose is set)
    pub fn verbose(&self, message: &str) {
        if self.verbose {
            eprintln!("[verbose] {}", message);
        }
    }

    /// Prints a verbose debug message with context (only when --verbose is set)
    pub fn verbose_ctx(&self, context: &str, message: &str) {
        if self.verbose {
            eprintln!("[verbose:{}] {}", context, message);
        }
    }
}
