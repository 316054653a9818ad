//! Repeat rule CLI commands

use anyhow::{Context, Result};
use clap::Subcommand;

use super::output::Output;
use super::session::Session;
use crate::domain::{calendar, next_occurrence, Rule};

#[derive(Subcommand)]
pub enum RuleCommands {
    /// Validate a repeat rule and print its canonical form
    Check {
        /// Repeat rule, e.g. "w 1,3" or "m -1 2,8"
        rule: String,
    },
}

pub fn run(cmd: RuleCommands, output: &Output) -> Result<()> {
    match cmd {
        RuleCommands::Check { rule } => check(output, &rule),
    }
}

fn check(output: &Output, text: &str) -> Result<()> {
    let rule: Rule = text
        .parse()
        .with_context(|| format!("Invalid repeat rule '{}'", text))?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "rule": rule,
            "kind": rule.kind(),
        }))?;
    } else {
        println!("{} ({})", rule, rule.kind().as_str());
    }

    Ok(())
}

/// Prints the next occurrence of `repeat` starting from `date`
///
/// `now` (`YYYYMMDD`) overrides the session's today.
pub fn next_date(
    session: &Session,
    output: &Output,
    now: Option<&str>,
    date: &str,
    repeat: &str,
) -> Result<()> {
    if date.trim().is_empty() {
        anyhow::bail!("--date is required");
    }
    if repeat.trim().is_empty() {
        anyhow::bail!("--repeat is required");
    }

    let now = match now.map(str::trim).filter(|n| !n.is_empty()) {
        Some(text) => {
            calendar::parse_date(text).with_context(|| format!("Invalid --now value '{}'", text))?
        }
        None => session.today(),
    };
    output.verbose_ctx(
        "next-date",
        &format!("now={}, date={}, repeat={}", calendar::format_date(now), date, repeat),
    );

    let next = next_occurrence(&now, date, repeat)?;
    output.date(&next)?;

    Ok(())
}
