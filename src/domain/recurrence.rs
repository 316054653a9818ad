//! Next-occurrence computation for repeat rules
//!
//! [`next_occurrence`] is the single entry point: given a reference day, a
//! start date and a rule, it returns the first date the rule produces that is
//! strictly after the reference day. The computation is pure; callers pass
//! "today" explicitly.
//!
//! Each rule kind has its own evaluator:
//!
//! - Annual: same month and day, one year at a time. A February 29 start
//!   moves to March 1 on the first advance and stays there.
//! - Interval: `start + k * n` for the smallest `k >= 1` past the reference.
//! - Weekly: forward scan of at most [`WEEKLY_SEARCH_DAYS`] days from
//!   `max(start, reference)`.
//! - Monthly: forward scan of at most [`MONTHLY_SEARCH_DAYS`] days from
//!   `max(start, reference)`, never returning a date before the start.

use std::collections::BTreeSet;

use chrono::{Datelike, Days, NaiveDate};
use thiserror::Error;

use super::calendar::{self, DateError};
use super::rule::{MonthDays, Rule, RuleError};

/// Days scanned by the weekly evaluator
pub const WEEKLY_SEARCH_DAYS: usize = 14;

/// Days scanned by the monthly evaluator
pub const MONTHLY_SEARCH_DAYS: usize = 730;

/// Upper bound on yearly advances for the annual evaluator
const MAX_ANNUAL_ADVANCES: i32 = 400;

/// Coarse classification of a [`RecurrenceError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A date or number failed to parse
    Format,
    /// A number parsed but is outside its domain
    Range,
    /// The rule is empty or has an unknown shape
    UnsupportedRule,
    /// A bounded scan found no qualifying date
    SearchExhausted,
    /// An evaluator bound was hit or the result cannot be represented
    Internal,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecurrenceError {
    #[error("invalid start date: {0}")]
    InvalidAnchor(#[source] DateError),

    #[error(transparent)]
    Rule(#[from] RuleError),

    #[error("no date matching '{rule}' within {days} days")]
    SearchExhausted { rule: String, days: usize },

    #[error("internal error: {0}")]
    Internal(String),
}

impl RecurrenceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RecurrenceError::InvalidAnchor(_) => ErrorKind::Format,
            RecurrenceError::Rule(RuleError::InvalidNumber { .. }) => ErrorKind::Format,
            RecurrenceError::Rule(RuleError::OutOfRange { .. }) => ErrorKind::Range,
            RecurrenceError::Rule(RuleError::Empty | RuleError::Unsupported(_)) => {
                ErrorKind::UnsupportedRule
            }
            RecurrenceError::SearchExhausted { .. } => ErrorKind::SearchExhausted,
            RecurrenceError::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// Computes the next occurrence of `rule` after `reference`, in `YYYYMMDD` form
///
/// `anchor` is the task's start date in `YYYYMMDD` form. Only the calendar day
/// of `reference` is considered.
pub fn next_occurrence<R: Datelike>(
    reference: &R,
    anchor: &str,
    rule: &str,
) -> Result<String, RecurrenceError> {
    let anchor = calendar::parse_date(anchor).map_err(RecurrenceError::InvalidAnchor)?;
    let rule: Rule = rule.parse()?;
    let reference = calendar::day_of(reference).ok_or_else(|| {
        RecurrenceError::Internal("reference day is not a valid date".to_string())
    })?;

    let next = next_occurrence_date(reference, anchor, &rule)?;

    if !calendar::is_representable(next) {
        return Err(RecurrenceError::Internal(format!(
            "next date {} does not fit the YYYYMMDD format",
            next
        )));
    }

    Ok(calendar::format_date(next))
}

/// Typed form of [`next_occurrence`] for already parsed inputs
pub fn next_occurrence_date(
    reference: NaiveDate,
    anchor: NaiveDate,
    rule: &Rule,
) -> Result<NaiveDate, RecurrenceError> {
    let exhausted = |days| RecurrenceError::SearchExhausted {
        rule: rule.to_string(),
        days,
    };

    match rule {
        Rule::Annual => next_annual(reference, anchor),
        Rule::IntervalDays(interval) => next_interval(reference, anchor, *interval),
        Rule::WeeklySet(weekdays) => {
            next_weekly(reference, anchor, weekdays).ok_or_else(|| exhausted(WEEKLY_SEARCH_DAYS))
        }
        Rule::MonthlySet { days, months } => next_monthly(reference, anchor, days, months)
            .ok_or_else(|| exhausted(MONTHLY_SEARCH_DAYS)),
    }
}

/// Moves `date` forward by whole years
///
/// February 29 in a target year without one becomes March 1, and later
/// advances carry on from March 1.
fn add_years(date: NaiveDate, years: i32) -> Option<NaiveDate> {
    let year = date.year().checked_add(years)?;
    NaiveDate::from_ymd_opt(year, date.month(), date.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
}

fn next_annual(reference: NaiveDate, anchor: NaiveDate) -> Result<NaiveDate, RecurrenceError> {
    let out_of_range = |date: NaiveDate| {
        RecurrenceError::Internal(format!("advancing {} by a year leaves the calendar", date))
    };

    // The first advance never lands in a leap year, so the running date is
    // never February 29 after it
    let mut candidate = add_years(anchor, 1).ok_or_else(|| out_of_range(anchor))?;

    // Years before the reference year can never qualify
    let skip = (reference.year() - candidate.year()).max(0);
    candidate = add_years(candidate, skip).ok_or_else(|| out_of_range(candidate))?;

    for _ in 0..MAX_ANNUAL_ADVANCES {
        if calendar::strictly_after(&candidate, &reference) {
            return Ok(candidate);
        }
        candidate = add_years(candidate, 1).ok_or_else(|| out_of_range(candidate))?;
    }

    Err(RecurrenceError::Internal(format!(
        "annual rule did not pass {} within {} years of {}",
        reference, MAX_ANNUAL_ADVANCES, anchor
    )))
}

fn next_interval(
    reference: NaiveDate,
    anchor: NaiveDate,
    interval: u32,
) -> Result<NaiveDate, RecurrenceError> {
    let interval = i64::from(interval);
    let elapsed = (reference - anchor).num_days();

    // Smallest k >= 1 with anchor + k * interval > reference
    let steps = if elapsed < 0 { 1 } else { elapsed / interval + 1 };

    u64::try_from(steps * interval)
        .ok()
        .and_then(|offset| anchor.checked_add_days(Days::new(offset)))
        .ok_or_else(|| {
            RecurrenceError::Internal(format!(
                "adding {} days to {} overflows the calendar",
                steps * interval,
                anchor
            ))
        })
}

fn next_weekly(
    reference: NaiveDate,
    anchor: NaiveDate,
    weekdays: &BTreeSet<u32>,
) -> Option<NaiveDate> {
    anchor
        .max(reference)
        .iter_days()
        .take(WEEKLY_SEARCH_DAYS)
        .find(|candidate| {
            weekdays.contains(&candidate.weekday().number_from_monday())
                && calendar::strictly_after(candidate, &reference)
        })
}

fn next_monthly(
    reference: NaiveDate,
    anchor: NaiveDate,
    days: &MonthDays,
    months: &BTreeSet<u32>,
) -> Option<NaiveDate> {
    anchor
        .max(reference)
        .iter_days()
        .take(MONTHLY_SEARCH_DAYS)
        .filter(|candidate| months.is_empty() || months.contains(&candidate.month()))
        .find(|candidate| {
            days.matches(*candidate)
                && calendar::strictly_after(candidate, &reference)
                && *candidate >= anchor
        })
}
