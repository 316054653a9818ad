//! Calendar primitives
//!
//! Everything in the scheduler works at day granularity. Dates cross the
//! crate boundary as 8 ASCII digits (`YYYYMMDD`), zero-padded, Gregorian,
//! with no timezone offset.

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

/// chrono format string for the `YYYYMMDD` text form
pub const DATE_FORMAT: &str = "%Y%m%d";

/// Number of characters in a formatted date
const DATE_LEN: usize = 8;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DateError {
    #[error("expected 8 digits in YYYYMMDD form, got '{0}'")]
    Malformed(String),

    #[error("'{0}' is not a valid calendar date")]
    Invalid(String),
}

/// Gregorian leap year test
pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Number of days in the given month, or `None` for a month outside 1..=12
///
/// Computed as the day before the first of the following month, so December
/// rolls over into January of the next year.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    if !(1..=12).contains(&month) {
        return None;
    }

    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)?
        .pred_opt()
        .map(|last| last.day())
}

/// Returns true if `a` falls on a later calendar day than `b`
///
/// Time of day is ignored: a later time on the same day is not "after".
pub fn strictly_after<A: Datelike, B: Datelike>(a: &A, b: &B) -> bool {
    (a.year(), a.month(), a.day()) > (b.year(), b.month(), b.day())
}

/// Truncates any date-like value to its calendar day
pub fn day_of<T: Datelike>(value: &T) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(value.year(), value.month(), value.day())
}

/// Parses a `YYYYMMDD` date
pub fn parse_date(text: &str) -> Result<NaiveDate, DateError> {
    if text.len() != DATE_LEN || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DateError::Malformed(text.to_string()));
    }

    let field = |range: std::ops::Range<usize>| -> Result<u32, DateError> {
        text[range]
            .parse()
            .map_err(|_| DateError::Malformed(text.to_string()))
    };

    let year = field(0..4)?;
    let month = field(4..6)?;
    let day = field(6..8)?;

    // Four digits always fit in an i32
    NaiveDate::from_ymd_opt(year as i32, month, day)
        .ok_or_else(|| DateError::Invalid(text.to_string()))
}

/// Formats a date as `YYYYMMDD`
///
/// Only dates for which [`is_representable`] holds round-trip through
/// [`parse_date`].
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Returns true if the date fits the 8-digit text form
pub fn is_representable(date: NaiveDate) -> bool {
    (0..=9999).contains(&date.year())
}
