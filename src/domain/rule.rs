//! Repeat rule grammar
//!
//! Rules are short space-separated strings:
//!
//! | Rule | Meaning |
//! |------|---------|
//! | `y` | Every year on the start date's month and day |
//! | `d <n>` | Every `n` days, `1 <= n <= 400` |
//! | `w <days>` | On the listed weekdays, `1` = Monday .. `7` = Sunday |
//! | `m <days> [<months>]` | On the listed days of the month (`-1` last, `-2` second to last), optionally restricted to the listed months |
//!
//! Lists are comma separated (`w 1,3,5`, `m 1,15,-1 1,7`). A rule is parsed
//! once into [`Rule`] and rendered back in canonical form by `Display`.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::calendar;

/// Largest interval accepted by `d <n>`
pub const MAX_INTERVAL_DAYS: u32 = 400;

/// The numeric field a rule token feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Interval,
    Weekday,
    MonthDay,
    Month,
}

impl Field {
    /// Human-readable description of the accepted values
    pub fn allowed(&self) -> &'static str {
        match self {
            Field::Interval => "1..=400",
            Field::Weekday => "1..=7",
            Field::MonthDay => "-2, -1 or 1..=31",
            Field::Month => "1..=12",
        }
    }

    fn accepts(&self, value: i64) -> bool {
        match self {
            Field::Interval => (1..=i64::from(MAX_INTERVAL_DAYS)).contains(&value),
            Field::Weekday => (1..=7).contains(&value),
            Field::MonthDay => (-2..=-1).contains(&value) || (1..=31).contains(&value),
            Field::Month => (1..=12).contains(&value),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Interval => "day interval",
            Field::Weekday => "weekday",
            Field::MonthDay => "day of month",
            Field::Month => "month",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RuleError {
    #[error("repeat rule must not be empty")]
    Empty,

    #[error("unsupported repeat rule: '{0}'")]
    Unsupported(String),

    #[error("invalid {field}: '{value}' is not an integer")]
    InvalidNumber { field: Field, value: String },

    #[error("{field} must be {}, got {value}", .field.allowed())]
    OutOfRange { field: Field, value: i64 },
}

/// Discriminant of a [`Rule`], used for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Annual,
    IntervalDays,
    WeeklySet,
    MonthlySet,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::Annual => "annual",
            RuleKind::IntervalDays => "interval_days",
            RuleKind::WeeklySet => "weekly_set",
            RuleKind::MonthlySet => "monthly_set",
        }
    }
}

/// Days of the month a monthly rule fires on
///
/// Positive entries are plain days (1..=31). Entries counted from the end of
/// the month are kept separately as offsets: `1` for the last day (`-1` in
/// rule text), `2` for the day before it (`-2`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MonthDays {
    days: BTreeSet<u32>,
    from_end: BTreeSet<u32>,
}

impl MonthDays {
    /// Day-of-month entries (1..=31)
    pub fn days(&self) -> &BTreeSet<u32> {
        &self.days
    }

    /// End-of-month offsets (1 = last day, 2 = second to last)
    pub fn from_end(&self) -> &BTreeSet<u32> {
        &self.from_end
    }

    /// Returns true if `date` falls on one of these days
    pub fn matches(&self, date: NaiveDate) -> bool {
        let day = date.day();
        if self.days.contains(&day) {
            return true;
        }
        if self.from_end.is_empty() {
            return false;
        }

        calendar::days_in_month(date.year(), date.month())
            .is_some_and(|last| last >= day && self.from_end.contains(&(last - day + 1)))
    }

    fn insert(&mut self, value: i64) {
        // Range checked by the parser
        if value < 0 {
            self.from_end.insert(value.unsigned_abs() as u32);
        } else {
            self.days.insert(value as u32);
        }
    }
}

/// A parsed repeat rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Rule {
    /// Same month and day every year
    Annual,
    /// Every `n` days
    IntervalDays(u32),
    /// On the listed ISO weekday numbers (1 = Monday .. 7 = Sunday)
    WeeklySet(BTreeSet<u32>),
    /// On the listed days of the listed months (empty `months` means every month)
    MonthlySet { days: MonthDays, months: BTreeSet<u32> },
}

impl Rule {
    pub fn kind(&self) -> RuleKind {
        match self {
            Rule::Annual => RuleKind::Annual,
            Rule::IntervalDays(_) => RuleKind::IntervalDays,
            Rule::WeeklySet(_) => RuleKind::WeeklySet,
            Rule::MonthlySet { .. } => RuleKind::MonthlySet,
        }
    }
}

/// Parses a comma-separated list of integers, range checking each entry
fn parse_list(list: &str, field: Field) -> Result<Vec<i64>, RuleError> {
    list.split(',').map(|item| parse_number(item, field)).collect()
}

fn parse_number(text: &str, field: Field) -> Result<i64, RuleError> {
    let value: i64 = text.trim().parse().map_err(|_| RuleError::InvalidNumber {
        field,
        value: text.to_string(),
    })?;

    if !field.accepts(value) {
        return Err(RuleError::OutOfRange { field, value });
    }

    Ok(value)
}

fn to_set(values: Vec<i64>) -> BTreeSet<u32> {
    // Callers only pass range-checked, positive values
    values.into_iter().map(|v| v as u32).collect()
}

impl FromStr for Rule {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(RuleError::Empty);
        }

        let tokens: Vec<&str> = s.split(' ').collect();

        match tokens.as_slice() {
            ["y"] => Ok(Rule::Annual),

            ["d", interval] => {
                let interval = parse_number(interval, Field::Interval)?;
                Ok(Rule::IntervalDays(interval as u32))
            }

            ["w", weekdays] => Ok(Rule::WeeklySet(to_set(parse_list(
                weekdays,
                Field::Weekday,
            )?))),

            ["m", days, months @ ..] if months.len() <= 1 => {
                let mut month_days = MonthDays::default();
                for day in parse_list(days, Field::MonthDay)? {
                    month_days.insert(day);
                }

                let months = match months.first() {
                    Some(list) => to_set(parse_list(list, Field::Month)?),
                    None => BTreeSet::new(),
                };

                Ok(Rule::MonthlySet {
                    days: month_days,
                    months,
                })
            }

            _ => Err(RuleError::Unsupported(s.to_string())),
        }
    }
}

fn write_list<I>(f: &mut fmt::Formatter<'_>, items: I) -> fmt::Result
where
    I: IntoIterator<Item = i64>,
{
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Annual => f.write_str("y"),
            Rule::IntervalDays(n) => write!(f, "d {}", n),
            Rule::WeeklySet(days) => {
                f.write_str("w ")?;
                write_list(f, days.iter().map(|&d| i64::from(d)))
            }
            Rule::MonthlySet { days, months } => {
                f.write_str("m ")?;
                let from_end = days.from_end.iter().rev().map(|&d| -i64::from(d));
                let plain = days.days.iter().map(|&d| i64::from(d));
                write_list(f, from_end.chain(plain))?;

                if !months.is_empty() {
                    f.write_str(" ")?;
                    write_list(f, months.iter().map(|&m| i64::from(m)))?;
                }
                Ok(())
            }
        }
    }
}

impl TryFrom<String> for Rule {
    type Error = RuleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rule> for String {
    fn from(rule: Rule) -> Self {
        rule.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(values: &[u32]) -> BTreeSet<u32> {
        values.iter().copied().collect()
    }

    #[test]
    fn parses_annual() {
        assert_eq!("y".parse::<Rule>().unwrap(), Rule::Annual);
        assert_eq!("  y  ".parse::<Rule>().unwrap(), Rule::Annual);
    }

    #[test]
    fn parses_interval() {
        assert_eq!("d 1".parse::<Rule>().unwrap(), Rule::IntervalDays(1));
        assert_eq!("d 400".parse::<Rule>().unwrap(), Rule::IntervalDays(400));
    }

    #[test]
    fn interval_out_of_range_is_range_error() {
        assert_eq!(
            "d 401".parse::<Rule>(),
            Err(RuleError::OutOfRange {
                field: Field::Interval,
                value: 401
            })
        );
        assert!(matches!(
            "d 0".parse::<Rule>(),
            Err(RuleError::OutOfRange { .. })
        ));
    }

    #[test]
    fn interval_not_a_number_is_format_error() {
        assert_eq!(
            "d five".parse::<Rule>(),
            Err(RuleError::InvalidNumber {
                field: Field::Interval,
                value: "five".to_string()
            })
        );
    }

    #[test]
    fn parses_weekly_set() {
        assert_eq!(
            "w 7,1,3,1".parse::<Rule>().unwrap(),
            Rule::WeeklySet(set(&[1, 3, 7]))
        );
    }

    #[test]
    fn weekly_rejects_bad_entries() {
        assert!(matches!(
            "w 0".parse::<Rule>(),
            Err(RuleError::OutOfRange { field: Field::Weekday, value: 0 })
        ));
        assert!(matches!(
            "w 1,8".parse::<Rule>(),
            Err(RuleError::OutOfRange { field: Field::Weekday, value: 8 })
        ));
        assert!(matches!(
            "w 1,,2".parse::<Rule>(),
            Err(RuleError::InvalidNumber { field: Field::Weekday, .. })
        ));
        assert!(matches!(
            "w mon".parse::<Rule>(),
            Err(RuleError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn parses_monthly_with_and_without_months() {
        let rule: Rule = "m 1,-1,15".parse().unwrap();
        let Rule::MonthlySet { days, months } = rule else {
            panic!("expected monthly rule");
        };
        assert_eq!(days.days(), &set(&[1, 15]));
        assert_eq!(days.from_end(), &set(&[1]));
        assert!(months.is_empty());

        let rule: Rule = "m -2 2,12".parse().unwrap();
        let Rule::MonthlySet { days, months } = rule else {
            panic!("expected monthly rule");
        };
        assert!(days.days().is_empty());
        assert_eq!(days.from_end(), &set(&[2]));
        assert_eq!(months, set(&[2, 12]));
    }

    #[test]
    fn monthly_rejects_bad_days_and_months() {
        for rule in ["m 0", "m -3", "m 32", "m 1 0", "m 1 13"] {
            assert!(
                matches!(rule.parse::<Rule>(), Err(RuleError::OutOfRange { .. })),
                "{} should be out of range",
                rule
            );
        }
        assert!(matches!(
            "m 1 jan".parse::<Rule>(),
            Err(RuleError::InvalidNumber { field: Field::Month, .. })
        ));
    }

    #[test]
    fn unknown_shapes_are_unsupported() {
        for rule in ["x 5", "d", "w", "m", "y 1", "d 1 2", "m 1 2 3", "d  5", "D 5"] {
            assert!(
                matches!(rule.parse::<Rule>(), Err(RuleError::Unsupported(_))),
                "{} should be unsupported",
                rule
            );
        }
    }

    #[test]
    fn empty_rule_is_rejected() {
        assert_eq!("".parse::<Rule>(), Err(RuleError::Empty));
        assert_eq!("   ".parse::<Rule>(), Err(RuleError::Empty));
    }

    #[test]
    fn display_is_canonical() {
        let cases = [
            ("y", "y"),
            ("d 07", "d 7"),
            ("w 5,1,5", "w 1,5"),
            ("m 15,-1,1,-2", "m -2,-1,1,15"),
            ("m 31 12,1", "m 31 1,12"),
        ];
        for (input, canonical) in cases {
            let rule: Rule = input.parse().unwrap();
            assert_eq!(rule.to_string(), canonical);
            assert_eq!(canonical.parse::<Rule>().unwrap(), rule);
        }
    }

    #[test]
    fn month_days_match_end_of_month() {
        let rule: Rule = "m -1,-2".parse().unwrap();
        let Rule::MonthlySet { days, .. } = rule else {
            panic!("expected monthly rule");
        };
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();

        assert!(days.matches(date(2024, 2, 29)));
        assert!(days.matches(date(2024, 2, 28)));
        assert!(!days.matches(date(2024, 2, 27)));
        assert!(days.matches(date(2023, 2, 28)));
        assert!(days.matches(date(2023, 2, 27)));
        assert!(days.matches(date(2024, 4, 30)));
        assert!(!days.matches(date(2024, 4, 1)));
    }

    #[test]
    fn kind_reports_variant() {
        assert_eq!(Rule::Annual.kind(), RuleKind::Annual);
        assert_eq!("d 3".parse::<Rule>().unwrap().kind().as_str(), "interval_days");
        assert_eq!("m 1".parse::<Rule>().unwrap().kind(), RuleKind::MonthlySet);
    }

    #[test]
    fn serde_uses_rule_text() {
        let rule: Rule = "w 3,1".parse().unwrap();
        let json = serde_json::to_string(&rule).unwrap();
        assert_eq!(json, "\"w 1,3\"");

        let parsed: Rule = serde_json::from_str("\"m -1 2\"").unwrap();
        assert_eq!(parsed.to_string(), "m -1 2");
        assert!(serde_json::from_str::<Rule>("\"q 1\"").is_err());
    }
}
