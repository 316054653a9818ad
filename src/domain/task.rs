//! Task domain model
//!
//! A task is a dated reminder with an optional repeat rule. Dates are kept in
//! their `YYYYMMDD` text form, exactly as stored and exchanged.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::calendar::{self, DateError};
use super::id::TaskId;
use super::recurrence::{self, RecurrenceError};
use super::rule::Rule;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Task title is required")]
    MissingTitle,

    #[error("Date '{value}' is not in YYYYMMDD format")]
    InvalidDate {
        value: String,
        #[source]
        source: DateError,
    },

    #[error("Invalid repeat rule: {0}")]
    InvalidRule(#[from] RecurrenceError),
}

/// What completing a task does to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// One-shot task, delete it
    Remove,
    /// Recurring task, move it to the contained date
    Reschedule(String),
}

/// A scheduled task
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Task {
    /// Store-assigned identifier, absent until the task is saved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<TaskId>,

    /// Due date (`YYYYMMDD`)
    pub date: String,

    /// Human-readable title
    pub title: String,

    /// Free-text comment
    pub comment: String,

    /// Repeat rule, empty for one-shot tasks
    pub repeat: String,
}

impl Task {
    /// Creates an unsaved task with the given title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Returns true if the task has a repeat rule
    pub fn is_recurring(&self) -> bool {
        !self.repeat.trim().is_empty()
    }

    /// Checks the fields that do not depend on the current date
    pub fn validate(&self) -> Result<(), TaskError> {
        if self.title.trim().is_empty() {
            return Err(TaskError::MissingTitle);
        }
        Ok(())
    }

    /// Normalizes the due date against `today`
    ///
    /// - an empty date becomes today
    /// - a date in the past becomes today, or the rule's next occurrence after
    ///   today for recurring tasks
    /// - today and future dates are kept
    ///
    /// A repeat rule is evaluated for dates up to today; for future dates only
    /// its syntax is checked.
    pub fn schedule(&mut self, today: NaiveDate) -> Result<(), TaskError> {
        let today_text = calendar::format_date(today);

        if self.date.trim().is_empty() {
            self.date = today_text.clone();
        }

        let date = calendar::parse_date(&self.date).map_err(|source| TaskError::InvalidDate {
            value: self.date.clone(),
            source,
        })?;

        if !self.is_recurring() {
            if date < today {
                self.date = today_text;
            }
            return Ok(());
        }

        if date > today {
            // Not due yet, so only the rule text is checked
            self.repeat
                .parse::<Rule>()
                .map_err(|e| TaskError::InvalidRule(e.into()))?;
            return Ok(());
        }

        let next = recurrence::next_occurrence(&today, &self.date, &self.repeat)?;
        if date < today {
            self.date = next;
        }

        Ok(())
    }

    /// Decides what marking the task done means on `today`
    pub fn complete(&self, today: NaiveDate) -> Result<Completion, TaskError> {
        if !self.is_recurring() {
            return Ok(Completion::Remove);
        }

        let next = recurrence::next_occurrence(&today, &self.date, &self.repeat)?;
        Ok(Completion::Reschedule(next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        calendar::parse_date("20240115").unwrap()
    }

    fn task(date: &str, repeat: &str) -> Task {
        Task {
            date: date.to_string(),
            repeat: repeat.to_string(),
            ..Task::new("Water plants")
        }
    }

    #[test]
    fn validate_requires_title() {
        assert!(Task::new("Call mom").validate().is_ok());
        assert!(matches!(Task::new("").validate(), Err(TaskError::MissingTitle)));
        assert!(matches!(Task::new("  ").validate(), Err(TaskError::MissingTitle)));
    }

    #[test]
    fn empty_date_becomes_today() {
        let mut t = task("", "");
        t.schedule(today()).unwrap();
        assert_eq!(t.date, "20240115");
    }

    #[test]
    fn today_stays_today_even_with_rule() {
        let mut t = task("20240115", "d 3");
        t.schedule(today()).unwrap();
        assert_eq!(t.date, "20240115");
    }

    #[test]
    fn past_date_without_rule_becomes_today() {
        let mut t = task("20231201", "");
        t.schedule(today()).unwrap();
        assert_eq!(t.date, "20240115");
    }

    #[test]
    fn past_date_with_rule_moves_to_next_occurrence() {
        let mut t = task("20240101", "d 5");
        t.schedule(today()).unwrap();
        assert_eq!(t.date, "20240116");

        let mut t = task("20230310", "y");
        t.schedule(today()).unwrap();
        assert_eq!(t.date, "20240310");
    }

    #[test]
    fn future_date_is_kept() {
        let mut t = task("20240301", "w 1");
        t.schedule(today()).unwrap();
        assert_eq!(t.date, "20240301");
    }

    #[test]
    fn malformed_date_is_rejected() {
        let mut t = task("15.01.2024", "");
        assert!(matches!(
            t.schedule(today()),
            Err(TaskError::InvalidDate { .. })
        ));
    }

    #[test]
    fn bad_rule_is_rejected_for_any_date() {
        for date in ["20240101", "20240115", "20250101"] {
            let mut t = task(date, "x 1");
            assert!(
                matches!(t.schedule(today()), Err(TaskError::InvalidRule(_))),
                "rule accepted for {}",
                date
            );
        }
    }

    #[test]
    fn future_date_with_sparse_rule_is_kept() {
        // The next February 29 is more than two years past the start date
        let mut t = task("20250101", "m 29 2");
        t.schedule(today()).unwrap();
        assert_eq!(t.date, "20250101");
        assert_eq!(t.repeat, "m 29 2");
    }

    #[test]
    fn complete_one_shot_removes() {
        assert_eq!(task("20240115", "").complete(today()).unwrap(), Completion::Remove);
    }

    #[test]
    fn complete_recurring_reschedules() {
        assert_eq!(
            task("20240115", "d 7").complete(today()).unwrap(),
            Completion::Reschedule("20240122".to_string())
        );
        // 2024-01-15 is a Monday
        assert_eq!(
            task("20240115", "w 1,5").complete(today()).unwrap(),
            Completion::Reschedule("20240119".to_string())
        );
    }

    #[test]
    fn json_field_names() {
        let mut t = task("20240115", "y");
        t.id = Some(TaskId::new(3));
        t.comment = "front porch".to_string();

        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "3",
                "date": "20240115",
                "title": "Water plants",
                "comment": "front porch",
                "repeat": "y",
            })
        );

        let parsed: Task = serde_json::from_str(r#"{"title": "Only title"}"#).unwrap();
        assert_eq!(parsed.id, None);
        assert!(parsed.date.is_empty());
        assert!(!parsed.is_recurring());
    }
}
