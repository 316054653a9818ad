//! Domain models for the scheduler
//!
//! Contains the calendar math, the repeat rule engine and the task model,
//! without any I/O concerns.

pub mod calendar;
mod id;
mod rule;
mod recurrence;
mod task;

pub use calendar::DateError;
pub use id::{IdError, TaskId};
pub use rule::{Field, MonthDays, Rule, RuleError, RuleKind, MAX_INTERVAL_DAYS};
pub use recurrence::{
    next_occurrence, next_occurrence_date, ErrorKind, RecurrenceError, MONTHLY_SEARCH_DAYS,
    WEEKLY_SEARCH_DAYS,
};
pub use task::{Completion, Task, TaskError};
