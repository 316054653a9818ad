//! Scheduler - a local task planner with recurring reminders
//!
//! Tasks carry a due date and an optional repeat rule. The rule engine in
//! [`domain`] computes the next due date deterministically from the start
//! date, the rule and an explicit "today".

pub mod domain;
pub mod storage;
pub mod cli;

pub use domain::{next_occurrence, RecurrenceError, Rule, Task, TaskId};
