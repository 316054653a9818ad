//! Task CLI commands

use anyhow::Result;
use clap::Subcommand;

use super::output::Output;
use super::session::Session;
use crate::domain::{Completion, Task, TaskId};

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Add a task
    ///
    /// Examples:
    ///   sched task add "Dentist" --date 20240312
    ///   sched task add "Pay rent" --repeat "m 1"
    ///   sched task add "Standup" --repeat "w 1,2,3,4,5" --comment "room 4"
    Add {
        /// Task title
        title: String,

        /// Due date (YYYYMMDD, defaults to today)
        #[arg(long, short)]
        date: Option<String>,

        /// Free-text comment
        #[arg(long, short)]
        comment: Option<String>,

        /// Repeat rule (y | d <n> | w <days> | m <days> [<months>])
        #[arg(long, short)]
        repeat: Option<String>,
    },

    /// Show task details
    Show {
        /// Task ID
        id: String,
    },

    /// Change a task (omitted fields keep their value)
    Update {
        /// Task ID
        id: String,

        /// New title
        #[arg(long, short)]
        title: Option<String>,

        /// New due date (YYYYMMDD)
        #[arg(long, short)]
        date: Option<String>,

        /// New comment
        #[arg(long, short)]
        comment: Option<String>,

        /// New repeat rule (empty string clears it)
        #[arg(long, short)]
        repeat: Option<String>,
    },

    /// Delete a task
    Delete {
        /// Task ID
        id: String,
    },

    /// Mark a task done: one-shot tasks are deleted, recurring tasks move on
    Done {
        /// Task ID
        id: String,
    },
}

pub fn run(cmd: TaskCommands, session: &Session, output: &Output) -> Result<()> {
    match cmd {
        TaskCommands::Add {
            title,
            date,
            comment,
            repeat,
        } => {
            let task = Task {
                id: None,
                date: date.unwrap_or_default(),
                title,
                comment: comment.unwrap_or_default(),
                repeat: repeat.unwrap_or_default(),
            };
            add_task(session, output, task)
        }
        TaskCommands::Show { id } => show_task(session, output, &id),
        TaskCommands::Update {
            id,
            title,
            date,
            comment,
            repeat,
        } => {
            let changes = TaskChanges {
                title,
                date,
                comment,
                repeat,
            };
            update_task(session, output, &id, changes)
        }
        TaskCommands::Delete { id } => delete_task(session, output, &id),
        TaskCommands::Done { id } => complete_task(session, output, &id),
    }
}

fn add_task(session: &Session, output: &Output, mut task: Task) -> Result<()> {
    task.validate()?;
    task.schedule(session.today())?;
    output.verbose_ctx("task", &format!("Scheduled '{}' on {}", task.title, task.date));

    let store = session.store()?;
    let id = store.add(&task)?;
    task.id = Some(id);

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": id,
            "date": task.date,
        }))?;
    } else {
        output.success(&format!("Created task: {} - {} ({})", id, task.title, task.date));
    }

    Ok(())
}

fn show_task(session: &Session, output: &Output, id_str: &str) -> Result<()> {
    let id: TaskId = id_str.parse()?;
    let task = session.store()?.get(id)?;

    if output.is_json() {
        output.data(&task)?;
    } else {
        println!("Task: {}", id);
        println!("Title: {}", task.title);
        println!("Date: {}", task.date);
        if task.is_recurring() {
            println!("Repeat: {}", task.repeat);
        } else {
            println!("Repeat: none");
        }

        if !task.comment.is_empty() {
            println!("\nComment:");
            println!("{}", task.comment);
        }
    }

    Ok(())
}

/// Fields passed to `task update`; `None` keeps the stored value
struct TaskChanges {
    title: Option<String>,
    date: Option<String>,
    comment: Option<String>,
    repeat: Option<String>,
}

impl TaskChanges {
    fn apply(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(date) = self.date {
            task.date = date;
        }
        if let Some(comment) = self.comment {
            task.comment = comment;
        }
        if let Some(repeat) = self.repeat {
            task.repeat = repeat;
        }
    }
}

fn update_task(
    session: &Session,
    output: &Output,
    id_str: &str,
    changes: TaskChanges,
) -> Result<()> {
    let id: TaskId = id_str.parse()?;
    let store = session.store()?;
    let mut task = store.get(id)?;

    changes.apply(&mut task);

    task.validate()?;
    task.schedule(session.today())?;
    store.update(&task)?;
    output.verbose_ctx("task", &format!("Task {} now due {}", id, task.date));

    if output.is_json() {
        output.data(&task)?;
    } else {
        output.success(&format!("Updated task: {} ({})", id, task.date));
    }

    Ok(())
}

fn delete_task(session: &Session, output: &Output, id_str: &str) -> Result<()> {
    let id: TaskId = id_str.parse()?;
    session.store()?.delete(id)?;

    output.success(&format!("Deleted task: {}", id));
    Ok(())
}

fn complete_task(session: &Session, output: &Output, id_str: &str) -> Result<()> {
    let id: TaskId = id_str.parse()?;
    let store = session.store()?;
    let task = store.get(id)?;

    let completion = task.complete(session.today())?;
    output.verbose_ctx("task", &format!("Completing task {}: {:?}", id, completion));

    let next_date = match &completion {
        Completion::Remove => {
            store.delete(id)?;
            None
        }
        Completion::Reschedule(next) => {
            store.update_date(id, next)?;
            Some(next.as_str())
        }
    };

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": id,
            "removed": next_date.is_none(),
            "next_date": next_date,
        }))?;
    } else {
        match next_date {
            Some(next) => output.success(&format!("Completed task: {}, next on {}", id, next)),
            None => output.success(&format!("Completed task: {} (removed)", id)),
        }
    }

    Ok(())
}
