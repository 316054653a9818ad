//! SQLite task store
//!
//! Tasks live in a single `scheduler` table indexed by date. The schema is
//! versioned through `PRAGMA user_version` and created on first open; an
//! existing database with the same table layout is adopted as is.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use thiserror::Error;

use crate::domain::{calendar, Task, TaskId};

/// Text form accepted by [`TaskStore::list`] to search by date
const SEARCH_DATE_FORMAT: &str = "%d.%m.%Y";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Task not found: {0}")]
    NotFound(TaskId),

    #[error("Task has no ID")]
    MissingId,

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Store for task records
pub struct TaskStore {
    /// Path to the database file, `None` for in-memory stores
    path: Option<PathBuf>,

    /// Database connection
    conn: Connection,
}

impl TaskStore {
    /// Schema version - bump when the table layout changes
    const SCHEMA_VERSION: i32 = 1;

    /// Opens (creating if needed) the database at `path`
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open task database: {}", path.display()))?;

        let store = Self {
            path: Some(path.to_path_buf()),
            conn,
        };
        store.ensure_schema()?;

        Ok(store)
    }

    /// Opens a private in-memory store
    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            path: None,
            conn: Connection::open_in_memory()?,
        };
        store.ensure_schema()?;

        Ok(store)
    }

    /// Creates the table and index unless the schema is current
    fn ensure_schema(&self) -> Result<()> {
        let version: i32 = self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .optional()?
            .unwrap_or(0);

        if version == Self::SCHEMA_VERSION {
            return Ok(());
        }

        self.conn
            .execute_batch(
                "
                CREATE TABLE IF NOT EXISTS scheduler (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    date CHAR(8) NOT NULL DEFAULT '',
                    title VARCHAR(255) NOT NULL DEFAULT '',
                    comment TEXT NOT NULL DEFAULT '',
                    repeat VARCHAR(128) NOT NULL DEFAULT ''
                );

                CREATE INDEX IF NOT EXISTS idx_scheduler_date ON scheduler(date);
                ",
            )
            .context("Failed to create task schema")?;

        self.conn.execute(
            &format!("PRAGMA user_version = {}", Self::SCHEMA_VERSION),
            [],
        )?;

        Ok(())
    }

    /// Inserts a task and returns its new ID (any ID on `task` is ignored)
    pub fn add(&self, task: &Task) -> Result<TaskId> {
        self.conn.execute(
            "INSERT INTO scheduler (date, title, comment, repeat) VALUES (?1, ?2, ?3, ?4)",
            params![task.date, task.title, task.comment, task.repeat],
        )?;

        Ok(TaskId::new(self.conn.last_insert_rowid()))
    }

    /// Loads a task by ID
    pub fn get(&self, id: TaskId) -> Result<Task> {
        let task = self
            .conn
            .query_row(
                "SELECT id, date, title, comment, repeat FROM scheduler WHERE id = ?1",
                params![id.get()],
                task_from_row,
            )
            .optional()?;

        task.ok_or_else(|| StoreError::NotFound(id).into())
    }

    /// Overwrites all fields of a saved task
    pub fn update(&self, task: &Task) -> Result<()> {
        let id = task.id.ok_or(StoreError::MissingId)?;

        let changed = self.conn.execute(
            "UPDATE scheduler SET date = ?1, title = ?2, comment = ?3, repeat = ?4 WHERE id = ?5",
            params![task.date, task.title, task.comment, task.repeat, id.get()],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound(id).into());
        }
        Ok(())
    }

    /// Moves a task to a new date
    pub fn update_date(&self, id: TaskId, date: &str) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE scheduler SET date = ?1 WHERE id = ?2",
            params![date, id.get()],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound(id).into());
        }
        Ok(())
    }

    /// Deletes a task
    pub fn delete(&self, id: TaskId) -> Result<()> {
        let changed = self
            .conn
            .execute("DELETE FROM scheduler WHERE id = ?1", params![id.get()])?;

        if changed == 0 {
            return Err(StoreError::NotFound(id).into());
        }
        Ok(())
    }

    /// Lists up to `limit` tasks ordered by date
    ///
    /// `search` narrows the result: a `DD.MM.YYYY` date selects tasks due on
    /// that day, any other non-empty text matches title or comment.
    pub fn list(&self, limit: usize, search: &str) -> Result<Vec<Task>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let search = search.trim();

        let mut tasks = Vec::new();

        if search.is_empty() {
            let mut stmt = self.conn.prepare(
                "SELECT id, date, title, comment, repeat FROM scheduler
                 ORDER BY date, id LIMIT ?1",
            )?;
            for row in stmt.query_map(params![limit], task_from_row)? {
                tasks.push(row?);
            }
        } else if let Ok(date) = NaiveDate::parse_from_str(search, SEARCH_DATE_FORMAT) {
            let mut stmt = self.conn.prepare(
                "SELECT id, date, title, comment, repeat FROM scheduler
                 WHERE date = ?1 ORDER BY id LIMIT ?2",
            )?;
            let date = calendar::format_date(date);
            for row in stmt.query_map(params![date, limit], task_from_row)? {
                tasks.push(row?);
            }
        } else {
            let mut stmt = self.conn.prepare(
                "SELECT id, date, title, comment, repeat FROM scheduler
                 WHERE title LIKE ?1 ESCAPE '\\' OR comment LIKE ?1 ESCAPE '\\'
                 ORDER BY date, id LIMIT ?2",
            )?;
            let pattern = format!("%{}%", escape_like(search));
            for row in stmt.query_map(params![pattern, limit], task_from_row)? {
                tasks.push(row?);
            }
        }

        Ok(tasks)
    }

    /// Returns the path to the database file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: Some(TaskId::new(row.get(0)?)),
        date: row.get(1)?,
        title: row.get(2)?,
        comment: row.get(3)?,
        repeat: row.get(4)?,
    })
}

/// Escapes LIKE wildcards so search text matches literally
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_task(date: &str, title: &str) -> Task {
        Task {
            date: date.to_string(),
            ..Task::new(title)
        }
    }

    fn not_found(err: &anyhow::Error) -> bool {
        matches!(err.downcast_ref::<StoreError>(), Some(StoreError::NotFound(_)))
    }

    #[test]
    fn test_store_creation_on_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("scheduler.db");

        let store = TaskStore::open(&path).unwrap();
        assert_eq!(store.path(), Some(path.as_path()));
        assert!(path.exists());
    }

    #[test]
    fn test_reopen_keeps_tasks() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scheduler.db");

        let id = {
            let store = TaskStore::open(&path).unwrap();
            store.add(&make_task("20240101", "Persisted")).unwrap()
        };

        let store = TaskStore::open(&path).unwrap();
        assert_eq!(store.get(id).unwrap().title, "Persisted");
    }

    #[test]
    fn test_add_and_get() {
        let store = TaskStore::open_in_memory().unwrap();
        let mut task = make_task("20240105", "Pay rent");
        task.comment = "bank transfer".to_string();
        task.repeat = "m 5".to_string();

        let id = store.add(&task).unwrap();
        let loaded = store.get(id).unwrap();

        assert_eq!(loaded.id, Some(id));
        assert_eq!(loaded.date, "20240105");
        assert_eq!(loaded.title, "Pay rent");
        assert_eq!(loaded.comment, "bank transfer");
        assert_eq!(loaded.repeat, "m 5");
    }

    #[test]
    fn test_ids_are_distinct() {
        let store = TaskStore::open_in_memory().unwrap();
        let a = store.add(&make_task("20240101", "A")).unwrap();
        let b = store.add(&make_task("20240101", "B")).unwrap();

        assert_ne!(a, b);
    }

    #[test]
    fn test_get_missing() {
        let store = TaskStore::open_in_memory().unwrap();
        let err = store.get(TaskId::new(99)).unwrap_err();

        assert!(not_found(&err));
    }

    #[test]
    fn test_update() {
        let store = TaskStore::open_in_memory().unwrap();
        let id = store.add(&make_task("20240101", "Draft")).unwrap();

        let mut task = store.get(id).unwrap();
        task.title = "Final".to_string();
        task.date = "20240202".to_string();
        store.update(&task).unwrap();

        let loaded = store.get(id).unwrap();
        assert_eq!(loaded.title, "Final");
        assert_eq!(loaded.date, "20240202");
    }

    #[test]
    fn test_update_missing_and_unsaved() {
        let store = TaskStore::open_in_memory().unwrap();

        let mut task = make_task("20240101", "Ghost");
        let err = store.update(&task).unwrap_err();
        assert!(matches!(err.downcast_ref::<StoreError>(), Some(StoreError::MissingId)));

        task.id = Some(TaskId::new(42));
        assert!(not_found(&store.update(&task).unwrap_err()));
        assert!(not_found(&store.update_date(TaskId::new(42), "20240101").unwrap_err()));
    }

    #[test]
    fn test_update_date() {
        let store = TaskStore::open_in_memory().unwrap();
        let id = store.add(&make_task("20240101", "Move me")).unwrap();

        store.update_date(id, "20240301").unwrap();
        assert_eq!(store.get(id).unwrap().date, "20240301");
    }

    #[test]
    fn test_delete() {
        let store = TaskStore::open_in_memory().unwrap();
        let id = store.add(&make_task("20240101", "Gone")).unwrap();

        store.delete(id).unwrap();
        assert!(not_found(&store.get(id).unwrap_err()));
        assert!(not_found(&store.delete(id).unwrap_err()));
    }

    #[test]
    fn test_list_orders_by_date_and_limits() {
        let store = TaskStore::open_in_memory().unwrap();
        store.add(&make_task("20240301", "Third")).unwrap();
        store.add(&make_task("20240101", "First")).unwrap();
        store.add(&make_task("20240201", "Second")).unwrap();

        let titles: Vec<_> = store
            .list(50, "")
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["First", "Second", "Third"]);

        assert_eq!(store.list(2, "").unwrap().len(), 2);
    }

    #[test]
    fn test_list_search_text() {
        let store = TaskStore::open_in_memory().unwrap();
        store.add(&make_task("20240101", "Buy milk")).unwrap();
        let mut gym = make_task("20240102", "Gym");
        gym.comment = "bring milk shake".to_string();
        store.add(&gym).unwrap();
        store.add(&make_task("20240103", "Read book")).unwrap();

        let found = store.list(50, "milk").unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].title, "Buy milk");
        assert_eq!(found[1].title, "Gym");
    }

    #[test]
    fn test_list_search_is_literal() {
        let store = TaskStore::open_in_memory().unwrap();
        store.add(&make_task("20240101", "100% done")).unwrap();
        store.add(&make_task("20240101", "1000 steps")).unwrap();

        let found = store.list(50, "100%").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "100% done");
    }

    #[test]
    fn test_list_search_by_date() {
        let store = TaskStore::open_in_memory().unwrap();
        store.add(&make_task("20240308", "Flowers")).unwrap();
        store.add(&make_task("20240309", "Cake")).unwrap();

        let found = store.list(50, "08.03.2024").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Flowers");
    }
}
