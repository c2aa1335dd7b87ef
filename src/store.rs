// SQLite-backed task store

use crate::error::{Result, StoreError, ValidationError};
use crate::models::{Task, TaskStatus};
use chrono::NaiveDate;
use fs2::FileExt;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

const TASK_COLUMNS: &str = "id, description, due_date, status";

/// Persistent task store
///
/// Owns the SQLite connection for its whole lifetime. File-backed stores also
/// hold an exclusive lock on the sibling file `<file>.lock`, released when the
/// store is dropped or closed. The lock file itself is left on disk and reused
/// by the next open.
pub struct Store {
    db: Connection,
    // Declared after `db` so the connection closes before the lock is released
    #[allow(dead_code)]
    lock: Option<File>,
}

impl Store {
    /// Open or create a store backed by the SQLite file at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let lock = Self::acquire_lock(path)?;
        let db = Connection::open(path)?;

        let store = Self { db, lock: Some(lock) };
        store.init_schema()?;

        info!(path = %path.display(), "Opened task store");
        Ok(store)
    }

    /// Open an ephemeral store that lives only as long as the returned value
    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            db: Connection::open_in_memory()?,
            lock: None,
        };
        store.init_schema()?;

        debug!("Opened in-memory task store");
        Ok(store)
    }

    /// Close the connection and release the file lock
    pub fn close(self) -> Result<()> {
        self.db.close().map_err(|(_, e)| StoreError::from(e))?;
        Ok(())
    }

    /// Create the `tasks` table if it does not exist
    ///
    /// Safe to call any number of times; existing rows are never touched.
    pub fn init_schema(&self) -> Result<()> {
        debug!("Ensuring tasks schema");

        self.db.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                description TEXT NOT NULL CHECK (description <> ''),
                due_date TEXT,
                status TEXT NOT NULL DEFAULT 'to-do'
                    CHECK (status IN ('to-do', 'in-progress', 'done'))
            );
            "#,
        )?;

        Ok(())
    }

    // ========================================================================
    // Task operations
    // ========================================================================

    /// Add a task with the default `to-do` status and return its id
    ///
    /// An empty `due_date` means the task has no due date.
    pub fn add(&mut self, description: &str, due_date: &str) -> Result<i64> {
        self.add_with_status(description, due_date, TaskStatus::default())
    }

    /// Add a task with an explicit initial status and return its id
    pub fn add_with_status(&mut self, description: &str, due_date: &str, status: TaskStatus) -> Result<i64> {
        Self::validate_description(description)?;
        Self::validate_due_date(due_date)?;

        let due_date = (!due_date.is_empty()).then_some(due_date);

        self.db.execute(
            "INSERT INTO tasks (description, due_date, status) VALUES (?1, ?2, ?3)",
            params![description, due_date, status],
        )?;
        let id = self.db.last_insert_rowid();

        debug!(id, ?due_date, %status, "add: inserted task");
        Ok(id)
    }

    /// Get a task by id
    pub fn get(&self, id: i64) -> Result<Option<Task>> {
        let task = self
            .db
            .query_row(
                &format!("SELECT {} FROM tasks WHERE id = ?1", TASK_COLUMNS),
                [id],
                task_from_row,
            )
            .optional()?;

        Ok(task)
    }

    /// List every task, earliest due date first
    ///
    /// Tasks without a due date are stored as NULL, which SQLite orders
    /// before any date, so they come first. Equal dates keep insertion order.
    pub fn list(&self) -> Result<Vec<Task>> {
        let mut stmt = self.db.prepare(&format!(
            "SELECT {} FROM tasks ORDER BY due_date ASC, id ASC",
            TASK_COLUMNS
        ))?;

        let tasks = stmt
            .query_map([], task_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        debug!(count = tasks.len(), "list: loaded tasks");
        Ok(tasks)
    }

    /// Number of stored tasks
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self.db.query_row("SELECT COUNT(*) FROM tasks", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Set the status of a task
    ///
    /// `new_status` is checked only by the table constraint, so a value
    /// outside `to-do`/`in-progress`/`done` fails with
    /// [`StoreError::ConstraintViolation`]. An unknown id is a no-op.
    pub fn update_status(&mut self, id: i64, new_status: &str) -> Result<()> {
        let changed = self
            .db
            .execute("UPDATE tasks SET status = ?1 WHERE id = ?2", params![new_status, id])?;

        if changed == 0 {
            debug!(id, new_status, "update_status: no task with this id");
        } else {
            debug!(id, new_status, "update_status: updated task");
        }
        Ok(())
    }

    /// Permanently remove a task; an unknown id is a no-op
    pub fn delete(&mut self, id: i64) -> Result<()> {
        let changed = self.db.execute("DELETE FROM tasks WHERE id = ?1", [id])?;

        if changed == 0 {
            debug!(id, "delete: no task with this id");
        } else {
            debug!(id, "delete: removed task");
        }
        Ok(())
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    fn acquire_lock(db_path: &Path) -> Result<File> {
        let mut lock_name = db_path.as_os_str().to_owned();
        lock_name.push(".lock");
        let lock_path = PathBuf::from(lock_name);

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(file),
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => Err(StoreError::Locked(db_path.to_path_buf())),
            Err(e) => Err(e.into()),
        }
    }

    fn validate_description(description: &str) -> std::result::Result<(), ValidationError> {
        if description.is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        Ok(())
    }

    /// Accept an empty string or exactly `YYYY-MM-DD` naming a real date
    fn validate_due_date(due_date: &str) -> std::result::Result<(), ValidationError> {
        if due_date.is_empty() {
            return Ok(());
        }

        // chrono alone accepts unpadded fields like 2025-5-1
        let bytes = due_date.as_bytes();
        let well_formed = bytes.len() == 10
            && bytes.iter().enumerate().all(|(i, b)| match i {
                4 | 7 => *b == b'-',
                _ => b.is_ascii_digit(),
            });

        if !well_formed || NaiveDate::parse_from_str(due_date, DUE_DATE_FORMAT).is_err() {
            return Err(ValidationError::InvalidDueDate(due_date.to_string()));
        }
        Ok(())
    }
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        description: row.get(1)?,
        due_date: row.get(2)?,
        status: row.get(3)?,
    })
}
