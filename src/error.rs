// Error types for the task store

use rusqlite::ErrorCode;
use std::path::PathBuf;
use thiserror::Error;

/// Input rejected by `Store::add` before anything is written
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Task description cannot be empty")]
    EmptyDescription,

    #[error("Invalid due date: {0:?} (expected YYYY-MM-DD)")]
    InvalidDueDate(String),
}

/// Errors returned by store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A write violated a table constraint (e.g. an unknown status)
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Another process already owns the store file
    #[error("Task store is locked by another process: {}", .0.display())]
    Locked(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(rusqlite::Error),
}

impl StoreError {
    /// Check if this is a validation failure
    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::Validation(_))
    }

    /// Check if this is a constraint violation
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, StoreError::ConstraintViolation(_))
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(e, msg) if e.code == ErrorCode::ConstraintViolation => {
                StoreError::ConstraintViolation(msg.unwrap_or_else(|| e.to_string()))
            }
            other => StoreError::Sqlite(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
