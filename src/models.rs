// Data models for tasktrack

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A single to-do item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub description: String,
    /// `YYYY-MM-DD`, or `None` when the task has no due date
    pub due_date: Option<String>,
    pub status: TaskStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "to-do")]
    Todo,
    #[serde(rename = "in-progress")]
    InProgress,
    #[serde(rename = "done")]
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done];

    /// The string stored in the `status` column
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Todo => "to-do",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Done => "done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown task status: {0:?} (expected to-do, in-progress or done)")]
pub struct UnknownStatus(pub String);

impl FromStr for TaskStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

impl ToSql for TaskStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TaskStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        s.parse().map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_str() {
        for status in TaskStatus::ALL {
            assert_eq!(status.as_str().parse::<TaskStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_status_rejects_unknown() {
        let err = "Terminé".parse::<TaskStatus>().unwrap_err();
        assert_eq!(err, UnknownStatus("Terminé".to_string()));
        assert!("Done".parse::<TaskStatus>().is_err());
        assert_eq!(
            err.to_string(),
            "unknown task status: \"Terminé\" (expected to-do, in-progress or done)"
        );
    }

    #[test]
    fn test_default_status_is_todo() {
        assert_eq!(TaskStatus::default(), TaskStatus::Todo);
    }

    #[test]
    fn test_task_serialization() {
        let task = Task {
            id: 7,
            description: "Buy milk".to_string(),
            due_date: Some("2025-05-01".to_string()),
            status: TaskStatus::InProgress,
        };

        let json = serde_json::to_string(&task).unwrap();
        assert_eq!(
            json,
            r#"{"id":7,"description":"Buy milk","due_date":"2025-05-01","status":"in-progress"}"#
        );
    }
}
