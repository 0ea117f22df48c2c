// Data models for todostore

use crate::error::ParseValueError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a task; never reused within a store
///
/// Stored ids are either integers or string tokens. Ids allocated by the store
/// are always numeric.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskId {
    Num(u64),
    Token(String),
}

impl TaskId {
    /// Numeric value, if this is a numeric id
    pub fn as_num(&self) -> Option<u64> {
        match self {
            TaskId::Num(n) => Some(*n),
            TaskId::Token(_) => None,
        }
    }
}

impl From<u64> for TaskId {
    fn from(n: u64) -> Self {
        TaskId::Num(n)
    }
}

impl From<&str> for TaskId {
    fn from(token: &str) -> Self {
        TaskId::Token(token.to_string())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskId::Num(n) => write!(f, "{}", n),
            TaskId::Token(token) => f.pad(token),
        }
    }
}

impl FromStr for TaskId {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseValueError::new("task id", s, "an integer or a non-empty token"));
        }
        Ok(s.parse().map(TaskId::Num).unwrap_or_else(|_| TaskId::Token(s.to_string())))
    }
}

/// A single to-do record
///
/// Serialized with the field names of the persisted layout:
/// `id`, `content`, `checked`, `priority`, `status`, `dueDate`, `createdAt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub content: String,
    pub checked: bool,
    pub priority: Priority,
    pub status: Status,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// True when the task has a due date strictly before `today`
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.due_date.is_some_and(|due| due < today)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    /// Sort rank: high=3, medium=2, low=1
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(ParseValueError::new("priority", other, "high, medium, low")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Status {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Pending, Status::InProgress, Status::Completed];

    /// Sort rank: completed=3, inProgress=2, pending=1
    pub fn rank(self) -> u8 {
        match self {
            Status::Completed => 3,
            Status::InProgress => 2,
            Status::Pending => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::InProgress => "inProgress",
            Status::Completed => "completed",
        }
    }

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            Status::Pending => "Pending",
            Status::InProgress => "In Progress",
            Status::Completed => "Completed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Status::Pending),
            "inProgress" => Ok(Status::InProgress),
            "completed" => Ok(Status::Completed),
            other => Err(ParseValueError::new("status", other, "pending, inProgress, completed")),
        }
    }
}

/// Payload for adding a task; id and creation time are assigned by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub content: String,
    pub priority: Priority,
    pub status: Status,
    pub due_date: Option<NaiveDate>,
}

impl NewTask {
    /// New pending, medium-priority task with no due date
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            priority: Priority::default(),
            status: Status::default(),
            due_date: None,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn with_due_date(mut self, due_date: Option<NaiveDate>) -> Self {
        self.due_date = due_date;
        self
    }
}

/// Full replacement of a task's editable fields
///
/// Not a patch: every field is written. `id`, `created_at` and `checked`
/// are kept from the existing task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskUpdate {
    pub content: String,
    pub priority: Priority,
    pub status: Status,
    pub due_date: Option<NaiveDate>,
}

impl From<&Task> for TaskUpdate {
    fn from(task: &Task) -> Self {
        Self {
            content: task.content.clone(),
            priority: task.priority,
            status: task.status,
            due_date: task.due_date,
        }
    }
}

/// Helper function to get current timestamp in milliseconds
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
