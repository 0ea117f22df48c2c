// View filtering on status and priority

use crate::error::ParseValueError;
use crate::models::{Priority, Status, Task};
use std::fmt;
use std::str::FromStr;

/// Either "all" or a single enum value that a field must equal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter<T> {
    #[default]
    All,
    Only(T),
}

impl<T: PartialEq> Filter<T> {
    /// Check whether a field value passes this filter
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Filter::All => true,
            Filter::Only(wanted) => wanted == value,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Filter::All)
    }
}

impl<T: fmt::Display> fmt::Display for Filter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::All => write!(f, "all"),
            Filter::Only(value) => write!(f, "{}", value),
        }
    }
}

impl<T: FromStr<Err = ParseValueError>> FromStr for Filter<T> {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(Filter::All);
        }
        s.parse().map(Filter::Only)
    }
}

impl<T> From<T> for Filter<T> {
    fn from(value: T) -> Self {
        Filter::Only(value)
    }
}

pub type StatusFilter = Filter<Status>;
pub type PriorityFilter = Filter<Priority>;

/// Conjunction of the status and priority filters
pub fn matches(task: &Task, status: &StatusFilter, priority: &PriorityFilter) -> bool {
    status.matches(&task.status) && priority.matches(&task.priority)
}
