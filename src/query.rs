// Derive filtered, sorted views of the task collection

use crate::error::ParseValueError;
use crate::filter::{self, PriorityFilter, StatusFilter};
use crate::models::Task;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Sort key for a view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    CreatedAt,
    #[default]
    DueDate,
    Priority,
    Status,
}

impl SortBy {
    pub fn as_str(self) -> &'static str {
        match self {
            SortBy::CreatedAt => "createdAt",
            SortBy::DueDate => "dueDate",
            SortBy::Priority => "priority",
            SortBy::Status => "status",
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SortBy {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "createdAt" => Ok(SortBy::CreatedAt),
            "dueDate" => Ok(SortBy::DueDate),
            "priority" => Ok(SortBy::Priority),
            "status" => Ok(SortBy::Status),
            other => Err(ParseValueError::new(
                "sort key",
                other,
                "createdAt, dueDate, priority, status",
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(ParseValueError::new("sort direction", other, "asc, desc")),
        }
    }
}

/// Filter and sort selection for a view
///
/// Defaults to all statuses, all priorities, sorted by due date ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewQuery {
    pub status: StatusFilter,
    pub priority: PriorityFilter,
    pub sort_by: SortBy,
    pub direction: SortDirection,
}

impl ViewQuery {
    pub fn new(status: StatusFilter, priority: PriorityFilter, sort_by: SortBy, direction: SortDirection) -> Self {
        Self {
            status,
            priority,
            sort_by,
            direction,
        }
    }

    /// True when at least one of the two filters is narrowing the view
    pub fn is_filtered(&self) -> bool {
        !self.status.is_all() || !self.priority.is_all()
    }
}

/// Base comparator for a sort key, before the direction is applied
///
/// Priority, status and creation time compare highest/newest first; due dates
/// compare chronologically. Undated tasks are handled in [`compare`].
fn compare_base(a: &Task, b: &Task, sort_by: SortBy) -> Ordering {
    match sort_by {
        SortBy::Priority => b.priority.rank().cmp(&a.priority.rank()),
        SortBy::Status => b.status.rank().cmp(&a.status.rank()),
        SortBy::DueDate => a.due_date.cmp(&b.due_date),
        SortBy::CreatedAt => b.created_at.cmp(&a.created_at),
    }
}

/// Compare two tasks for a sort key and direction
///
/// `Desc` negates the base comparator. Tasks without a due date always come
/// after dated tasks when sorting by due date, whatever the direction.
pub fn compare(a: &Task, b: &Task, sort_by: SortBy, direction: SortDirection) -> Ordering {
    if sort_by == SortBy::DueDate {
        match (a.due_date, b.due_date) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Greater,
            (Some(_), None) => return Ordering::Less,
            (Some(_), Some(_)) => {}
        }
    }

    let ordering = compare_base(a, b, sort_by);
    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

/// Build the filtered, sorted view of `tasks`
///
/// The input is left untouched. The sort is stable, so tasks that compare
/// equal stay in manual order.
pub fn view(tasks: &[Task], query: &ViewQuery) -> Vec<Task> {
    let mut out: Vec<Task> = tasks
        .iter()
        .filter(|task| filter::matches(task, &query.status, &query.priority))
        .cloned()
        .collect();

    out.sort_by(|a, b| compare(a, b, query.sort_by, query.direction));
    out
}

/// One-line description of a view, e.g.
/// `Showing 2 tasks with status "Pending", sorted by dueDate (asc)`
pub fn summary(count: usize, query: &ViewQuery) -> String {
    let mut text = format!("Showing {} task{}", count, if count == 1 { "" } else { "s" });

    if let filter::Filter::Only(status) = query.status {
        text.push_str(&format!(" with status \"{}\"", status.label()));
    }
    if let filter::Filter::Only(priority) = query.priority {
        text.push_str(&format!(" with priority \"{}\"", priority.label()));
    }

    text.push_str(&format!(", sorted by {} ({})", query.sort_by, query.direction));
    text
}
