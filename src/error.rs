// Error types for persistence and value parsing

use std::path::PathBuf;
use thiserror::Error;

/// Failure to write (or prepare to write) the task collection to the backing store
///
/// Reads never produce this error: a missing or unreadable entry loads as an
/// empty collection.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("invalid store key {key:?}: {reason}")]
    InvalidKey { key: String, reason: &'static str },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to lock {path}: {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to encode tasks: {0}")]
    Encode(#[from] serde_json::Error),
}

impl PersistenceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PersistenceError::Io {
            path: path.into(),
            source,
        }
    }
}

/// A text value that does not name a member of one of the closed enums
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} {value:?} (expected one of: {expected})")]
pub struct ParseValueError {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static str,
}

impl ParseValueError {
    pub(crate) fn new(kind: &'static str, value: &str, expected: &'static str) -> Self {
        Self {
            kind,
            value: value.to_string(),
            expected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value_error_display() {
        let err = ParseValueError::new("priority", "urgent", "high, medium, low");
        assert_eq!(
            err.to_string(),
            "invalid priority \"urgent\" (expected one of: high, medium, low)"
        );
    }

    #[test]
    fn test_persistence_error_io_display() {
        let err = PersistenceError::io(
            "/tmp/todos.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("/tmp/todos.json"));
        assert!(err.to_string().contains("denied"));
    }
}
