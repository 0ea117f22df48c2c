// todostore - Ordered task list with filtering, sorting and key-value persistence

pub mod config;
pub mod controller;
pub mod error;
pub mod filter;
pub mod kv;
pub mod models;
pub mod persistence;
pub mod query;
pub mod store;

// Re-export main types for convenience
pub use config::{Backend, StoreConfig};
pub use controller::{Controller, ViewState};
pub use error::{ParseValueError, PersistenceError};
pub use filter::{Filter, PriorityFilter, StatusFilter};
pub use kv::{FileKv, KvStore, MemoryKv, SqliteKv};
pub use models::{NewTask, Priority, Status, Task, TaskId, TaskUpdate, now_ms};
pub use persistence::Persistence;
pub use query::{SortBy, SortDirection, ViewQuery, view};
pub use store::TaskStore;
