// Snapshot persistence of the task collection into a key-value store

use crate::error::PersistenceError;
use crate::kv::{KvStore, validate_key};
use crate::models::{Task, TaskId};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Key the collection is stored under unless configured otherwise
pub const DEFAULT_KEY: &str = "todos";

/// Reads and writes the whole task collection as a single JSON array entry
pub struct Persistence<K: KvStore> {
    kv: K,
    key: String,
}

impl<K: KvStore> Persistence<K> {
    pub fn new(kv: K) -> Self {
        Self {
            kv,
            key: DEFAULT_KEY.to_string(),
        }
    }

    /// Use a custom entry key
    pub fn with_key(kv: K, key: impl Into<String>) -> Result<Self, PersistenceError> {
        let key = key.into();
        validate_key(&key)?;
        Ok(Self { kv, key })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn kv(&self) -> &K {
        &self.kv
    }

    pub fn into_inner(self) -> K {
        self.kv
    }

    /// Load the stored collection in its persisted order
    ///
    /// Never fails: an absent, unreadable or corrupt entry loads as an empty
    /// collection. Records that fail to decode are skipped, and a repeated id
    /// keeps its first occurrence.
    pub fn load(&self) -> Vec<Task> {
        let bytes = match self.kv.get(&self.key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!(key = %self.key, "No stored tasks, starting empty");
                return Vec::new();
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to read stored tasks, starting empty");
                return Vec::new();
            }
        };

        let values: Vec<Value> = match serde_json::from_slice(&bytes) {
            Ok(values) => values,
            Err(e) => {
                warn!(key = %self.key, error = %e, "Stored tasks are not a JSON array, starting empty");
                return Vec::new();
            }
        };

        let mut seen: HashSet<TaskId> = HashSet::new();
        let mut tasks = Vec::with_capacity(values.len());

        for (index, value) in values.into_iter().enumerate() {
            let task: Task = match serde_json::from_value(value) {
                Ok(task) => task,
                Err(e) => {
                    warn!(key = %self.key, index, error = %e, "Failed to parse task, skipping");
                    continue;
                }
            };

            if !seen.insert(task.id.clone()) {
                warn!(key = %self.key, index, id = %task.id, "Duplicate task id, skipping");
                continue;
            }

            tasks.push(task);
        }

        info!(key = %self.key, count = tasks.len(), "Loaded tasks");
        tasks
    }

    /// Overwrite the stored entry with the full collection
    pub fn save(&mut self, tasks: &[Task]) -> Result<(), PersistenceError> {
        let bytes = serde_json::to_vec(tasks)?;
        self.kv.put(&self.key, &bytes)?;
        debug!(key = %self.key, count = tasks.len(), bytes = bytes.len(), "Saved tasks");
        Ok(())
    }
}
