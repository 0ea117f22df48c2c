// Ordered task collection with persistence on every mutation

use crate::error::PersistenceError;
use crate::kv::KvStore;
use crate::models::{NewTask, Status, Task, TaskId, TaskUpdate, now_ms};
use crate::persistence::Persistence;
use crate::query::{self, ViewQuery};
use chrono::Utc;
use tracing::{debug, info, warn};

/// Owns the task collection in manual order and persists it after each change
///
/// Mutations that do nothing (empty or duplicate content, unknown id,
/// out-of-range index) are not errors: they return `None`/`false` and skip the
/// write. A mutation that does change the collection is written through
/// before it becomes visible; if the write fails the collection is unchanged.
pub struct TaskStore<K: KvStore> {
    tasks: Vec<Task>,
    persistence: Persistence<K>,
    last_id: u64,
}

impl<K: KvStore> TaskStore<K> {
    /// Open a store, loading any previously persisted collection
    pub fn open(persistence: Persistence<K>) -> Self {
        let tasks = persistence.load();
        let last_id = tasks.iter().filter_map(|t| t.id.as_num()).max().unwrap_or(0);

        info!(count = tasks.len(), "Opened task store");

        Self {
            tasks,
            persistence,
            last_id,
        }
    }

    /// Current collection in manual order
    pub fn snapshot(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn persistence(&self) -> &Persistence<K> {
        &self.persistence
    }

    /// Filtered, sorted view of the current collection
    pub fn view(&self, query: &ViewQuery) -> Vec<Task> {
        query::view(&self.tasks, query)
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Append a new task
    ///
    /// Returns the new id, or `None` when the content is empty or another task
    /// already has exactly the same content.
    pub fn add(&mut self, new: NewTask) -> Result<Option<TaskId>, PersistenceError> {
        if new.content.is_empty() {
            debug!("add: empty content, ignoring");
            return Ok(None);
        }
        if self.tasks.iter().any(|t| t.content == new.content) {
            debug!(content = %new.content, "add: duplicate content, ignoring");
            return Ok(None);
        }

        let Some(id) = self.peek_next_id() else {
            warn!(last_id = self.last_id, "add: numeric ids exhausted, ignoring");
            return Ok(None);
        };
        let task = Task {
            id: TaskId::Num(id),
            content: new.content,
            checked: false,
            priority: new.priority,
            status: new.status,
            due_date: new.due_date,
            created_at: Utc::now(),
        };

        let mut next = self.tasks.clone();
        next.push(task);
        self.commit(next)?;
        self.last_id = id;

        debug!(id, "add: task added");
        Ok(Some(TaskId::Num(id)))
    }

    /// Remove a task; returns false if no task has `id`
    pub fn delete(&mut self, id: &TaskId) -> Result<bool, PersistenceError> {
        let Some(index) = self.position(id) else {
            debug!(%id, "delete: no such task");
            return Ok(false);
        };

        let mut next = self.tasks.clone();
        next.remove(index);
        self.commit(next)?;

        debug!(%id, "delete: task removed");
        Ok(true)
    }

    /// Replace the editable fields of a task
    ///
    /// Content uniqueness is not checked here. Empty content is rejected so a
    /// task never ends up blank.
    pub fn update(&mut self, id: &TaskId, fields: TaskUpdate) -> Result<bool, PersistenceError> {
        let Some(index) = self.position(id) else {
            debug!(%id, "update: no such task");
            return Ok(false);
        };
        if fields.content.is_empty() {
            debug!(%id, "update: empty content, ignoring");
            return Ok(false);
        }

        let mut next = self.tasks.clone();
        let task = &mut next[index];
        task.content = fields.content;
        task.priority = fields.priority;
        task.status = fields.status;
        task.due_date = fields.due_date;
        self.commit(next)?;

        debug!(%id, "update: task replaced");
        Ok(true)
    }

    /// Flip `checked`, moving status to completed or back to pending
    pub fn toggle_checked(&mut self, id: &TaskId) -> Result<bool, PersistenceError> {
        let Some(index) = self.position(id) else {
            debug!(%id, "toggle: no such task");
            return Ok(false);
        };

        let mut next = self.tasks.clone();
        let task = &mut next[index];
        task.checked = !task.checked;
        task.status = if task.checked { Status::Completed } else { Status::Pending };
        self.commit(next)?;

        debug!(%id, "toggle: task toggled");
        Ok(true)
    }

    /// Move the task at `from` to `to` in the manual order
    ///
    /// Intervening tasks shift by one. Returns false for out-of-range indices
    /// or when `from == to`.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<bool, PersistenceError> {
        let len = self.tasks.len();
        if from >= len || to >= len || from == to {
            debug!(from, to, len, "reorder: nothing to move");
            return Ok(false);
        }

        let mut next = self.tasks.clone();
        let task = next.remove(from);
        next.insert(to, task);
        self.commit(next)?;

        debug!(from, to, "reorder: task moved");
        Ok(true)
    }

    /// Move a task using positions in the view produced by `query`
    ///
    /// The displayed indices are mapped onto the backing collection: the moved
    /// task lands directly after the displayed target when moving down and
    /// directly before it when moving up. Tasks hidden by the filter keep their
    /// relative order.
    pub fn reorder_within(&mut self, query: &ViewQuery, from: usize, to: usize) -> Result<bool, PersistenceError> {
        let shown = self.view(query);
        if from >= shown.len() || to >= shown.len() || from == to {
            debug!(from, to, shown = shown.len(), "reorder_within: nothing to move");
            return Ok(false);
        }

        let moved_id = &shown[from].id;
        let target_id = &shown[to].id;

        let mut next = self.tasks.clone();
        let Some(moved_index) = next.iter().position(|t| &t.id == moved_id) else {
            return Ok(false);
        };
        let task = next.remove(moved_index);

        let Some(target_index) = next.iter().position(|t| &t.id == target_id) else {
            return Ok(false);
        };
        let insert_at = if from < to { target_index + 1 } else { target_index };
        next.insert(insert_at, task);

        if next == self.tasks {
            debug!(from, to, "reorder_within: manual order unchanged");
            return Ok(false);
        }
        self.commit(next)?;

        debug!(%moved_id, %target_id, "reorder_within: task moved");
        Ok(true)
    }

    /// Remove every task; returns false if the store was already empty
    pub fn clear(&mut self) -> Result<bool, PersistenceError> {
        if self.tasks.is_empty() {
            return Ok(false);
        }

        let count = self.tasks.len();
        self.commit(Vec::new())?;

        info!(count, "clear: removed all tasks");
        Ok(true)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn position(&self, id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| &t.id == id)
    }

    /// Next id: the current time in ms, bumped past anything already issued
    ///
    /// `None` once the largest issued id is `u64::MAX`.
    fn peek_next_id(&self) -> Option<u64> {
        let now = u64::try_from(now_ms()).unwrap_or(0);
        self.last_id.checked_add(1).map(|next| now.max(next))
    }

    /// Persist `next` and only then make it the current collection
    fn commit(&mut self, next: Vec<Task>) -> Result<(), PersistenceError> {
        self.persistence.save(&next)?;
        self.tasks = next;
        Ok(())
    }
}
