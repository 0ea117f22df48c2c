// Selection state and user actions over a TaskStore

use crate::error::PersistenceError;
use crate::filter::{PriorityFilter, StatusFilter};
use crate::kv::KvStore;
use crate::models::{NewTask, Task, TaskId, TaskUpdate};
use crate::query::{self, SortBy, SortDirection, ViewQuery};
use crate::store::TaskStore;

/// What the presentation layer gets to draw
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub tasks: Vec<Task>,
    pub summary: String,
}

/// Holds the current filter/sort selection and forwards actions to the store
pub struct Controller<K: KvStore> {
    store: TaskStore<K>,
    selection: ViewQuery,
}

impl<K: KvStore> Controller<K> {
    pub fn new(store: TaskStore<K>) -> Self {
        Self::with_selection(store, ViewQuery::default())
    }

    pub fn with_selection(store: TaskStore<K>, selection: ViewQuery) -> Self {
        Self { store, selection }
    }

    pub fn store(&self) -> &TaskStore<K> {
        &self.store
    }

    pub fn into_store(self) -> TaskStore<K> {
        self.store
    }

    // ========================================================================
    // Selection
    // ========================================================================

    pub fn selection(&self) -> &ViewQuery {
        &self.selection
    }

    pub fn select(&mut self, selection: ViewQuery) {
        self.selection = selection;
    }

    pub fn set_filter_status(&mut self, status: StatusFilter) {
        self.selection.status = status;
    }

    pub fn set_filter_priority(&mut self, priority: PriorityFilter) {
        self.selection.priority = priority;
    }

    pub fn set_sort_by(&mut self, sort_by: SortBy) {
        self.selection.sort_by = sort_by;
    }

    pub fn set_sort_direction(&mut self, direction: SortDirection) {
        self.selection.direction = direction;
    }

    // ========================================================================
    // Actions
    // ========================================================================

    pub fn add_task(&mut self, payload: NewTask) -> Result<Option<TaskId>, PersistenceError> {
        self.store.add(payload)
    }

    pub fn delete_task(&mut self, id: &TaskId) -> Result<bool, PersistenceError> {
        self.store.delete(id)
    }

    pub fn update_task(&mut self, id: &TaskId, fields: TaskUpdate) -> Result<bool, PersistenceError> {
        self.store.update(id, fields)
    }

    pub fn toggle_task(&mut self, id: &TaskId) -> Result<bool, PersistenceError> {
        self.store.toggle_checked(id)
    }

    /// Move a task between two positions of the currently displayed view
    pub fn reorder_task(&mut self, from: usize, to: usize) -> Result<bool, PersistenceError> {
        let selection = self.selection;
        self.store.reorder_within(&selection, from, to)
    }

    pub fn clear_all(&mut self) -> Result<bool, PersistenceError> {
        self.store.clear()
    }

    // ========================================================================
    // Views
    // ========================================================================

    /// View for an explicit selection, ignoring the stored one
    pub fn get_view(&self, query: &ViewQuery) -> Vec<Task> {
        self.store.view(query)
    }

    /// View for the current selection
    pub fn view(&self) -> Vec<Task> {
        self.store.view(&self.selection)
    }

    pub fn summary(&self) -> String {
        query::summary(self.view().len(), &self.selection)
    }

    /// Recompute the view and its summary for the current selection
    pub fn refresh(&self) -> ViewState {
        let tasks = self.view();
        let summary = query::summary(tasks.len(), &self.selection);
        ViewState { tasks, summary }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Filter;
    use crate::kv::MemoryKv;
    use crate::models::{Priority, Status};
    use crate::persistence::Persistence;

    fn controller() -> Controller<MemoryKv> {
        Controller::new(TaskStore::open(Persistence::new(MemoryKv::new())))
    }

    fn contents(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.content.as_str()).collect()
    }

    #[test]
    fn test_priority_view_scenario() {
        let mut ctl = controller();
        ctl.add_task(NewTask::new("A").with_priority(Priority::High)).unwrap();
        ctl.add_task(NewTask::new("B").with_priority(Priority::Low)).unwrap();

        let query = ViewQuery::new(Filter::All, Filter::All, SortBy::Priority, SortDirection::Asc);
        assert_eq!(contents(&ctl.get_view(&query)), vec!["A", "B"]);
    }

    #[test]
    fn test_clear_all_scenario() {
        let mut ctl = controller();
        ctl.add_task(NewTask::new("A")).unwrap();
        ctl.add_task(NewTask::new("B")).unwrap();

        assert!(ctl.clear_all().unwrap());
        assert!(ctl.store().snapshot().is_empty());
        assert!(ctl.store().persistence().load().is_empty());
    }

    #[test]
    fn test_selection_drives_view_and_summary() {
        let mut ctl = controller();
        ctl.add_task(NewTask::new("A").with_priority(Priority::High)).unwrap();
        ctl.add_task(NewTask::new("B").with_status(Status::InProgress)).unwrap();
        ctl.add_task(NewTask::new("C").with_priority(Priority::High)).unwrap();

        assert_eq!(ctl.summary(), "Showing 3 tasks, sorted by dueDate (asc)");

        ctl.set_filter_priority(Filter::Only(Priority::High));
        ctl.set_sort_by(SortBy::Status);
        ctl.set_sort_direction(SortDirection::Desc);

        let state = ctl.refresh();
        assert_eq!(contents(&state.tasks), vec!["A", "C"]);
        assert_eq!(
            state.summary,
            "Showing 2 tasks with priority \"High\", sorted by status (desc)"
        );

        ctl.set_filter_status(Filter::Only(Status::Completed));
        assert_eq!(ctl.refresh().summary, "Showing 0 tasks with status \"Completed\" with priority \"High\", sorted by status (desc)");
    }

    #[test]
    fn test_actions_forward_to_store() {
        let mut ctl = controller();
        let id = ctl.add_task(NewTask::new("A")).unwrap().unwrap();
        assert_eq!(ctl.add_task(NewTask::new("A")).unwrap(), None);

        assert!(ctl.toggle_task(&id).unwrap());
        assert_eq!(ctl.store().get(&id).unwrap().status, Status::Completed);

        let mut fields = TaskUpdate::from(ctl.store().get(&id).unwrap());
        fields.content = "A2".to_string();
        assert!(ctl.update_task(&id, fields).unwrap());
        assert_eq!(ctl.store().get(&id).unwrap().content, "A2");

        assert!(ctl.delete_task(&id).unwrap());
        assert!(!ctl.delete_task(&id).unwrap());
        assert!(ctl.store().is_empty());
    }

    #[test]
    fn test_reorder_task_uses_displayed_positions() {
        let mut ctl = controller();
        ctl.add_task(NewTask::new("A").with_status(Status::Pending)).unwrap();
        ctl.add_task(NewTask::new("B").with_status(Status::InProgress)).unwrap();
        ctl.add_task(NewTask::new("C").with_status(Status::Pending)).unwrap();

        ctl.set_filter_status(Filter::Only(Status::Pending));
        assert_eq!(contents(&ctl.view()), vec!["A", "C"]);

        assert!(ctl.reorder_task(1, 0).unwrap());
        assert_eq!(contents(&ctl.view()), vec!["C", "A"]);
        assert_eq!(contents(ctl.store().snapshot()), vec!["C", "A", "B"]);

        assert!(!ctl.reorder_task(0, 2).unwrap());
    }
}
