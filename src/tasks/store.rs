//! The local task collection and its reconciliation primitives.
//!
//! Every change to the client's view of the task list goes through one of
//! four operations: [`TaskListStore::replace_all`] after a refetch, and
//! [`TaskListStore::apply_create`], [`TaskListStore::apply_update`] and
//! [`TaskListStore::apply_delete`] for confirmations and push events. Each
//! keeps the identifier unique and tolerates the same event arriving twice
//! or arriving for a task the store has never seen.

use crate::tasks::models::{Task, TaskId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Where newly created tasks are placed in the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertPosition {
    /// Newest first.
    #[default]
    Front,
    /// Oldest first.
    Back,
}

/// Ordered collection of tasks keyed by identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskListStore {
    tasks: Vec<Task>,
    insert_position: InsertPosition,
}

impl TaskListStore {
    /// Create an empty store that inserts new tasks at the front.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store with the given insertion policy.
    #[must_use]
    pub const fn with_insert_position(insert_position: InsertPosition) -> Self {
        Self { tasks: Vec::new(), insert_position }
    }

    /// Discard the current collection and adopt `tasks` in order.
    ///
    /// A refetch should never contain the same id twice; if it does, the
    /// first occurrence is kept.
    pub fn replace_all(&mut self, tasks: Vec<Task>) {
        let mut seen = HashSet::with_capacity(tasks.len());
        let incoming = tasks.len();
        let tasks: Vec<Task> = tasks.into_iter().filter(|task| seen.insert(task.id.clone())).collect();
        if tasks.len() != incoming {
            tracing::warn!(
                dropped = incoming - tasks.len(),
                "refetched task list contained duplicate ids"
            );
        }
        self.tasks = tasks;
    }

    /// Insert a task unless one with the same id is already present.
    ///
    /// Returns `true` if the task was inserted. An existing entry is left
    /// untouched, so a local confirmation and the matching broadcast can both
    /// be applied without duplicating the task.
    pub fn apply_create(&mut self, task: Task) -> bool {
        if self.contains(&task.id) {
            tracing::debug!(id = %task.id, "create for known task ignored");
            return false;
        }
        match self.insert_position {
            InsertPosition::Front => self.tasks.insert(0, task),
            InsertPosition::Back => self.tasks.push(task),
        }
        true
    }

    /// Replace the entry with the same id, keeping its position.
    ///
    /// Returns `true` if an entry was replaced. Updates for unknown ids are
    /// ignored.
    pub fn apply_update(&mut self, task: Task) -> bool {
        let Some(slot) = self.tasks.iter_mut().find(|existing| existing.id == task.id) else {
            tracing::debug!(id = %task.id, "update for unknown task ignored");
            return false;
        };
        *slot = task;
        true
    }

    /// Remove the entry with the given id, preserving the order of the rest.
    ///
    /// Returns the removed task, or `None` if no entry matched.
    pub fn apply_delete(&mut self, id: &TaskId) -> Option<Task> {
        let index = self.position(id)?;
        Some(self.tasks.remove(index))
    }

    /// Look up a task by id.
    #[must_use]
    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == id)
    }

    /// Check whether a task with this id is present.
    #[must_use]
    pub fn contains(&self, id: &TaskId) -> bool {
        self.position(id).is_some()
    }

    /// The tasks in display order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Iterate over the tasks in display order.
    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    /// Number of tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the store holds no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// The insertion policy for new tasks.
    #[must_use]
    pub const fn insert_position(&self) -> InsertPosition {
        self.insert_position
    }

    fn position(&self, id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| &task.id == id)
    }
}

impl<'a> IntoIterator for &'a TaskListStore {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::models::Status;
    use proptest::prelude::*;

    fn task(id: u64, title: &str) -> Task {
        Task::new(id, title)
    }

    fn ids(store: &TaskListStore) -> Vec<String> {
        store.iter().map(|t| t.id.to_string()).collect()
    }

    fn store_of(tasks: Vec<Task>) -> TaskListStore {
        let mut store = TaskListStore::new();
        store.replace_all(tasks);
        store
    }

    #[test]
    fn test_replace_all_adopts_order() {
        let mut store = store_of(vec![task(9, "old")]);
        store.replace_all(vec![task(2, "b"), task(1, "a"), task(3, "c")]);
        assert_eq!(ids(&store), ["2", "1", "3"]);
    }

    #[test]
    fn test_replace_all_drops_duplicate_ids() {
        let store = store_of(vec![task(1, "first"), task(2, "b"), task(1, "second")]);
        assert_eq!(ids(&store), ["1", "2"]);
        assert_eq!(store.get(&TaskId::from(1u64)).unwrap().title, "first");
    }

    #[test]
    fn test_apply_create_inserts_at_front_by_default() {
        let mut store = store_of(vec![task(1, "a")]);
        assert!(store.apply_create(task(3, "x")));
        assert_eq!(ids(&store), ["3", "1"]);
    }

    #[test]
    fn test_apply_create_inserts_at_back() {
        let mut store = TaskListStore::with_insert_position(InsertPosition::Back);
        store.replace_all(vec![task(1, "a")]);
        assert!(store.apply_create(task(3, "x")));
        assert_eq!(ids(&store), ["1", "3"]);
    }

    #[test]
    fn test_apply_create_keeps_existing_entry() {
        let mut store = store_of(vec![task(1, "original")]);
        assert!(!store.apply_create(task(1, "broadcast copy")));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&TaskId::from(1u64)).unwrap().title, "original");
    }

    #[test]
    fn test_apply_update_replaces_in_place() {
        let mut store = store_of(vec![task(1, "a"), task(2, "b"), task(3, "c")]);
        assert!(store.apply_update(task(2, "b").with_status(Status::Completed)));
        assert_eq!(ids(&store), ["1", "2", "3"]);
        assert!(store.get(&TaskId::from(2u64)).unwrap().is_completed());
    }

    #[test]
    fn test_apply_update_unknown_is_noop() {
        let mut store = store_of(vec![task(1, "a")]);
        let before = store.clone();
        assert!(!store.apply_update(task(7, "ghost")));
        assert_eq!(store, before);
    }

    #[test]
    fn test_apply_delete_preserves_order() {
        let mut store = store_of(vec![task(1, "a"), task(2, "b")]);
        let removed = store.apply_delete(&TaskId::from(1u64)).unwrap();
        assert_eq!(removed.title, "a");
        assert_eq!(ids(&store), ["2"]);
    }

    #[test]
    fn test_apply_delete_unknown_is_noop() {
        let mut store = store_of(vec![task(1, "a"), task(2, "b")]);
        let before = store.clone();
        assert!(store.apply_delete(&TaskId::from(5u64)).is_none());
        assert_eq!(store, before);
    }

    #[test]
    fn test_empty_store() {
        let store = TaskListStore::new();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
        assert!(store.get(&TaskId::from("x")).is_none());
        assert_eq!(store.insert_position(), InsertPosition::Front);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Create(u8),
        Update(u8),
        Delete(u8),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u8..8).prop_map(Op::Create),
            (0u8..8).prop_map(Op::Update),
            (0u8..8).prop_map(Op::Delete),
        ]
    }

    fn apply(store: &mut TaskListStore, op: &Op) {
        match op {
            Op::Create(id) => {
                store.apply_create(task(u64::from(*id), "created"));
            }
            Op::Update(id) => {
                store.apply_update(task(u64::from(*id), "updated"));
            }
            Op::Delete(id) => {
                store.apply_delete(&TaskId::from(u64::from(*id)));
            }
        }
    }

    proptest! {
        #[test]
        fn prop_ids_stay_unique(ops in proptest::collection::vec(op_strategy(), 0..64)) {
            let mut store = TaskListStore::new();
            for op in &ops {
                apply(&mut store, op);
            }
            let unique: HashSet<_> = store.iter().map(|t| t.id.clone()).collect();
            prop_assert_eq!(unique.len(), store.len());
        }

        #[test]
        fn prop_create_is_idempotent(
            ops in proptest::collection::vec(op_strategy(), 0..32),
            id in 0u64..8,
        ) {
            let mut once = TaskListStore::new();
            for op in &ops {
                apply(&mut once, op);
            }
            let mut twice = once.clone();
            once.apply_create(task(id, "new"));
            twice.apply_create(task(id, "new"));
            twice.apply_create(task(id, "new"));
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_unknown_update_and_delete_are_noops(
            ops in proptest::collection::vec(op_strategy(), 0..32),
        ) {
            let mut store = TaskListStore::new();
            for op in &ops {
                apply(&mut store, op);
            }
            let before = store.clone();
            let unknown = TaskId::from("not-a-known-id");
            store.apply_update(Task::new(unknown.clone(), "ghost"));
            store.apply_delete(&unknown);
            prop_assert_eq!(store, before);
        }
    }
}
