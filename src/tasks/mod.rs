//! Task model and the local task list.
//!
//! This module provides:
//! - [`Task`] and the request bodies sent to the remote store
//! - [`TaskListStore`], the client's current belief about the server's task list
//!
//! # Example
//!
//! ```
//! use todo_live::tasks::{Task, TaskId, TaskListStore};
//!
//! let mut store = TaskListStore::new();
//! store.replace_all(vec![Task::new(1u64, "Water the plants")]);
//!
//! // A local confirmation and the matching broadcast both arrive.
//! store.apply_create(Task::new(2u64, "Pay rent"));
//! store.apply_create(Task::new(2u64, "Pay rent"));
//! assert_eq!(store.len(), 2);
//!
//! store.apply_delete(&TaskId::from(1u64));
//! assert_eq!(store.tasks()[0].title, "Pay rent");
//! ```

pub mod models;
pub mod store;

pub use models::{
    parse_due_date, validate_title, InvalidStatus, NewTask, Priority, Status, Task, TaskId,
    TaskPatch,
};
pub use store::{InsertPosition, TaskListStore};
