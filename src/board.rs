//! The task board: user actions, push reconciliation and the event loop.
//!
//! A [`TaskBoard`] owns the local [`TaskListStore`]. Every action calls the
//! remote API first and only touches the store once the server has answered,
//! so a failed call leaves the list exactly as it was. Failures are reported
//! through the [`Notifier`] and never returned to the caller.
//!
//! The board is single-threaded. [`TaskBoard::run`] multiplexes push events
//! and queued [`BoardCommand`]s; whatever arrives while a remote call is in
//! flight waits in its queue and is applied afterwards, in arrival order.

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::notify::Notification;
use crate::push::{PushEvent, Subscription};
use crate::tasks::{InsertPosition, NewTask, Status, Task, TaskId, TaskListStore, TaskPatch};
use crate::traits::{Notifier, TaskApi};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// How push events are folded into the local list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconcileStrategy {
    /// Reload the whole list on every event.
    #[default]
    Refetch,
    /// Apply the event payload directly to the store.
    Incremental,
}

/// A user action queued for the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardCommand {
    /// Reload the list from the server.
    Refresh,
    /// Create a task.
    Add {
        /// Title as typed.
        title: String,
        /// Optional due date.
        due_date: Option<NaiveDate>,
    },
    /// Rename a task.
    EditTitle {
        /// Task to rename.
        id: TaskId,
        /// New title as typed.
        title: String,
    },
    /// Move a task to a specific status.
    SetStatus {
        /// Task to change.
        id: TaskId,
        /// Target status.
        status: Status,
    },
    /// Flip a task between completed and to-do.
    Toggle {
        /// Task to toggle.
        id: TaskId,
    },
    /// Delete a task.
    Delete {
        /// Task to delete.
        id: TaskId,
    },
}

/// Controller owning the local task list.
#[derive(Debug)]
pub struct TaskBoard<A: TaskApi, N: Notifier> {
    api: A,
    notifier: N,
    store: TaskListStore,
    strategy: ReconcileStrategy,
}

impl<A: TaskApi, N: Notifier> TaskBoard<A, N> {
    /// Create an empty board.
    pub const fn new(
        api: A,
        notifier: N,
        strategy: ReconcileStrategy,
        insert_position: InsertPosition,
    ) -> Self {
        Self { api, notifier, store: TaskListStore::with_insert_position(insert_position), strategy }
    }

    /// Create an empty board using the reconciliation settings from config.
    pub const fn from_config(api: A, notifier: N, config: &ClientConfig) -> Self {
        Self::new(api, notifier, config.reconcile, config.insert_position)
    }

    /// The local list.
    pub const fn store(&self) -> &TaskListStore {
        &self.store
    }

    /// The tasks in display order.
    pub fn tasks(&self) -> &[Task] {
        self.store.tasks()
    }

    /// The API client.
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// The notifier.
    pub const fn notifier(&self) -> &N {
        &self.notifier
    }

    /// The configured reconciliation strategy.
    pub const fn strategy(&self) -> ReconcileStrategy {
        self.strategy
    }

    /// Reload the whole list from the server.
    ///
    /// Returns `false` and leaves the list untouched if the fetch fails.
    pub async fn refresh(&mut self) -> bool {
        match self.api.list_tasks().await {
            Ok(tasks) => {
                debug!(count = tasks.len(), "task list loaded");
                self.store.replace_all(tasks);
                true
            }
            Err(e) => {
                self.fail("Error loading tasks", &e);
                false
            }
        }
    }

    /// Create a task.
    ///
    /// Blank titles are rejected without contacting the server.
    pub async fn add_task(&mut self, title: &str, due_date: Option<NaiveDate>) -> Option<Task> {
        let new_task = match NewTask::new(title) {
            Ok(new_task) => new_task.with_due_date(due_date),
            Err(e) => {
                self.reject(&e);
                return None;
            }
        };
        match self.api.create_task(&new_task).await {
            Ok(task) => {
                info!(id = %task.id, "task created");
                self.store.apply_create(task.clone());
                self.notifier.notify(Notification::success("Task created"));
                Some(task)
            }
            Err(e) => {
                self.fail("Create failed", &e);
                None
            }
        }
    }

    /// Rename a task.
    pub async fn edit_title(&mut self, task: &Task, title: &str) -> Option<Task> {
        let title = match crate::tasks::validate_title(title) {
            Ok(title) => title,
            Err(e) => {
                self.reject(&e);
                return None;
            }
        };
        self.replace(&task.with_title(title), "Task updated").await
    }

    /// Move a task to the given status.
    ///
    /// Only the status is sent; the store takes whatever the server returns.
    pub async fn set_status(&mut self, task: &Task, status: Status) -> Option<Task> {
        let patch = TaskPatch { status: Some(status), ..TaskPatch::default() };
        let result = self.api.patch_task(&task.id, &patch).await;
        self.adopt(result, "Status updated")
    }

    /// Mark a completed task as to-do, and anything else as completed.
    ///
    /// The store takes the task the server sends back, not the local guess.
    pub async fn toggle_status(&mut self, task: &Task) -> Option<Task> {
        self.set_status(task, task.status.toggled()).await
    }

    /// Delete a task.
    pub async fn delete_task(&mut self, id: &TaskId) -> bool {
        match self.api.delete_task(id).await {
            Ok(()) => {
                info!(%id, "task deleted");
                self.store.apply_delete(id);
                self.notifier.notify(Notification::success("Deleted"));
                true
            }
            Err(e) => {
                self.fail("Delete failed", &e);
                false
            }
        }
    }

    /// Fold a push event into the list.
    ///
    /// Returns whether the list may have changed.
    pub async fn handle_push(&mut self, event: PushEvent) -> bool {
        debug!(event = event.name(), strategy = ?self.strategy, "handling push event");
        let note = match &event {
            PushEvent::TaskCreated(_) => "New task created",
            PushEvent::TaskUpdated(_) => "Task updated",
            PushEvent::TaskDeleted(_) => "Task deleted",
            PushEvent::Reconnected => return self.refresh().await,
        };
        self.notifier.notify(Notification::info(note));

        match (self.strategy, event) {
            (ReconcileStrategy::Refetch, _) | (_, PushEvent::Reconnected) => self.refresh().await,
            (ReconcileStrategy::Incremental, PushEvent::TaskCreated(task)) => {
                self.store.apply_create(task)
            }
            (ReconcileStrategy::Incremental, PushEvent::TaskUpdated(task)) => {
                self.store.apply_update(task)
            }
            (ReconcileStrategy::Incremental, PushEvent::TaskDeleted(id)) => {
                self.store.apply_delete(&id).is_some()
            }
        }
    }

    /// Run one queued command. Returns whether the list may have changed.
    pub async fn execute(&mut self, command: BoardCommand) -> bool {
        match command {
            BoardCommand::Refresh => self.refresh().await,
            BoardCommand::Add { title, due_date } => self.add_task(&title, due_date).await.is_some(),
            BoardCommand::EditTitle { id, title } => match self.lookup(id) {
                Some(task) => self.edit_title(&task, &title).await.is_some(),
                None => false,
            },
            BoardCommand::SetStatus { id, status } => match self.lookup(id) {
                Some(task) => self.set_status(&task, status).await.is_some(),
                None => false,
            },
            BoardCommand::Toggle { id } => match self.lookup(id) {
                Some(task) => self.toggle_status(&task).await.is_some(),
                None => false,
            },
            BoardCommand::Delete { id } => self.delete_task(&id).await,
        }
    }

    /// Process push events and commands until the command queue closes.
    ///
    /// `on_change` sees the list after every event or command that may have
    /// changed it. If the push channel shuts down the loop keeps serving
    /// commands.
    pub async fn run<F>(
        &mut self,
        subscription: &mut Subscription,
        commands: &mut mpsc::UnboundedReceiver<BoardCommand>,
        mut on_change: F,
    ) where
        F: FnMut(&TaskListStore),
    {
        let mut push_open = true;
        loop {
            tokio::select! {
                biased;
                event = subscription.next(), if push_open => match event {
                    Some(event) => {
                        if self.handle_push(event).await {
                            on_change(&self.store);
                        }
                    }
                    None => {
                        warn!("push channel closed; live updates stopped");
                        push_open = false;
                    }
                },
                command = commands.recv() => match command {
                    Some(command) => {
                        if self.execute(command).await {
                            on_change(&self.store);
                        }
                    }
                    None => break,
                },
            }
        }
        debug!("board loop finished");
    }

    /// Copy of the task with the given id, reporting unknown ids.
    fn lookup(&self, id: TaskId) -> Option<Task> {
        let task = self.store.get(&id).cloned();
        if task.is_none() {
            self.reject(&Error::NotFound(id));
        }
        task
    }

    /// Send a full replacement and adopt what the server returns.
    async fn replace(&mut self, task: &Task, success: &str) -> Option<Task> {
        let result = self.api.replace_task(task).await;
        self.adopt(result, success)
    }

    /// Put the server's answer to an update into the store.
    fn adopt(&mut self, result: Result<Task>, success: &str) -> Option<Task> {
        match result {
            Ok(updated) => {
                info!(id = %updated.id, status = %updated.status, "task updated");
                self.store.apply_update(updated.clone());
                self.notifier.notify(Notification::success(success));
                Some(updated)
            }
            Err(e) => {
                self.fail("Update failed", &e);
                None
            }
        }
    }

    fn reject(&self, error: &Error) {
        debug!(error = %error, "action rejected");
        self.notifier.notify(Notification::error(error.to_string()));
    }

    fn fail(&self, context: &str, error: &Error) {
        warn!(error = %error, "{context}");
        self.notifier.notify(Notification::error(format!("{context}: {error}")));
    }
}
