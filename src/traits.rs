//! Core traits for testability and abstraction.

use crate::auth::BearerToken;
use crate::error::Result;
use crate::notify::Notification;
use crate::tasks::{NewTask, Task, TaskId, TaskPatch};
use async_trait::async_trait;

/// Trait for the remote task store.
///
/// This trait abstracts the HTTP API so the board can be driven by an
/// in-memory fake in tests. Futures are not `Send`: the board runs on a
/// single logical thread.
#[async_trait(?Send)]
pub trait TaskApi {
    /// Fetch the full task list.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    async fn list_tasks(&self) -> Result<Vec<Task>>;

    /// Create a task and return it with its server-assigned id.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    async fn create_task(&self, new_task: &NewTask) -> Result<Task>;

    /// Replace a task with the given full value and return the stored result.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotFound`] if the id is unknown to the server,
    /// or another error if the request fails.
    async fn replace_task(&self, task: &Task) -> Result<Task>;

    /// Apply a partial update and return the stored result.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotFound`] if the id is unknown to the server,
    /// or another error if the request fails.
    async fn patch_task(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task>;

    /// Delete a task.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotFound`] if the id is unknown to the server,
    /// or another error if the request fails.
    async fn delete_task(&self, id: &TaskId) -> Result<()>;
}

#[async_trait(?Send)]
impl<T: TaskApi + ?Sized> TaskApi for &T {
    async fn list_tasks(&self) -> Result<Vec<Task>> {
        (**self).list_tasks().await
    }

    async fn create_task(&self, new_task: &NewTask) -> Result<Task> {
        (**self).create_task(new_task).await
    }

    async fn replace_task(&self, task: &Task) -> Result<Task> {
        (**self).replace_task(task).await
    }

    async fn patch_task(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task> {
        (**self).patch_task(id, patch).await
    }

    async fn delete_task(&self, id: &TaskId) -> Result<()> {
        (**self).delete_task(id).await
    }
}

/// Trait for surfacing transient messages to the user.
pub trait Notifier {
    /// Show a notification.
    fn notify(&self, notification: Notification);
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification);
    }
}

impl<N: Notifier + ?Sized> Notifier for std::rc::Rc<N> {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification);
    }
}

/// Trait for persisting the bearer token between runs.
pub trait TokenStore {
    /// Load the stored token, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the token exists but cannot be read.
    fn load(&self) -> Result<Option<BearerToken>>;

    /// Persist a token, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be written.
    fn save(&self, token: &BearerToken) -> Result<()>;

    /// Forget the stored token. Clearing an empty store succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored token cannot be removed.
    fn clear(&self) -> Result<()>;
}

impl<T: TokenStore + ?Sized> TokenStore for &T {
    fn load(&self) -> Result<Option<BearerToken>> {
        (**self).load()
    }

    fn save(&self, token: &BearerToken) -> Result<()> {
        (**self).save(token)
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }
}
