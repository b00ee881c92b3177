//! Testing utilities and fake implementations.
//!
//! These types are provided for use in tests. They may appear unused in
//! the library itself but are consumed by unit and integration tests.

#![allow(dead_code)]

use crate::auth::BearerToken;
use crate::error::{Error, Result};
use crate::tasks::{NewTask, Task, TaskId, TaskPatch};
use crate::traits::{TaskApi, TokenStore};
use async_trait::async_trait;
use std::cell::{Cell, RefCell};

/// A failure the fake API can be told to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// The server rejects the token.
    Unauthorized,
    /// The server answers 404.
    NotFound,
    /// The server answers 500.
    Server,
}

impl Failure {
    fn into_error(self, id: Option<&TaskId>) -> Error {
        match self {
            Self::Unauthorized => Error::Unauthorized("jwt expired".to_string()),
            Self::NotFound => Error::NotFound(id.cloned().unwrap_or_else(|| TaskId::from("?"))),
            Self::Server => Error::Api { status: 500, message: "Internal Server Error".to_string() },
        }
    }
}

/// A call received by the fake API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    /// `GET tasks`
    List,
    /// `POST tasks` with the given title.
    Create(String),
    /// `PUT tasks/:id`
    Replace(TaskId),
    /// `PATCH tasks/:id`
    Patch(TaskId),
    /// `DELETE tasks/:id`
    Delete(TaskId),
}

#[derive(Debug, Default)]
struct ServerState {
    tasks: Vec<Task>,
    next_id: u64,
    fail_next: Option<Failure>,
    respond_next: Option<Task>,
    calls: Vec<ApiCall>,
}

/// In-memory stand-in for the remote task API.
///
/// Holds the server's copy of the list, records every call, and can be
/// primed to fail or to answer the next mutation with a specific task.
#[derive(Debug, Default)]
pub struct FakeTaskApi {
    state: RefCell<ServerState>,
}

impl FakeTaskApi {
    /// Create a fake server with no tasks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fake server holding the given tasks.
    #[must_use]
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let api = Self::new();
        api.state.borrow_mut().tasks = tasks;
        api
    }

    /// Make the next call fail.
    pub fn fail_next(&self, failure: Failure) {
        self.state.borrow_mut().fail_next = Some(failure);
    }

    /// Make the next create/replace/patch answer with this task.
    pub fn respond_next(&self, task: Task) {
        self.state.borrow_mut().respond_next = Some(task);
    }

    /// Simulate another client creating a task.
    pub fn insert_remote(&self, task: Task) {
        self.state.borrow_mut().tasks.insert(0, task);
    }

    /// Simulate another client changing a task.
    pub fn update_remote(&self, task: Task) {
        let mut state = self.state.borrow_mut();
        if let Some(slot) = state.tasks.iter_mut().find(|t| t.id == task.id) {
            *slot = task;
        }
    }

    /// Simulate another client deleting a task.
    pub fn remove_remote(&self, id: &TaskId) {
        self.state.borrow_mut().tasks.retain(|t| &t.id != id);
    }

    /// The server's copy of the list.
    #[must_use]
    pub fn server_tasks(&self) -> Vec<Task> {
        self.state.borrow().tasks.clone()
    }

    /// Calls received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<ApiCall> {
        self.state.borrow().calls.clone()
    }

    fn begin(&self, call: ApiCall, id: Option<&TaskId>) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.calls.push(call);
        state.fail_next.take().map_or(Ok(()), |failure| Err(failure.into_error(id)))
    }

    /// Store `task` over the entry with the same id and return the response.
    fn store(&self, task: Task) -> Result<Task> {
        let mut state = self.state.borrow_mut();
        let response = state.respond_next.take().unwrap_or(task);
        let slot = state
            .tasks
            .iter_mut()
            .find(|t| t.id == response.id)
            .ok_or_else(|| Error::NotFound(response.id.clone()))?;
        *slot = response.clone();
        Ok(response)
    }
}

#[async_trait(?Send)]
impl TaskApi for FakeTaskApi {
    async fn list_tasks(&self) -> Result<Vec<Task>> {
        self.begin(ApiCall::List, None)?;
        Ok(self.server_tasks())
    }

    async fn create_task(&self, new_task: &NewTask) -> Result<Task> {
        self.begin(ApiCall::Create(new_task.title.clone()), None)?;
        let mut state = self.state.borrow_mut();
        let task = state.respond_next.take().unwrap_or_else(|| {
            state.next_id += 1;
            Task {
                due_date: new_task.due_date,
                priority: Some(new_task.priority),
                ..Task::new(format!("t{}", state.next_id), new_task.title.clone())
                    .with_status(new_task.status)
            }
        });
        state.tasks.insert(0, task.clone());
        Ok(task)
    }

    async fn replace_task(&self, task: &Task) -> Result<Task> {
        self.begin(ApiCall::Replace(task.id.clone()), Some(&task.id))?;
        self.store(task.clone())
    }

    async fn patch_task(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task> {
        self.begin(ApiCall::Patch(id.clone()), Some(id))?;
        let mut task = self
            .state
            .borrow()
            .tasks
            .iter()
            .find(|t| &t.id == id)
            .cloned()
            .ok_or_else(|| Error::NotFound(id.clone()))?;
        if let Some(title) = &patch.title {
            task.title.clone_from(title);
        }
        if let Some(status) = patch.status {
            task.status = status;
        }
        if patch.priority.is_some() {
            task.priority = patch.priority;
        }
        if patch.due_date.is_some() {
            task.due_date = patch.due_date;
        }
        self.store(task)
    }

    async fn delete_task(&self, id: &TaskId) -> Result<()> {
        self.begin(ApiCall::Delete(id.clone()), Some(id))?;
        let mut state = self.state.borrow_mut();
        let before = state.tasks.len();
        state.tasks.retain(|t| &t.id != id);
        if state.tasks.len() == before {
            return Err(Error::NotFound(id.clone()));
        }
        Ok(())
    }
}

/// Token store that keeps the token in memory.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RefCell<Option<BearerToken>>,
    clear_fails: Cell<bool>,
}

impl MemoryTokenStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding a token.
    ///
    /// # Panics
    ///
    /// Panics if `raw` is blank.
    #[must_use]
    pub fn with_token(raw: &str) -> Self {
        let token = BearerToken::new(raw).expect("test token must not be blank");
        Self { token: RefCell::new(Some(token)), clear_fails: Cell::new(false) }
    }

    /// Make every later `clear` fail and keep the token.
    pub fn fail_clear(&self) {
        self.clear_fails.set(true);
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<BearerToken>> {
        Ok(self.token.borrow().clone())
    }

    fn save(&self, token: &BearerToken) -> Result<()> {
        *self.token.borrow_mut() = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        if self.clear_fails.get() {
            return Err(std::io::Error::other("token store is read-only").into());
        }
        self.token.borrow_mut().take();
        Ok(())
    }
}
