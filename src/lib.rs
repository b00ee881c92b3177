//! # `todo_live`
//!
//! Client for a remote to-do service that keeps a local task list in step
//! with the user's own edits and with changes pushed by the server.
//!
//! The pieces, bottom up:
//!
//! - [`tasks`]: the task model and the [`TaskListStore`] reconciliation primitives.
//! - [`api`]: the authenticated HTTP client behind the [`TaskApi`] trait.
//! - [`push`]: the websocket subscription delivering task events.
//! - [`session`]: the signed-in session and its persisted token.
//! - [`board`]: the [`TaskBoard`] tying them together on one logical thread.

pub mod api;
pub mod auth;
pub mod board;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod notify;
pub mod paths;
pub mod push;
pub mod session;
pub mod storage;
pub mod tasks;
pub mod templates;
pub mod testing;
pub mod traits;

pub use api::HttpTaskApi;
pub use auth::BearerToken;
pub use board::{BoardCommand, ReconcileStrategy, TaskBoard};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use notify::{ConsoleNotifier, Notification, RecordingNotifier};
pub use push::{PushClient, PushEvent, Subscription};
pub use session::Session;
pub use storage::FileTokenStore;
pub use tasks::{InsertPosition, NewTask, Status, Task, TaskId, TaskListStore};
pub use traits::{Notifier, TaskApi, TokenStore};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
