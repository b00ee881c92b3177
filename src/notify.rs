//! Transient user-visible notifications.
//!
//! Every remote failure ends up here instead of propagating: the board
//! reports it and carries on.

use crate::traits::Notifier;
use std::cell::RefCell;
use std::fmt;

/// How a notification should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Something happened elsewhere (e.g. a push event).
    Info,
    /// A local action went through.
    Success,
    /// A local action failed or was rejected.
    Error,
}

impl Level {
    /// Short label for the level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "ok",
            Self::Error => "error",
        }
    }
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Presentation level.
    pub level: Level,
    /// Text shown to the user.
    pub message: String,
}

impl Notification {
    /// Create an info notification.
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: Level::Info, message: message.into() }
    }

    /// Create a success notification.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: Level::Success, message: message.into() }
    }

    /// Create an error notification.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self { level: Level::Error, message: message.into() }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level.as_str(), self.message)
    }
}

/// Notifier that writes to stderr as notifications arrive.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        tracing::info!(level = notification.level.as_str(), "{}", notification.message);
        eprintln!("{notification}");
    }
}

/// Notifier that keeps notifications until they are taken.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notifications: RefCell<Vec<Notification>>,
}

impl RecordingNotifier {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return everything recorded so far.
    pub fn take(&self) -> Vec<Notification> {
        self.notifications.take()
    }

    /// Copy of everything recorded so far.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Notification> {
        self.notifications.borrow().clone()
    }

    /// Whether any error notification was recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.notifications.borrow().iter().any(|n| n.level == Level::Error)
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        tracing::debug!(level = notification.level.as_str(), "{}", notification.message);
        self.notifications.borrow_mut().push(notification);
    }
}
