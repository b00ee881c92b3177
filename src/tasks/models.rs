//! Task model types as they travel over the wire.

use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Identifier assigned to a task by the remote store.
///
/// Servers usually hand out opaque strings (e.g. document ids); numeric ids
/// are accepted on input and kept as their decimal text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(String);

impl TaskId {
    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u64> for TaskId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for TaskId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(text) => Self(text),
            Raw::Number(number) => Self(number.to_string()),
        })
    }
}

/// Task status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Status {
    /// Not started yet.
    #[default]
    ToDo,
    /// Being worked on.
    InProgress,
    /// Done.
    Completed,
}

impl Status {
    /// Get the canonical wire representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ToDo => "To-Do",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
        }
    }

    /// The status a completion toggle moves to.
    ///
    /// `Completed` goes back to `To-Do`; every other status becomes `Completed`.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Completed => Self::ToDo,
            Self::ToDo | Self::InProgress => Self::Completed,
        }
    }
}

impl FromStr for Status {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "todo" => Ok(Self::ToDo),
            "inprogress" => Ok(Self::InProgress),
            "completed" | "complete" | "done" => Ok(Self::Completed),
            _ => Err(InvalidStatus(s.to_string())),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Error when an unknown status string is provided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidStatus(pub String);

impl fmt::Display for InvalidStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid status: '{}' (must be one of: To-Do, In Progress, Completed)",
            self.0
        )
    }
}

impl std::error::Error for InvalidStatus {}

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Can wait.
    Low,
    /// The default for new tasks.
    #[default]
    #[serde(alias = "medium")]
    Normal,
    /// Should be done soon.
    High,
}

/// A single to-do item.
///
/// Serialised with `_id`; on input either `_id` or `id` names the task, and
/// documents carrying both (virtual `id`) prefer `_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "WireTask")]
pub struct Task {
    /// Server-assigned identifier.
    #[serde(rename = "_id")]
    pub id: TaskId,
    /// Short title, never empty once accepted by the server.
    pub title: String,
    /// Current status.
    #[serde(default)]
    pub status: Status,
    /// Priority, when the server tracks one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// Optional due date.
    #[serde(default, with = "due_date", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    /// When the server created the task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Create a task with just an id and title, as a push payload might carry.
    #[must_use]
    pub fn new(id: impl Into<TaskId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            status: Status::default(),
            priority: None,
            due_date: None,
            created_at: None,
        }
    }

    /// Check if the task is completed.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == Status::Completed
    }

    /// A copy of this task with a different status.
    #[must_use]
    pub fn with_status(&self, status: Status) -> Self {
        Self { status, ..self.clone() }
    }

    /// A copy of this task with a different title.
    #[must_use]
    pub fn with_title(&self, title: impl Into<String>) -> Self {
        Self { title: title.into(), ..self.clone() }
    }
}

/// A task as the server may send it.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTask {
    #[serde(rename = "_id", default)]
    object_id: Option<TaskId>,
    #[serde(default)]
    id: Option<TaskId>,
    title: String,
    #[serde(default)]
    status: Status,
    #[serde(default)]
    priority: Option<Priority>,
    #[serde(default, with = "due_date")]
    due_date: Option<NaiveDate>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl TryFrom<WireTask> for Task {
    type Error = String;

    fn try_from(wire: WireTask) -> std::result::Result<Self, Self::Error> {
        let id = wire.object_id.or(wire.id).ok_or_else(|| "missing field `_id`".to_string())?;
        Ok(Self {
            id,
            title: wire.title,
            status: wire.status,
            priority: wire.priority,
            due_date: wire.due_date,
            created_at: wire.created_at,
        })
    }
}

/// Body of a create request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    /// Title of the new task.
    pub title: String,
    /// Optional due date.
    #[serde(with = "due_date")]
    pub due_date: Option<NaiveDate>,
    /// Initial status.
    pub status: Status,
    /// Initial priority.
    pub priority: Priority,
}

impl NewTask {
    /// Build a create request, rejecting blank titles.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the title is empty after trimming.
    pub fn new(title: &str) -> Result<Self> {
        Ok(Self {
            title: validate_title(title)?,
            due_date: None,
            status: Status::ToDo,
            priority: Priority::Normal,
        })
    }

    /// Set the due date.
    #[must_use]
    pub fn with_due_date(mut self, due_date: Option<NaiveDate>) -> Self {
        self.due_date = due_date;
        self
    }
}

/// Fields that can be sent in a partial update.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    /// New title (if Some).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New status (if Some).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    /// New priority (if Some).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// New due date (if Some).
    #[serde(with = "due_date", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

impl TaskPatch {
    /// Check if any fields are set for update.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
    }
}

/// Trim a title and reject it if nothing is left.
///
/// # Errors
///
/// Returns [`Error::Validation`] for empty or whitespace-only titles.
pub fn validate_title(title: &str) -> Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation("Title is required".to_string()));
    }
    Ok(trimmed.to_string())
}

/// Parse a due date given either as `YYYY-MM-DD` or as an RFC 3339 timestamp.
///
/// # Errors
///
/// Returns a validation error if neither format matches.
pub fn parse_due_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map_err(|_| Error::Validation(format!("invalid due date: '{raw}' (expected YYYY-MM-DD)")))
}

/// Serde adapter for optional due dates: `null` and `""` both mean "no date".
mod due_date {
    use super::parse_due_date;
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        date: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => serializer.serialize_str(&date.format("%Y-%m-%d").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => parse_due_date(text).map(Some).map_err(de::Error::custom),
        }
    }
}
