//! Error types for `todo_live`.

use crate::tasks::TaskId;

/// Errors that can occur while talking to the task service or managing the session.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON parsing error occurred.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A YAML parsing error occurred.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The HTTP request could not be sent or its response could not be read.
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    /// A URL could not be parsed.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The push channel failed or delivered a frame that could not be understood.
    #[error("Push channel error: {0}")]
    PushChannel(String),

    /// The server rejected the bearer token.
    #[error("Unauthorized: {0} (sign out and sign in again)")]
    Unauthorized(String),

    /// The referenced task does not exist on the server.
    #[error("Task not found: {0}")]
    NotFound(TaskId),

    /// Input was rejected before or by the server.
    #[error("{0}")]
    Validation(String),

    /// The server answered with an unexpected status.
    #[error("Server returned {status}: {message}")]
    Api {
        /// The HTTP status code.
        status: u16,
        /// The response body, or the status reason when the body was empty.
        message: String,
    },

    /// An operation needed a bearer token but none is stored.
    #[error("Not signed in (run `todo-live login` first)")]
    NotSignedIn,

    /// The configuration is invalid or could not be resolved.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A template error occurred.
    #[error("Template error: {0}")]
    Template(String),
}

impl Error {
    /// Whether this error means the session is no longer usable.
    #[must_use]
    pub const fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Unauthorized(_) | Self::NotSignedIn)
    }
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_failure_classification() {
        assert!(Error::Unauthorized("expired".to_string()).is_auth_failure());
        assert!(Error::NotSignedIn.is_auth_failure());
        assert!(!Error::NotFound(TaskId::from("abc")).is_auth_failure());
        assert!(!Error::Validation("Title is required".to_string()).is_auth_failure());
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(Error::NotFound(TaskId::from("t-1")).to_string(), "Task not found: t-1");
        assert_eq!(
            Error::Api { status: 500, message: "boom".to_string() }.to_string(),
            "Server returned 500: boom"
        );
        assert!(Error::Unauthorized("jwt expired".to_string()).to_string().contains("sign in"));
    }
}
