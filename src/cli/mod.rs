//! Command-line interface for todo-live.
//!
//! One-shot commands (`list`, `add`, `toggle`, ...) load the list, apply a
//! single action and print the result. `watch` keeps the list on screen and
//! follows the push channel until stdin closes.

mod run;
mod watch;

#[cfg(test)]
mod tests;

pub use run::{run, run_in, CliOutput};
pub use watch::{parse_watch_line, WatchInput};

use crate::tasks::{parse_due_date, Status};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// To-do list client with live updates.
///
/// Sign in once with `login` and `sign-in`; the token is kept in the data
/// directory (`$TODO_LIVE_HOME`, else `~/.todo-live`).
#[derive(Parser, Debug)]
#[command(name = "todo-live")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Print the URL to sign in with Google.
    Login,

    /// Store the token from the sign-in callback.
    ///
    /// Accepts the full callback URL (`...?token=...`) or the bare token.
    #[command(name = "sign-in")]
    SignIn {
        /// Callback URL or token
        input: String,
    },

    /// Forget the stored token.
    #[command(name = "sign-out")]
    SignOut,

    /// Show all tasks.
    List,

    /// Create a task.
    Add {
        /// Task title
        title: String,

        /// Due date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_due_date)]
        due: Option<NaiveDate>,
    },

    /// Rename a task.
    Edit {
        /// Task ID
        id: String,

        /// New title
        title: String,
    },

    /// Set the status of a task.
    Status {
        /// Task ID
        id: String,

        /// New status: To-Do, In Progress or Completed
        status: Status,
    },

    /// Mark a task completed, or reopen a completed one.
    Toggle {
        /// Task ID
        id: String,
    },

    /// Delete a task.
    Delete {
        /// Task ID
        id: String,
    },

    /// Show the list and follow changes live, reading commands from stdin.
    Watch,

    /// Ensure config file exists (create with defaults if not).
    #[command(name = "ensure-config")]
    EnsureConfig,

    /// Show version information.
    Version,
}

impl Command {
    /// Returns true if this command talks to the task API.
    #[must_use]
    pub const fn needs_session(&self) -> bool {
        !matches!(
            self,
            Self::Login | Self::SignIn { .. } | Self::SignOut | Self::EnsureConfig | Self::Version
        )
    }
}
