//! Command execution for the CLI.
//!
//! This module handles running CLI commands and producing output.

use crate::auth;
use crate::board::{BoardCommand, TaskBoard};
use crate::cli::Command;
use crate::config::{self, ClientConfig};
use crate::error::Result;
use crate::notify::{Level, RecordingNotifier};
use crate::paths;
use crate::session::Session;
use crate::storage::FileTokenStore;
use crate::tasks::TaskId;
use crate::templates;
use std::path::Path;
use std::process::ExitCode;

/// Output from running the CLI, with separate stdout and stderr messages.
#[derive(Debug)]
pub struct CliOutput {
    /// Exit code for the process.
    pub exit_code: ExitCode,
    /// Messages to print to stdout.
    pub stdout: Vec<String>,
    /// Messages to print to stderr.
    pub stderr: Vec<String>,
}

impl CliOutput {
    fn success(stdout: Vec<String>, stderr: Vec<String>) -> Self {
        Self { exit_code: ExitCode::SUCCESS, stdout, stderr }
    }

    fn failure(stderr: Vec<String>) -> Self {
        Self { exit_code: ExitCode::from(1), stdout: vec![], stderr }
    }
}

/// Run a CLI command against the data directory from the environment.
pub async fn run(command: Command) -> CliOutput {
    match paths::data_dir() {
        Ok(data_dir) => run_in(command, &data_dir).await,
        Err(e) => CliOutput::failure(vec![format!("Error: {e}")]),
    }
}

/// Run a CLI command against an explicit data directory.
pub async fn run_in(command: Command, data_dir: &Path) -> CliOutput {
    tracing::debug!(?command, "running command");
    let result = match command {
        Command::Version => Ok(run_version()),
        Command::EnsureConfig => run_ensure_config(data_dir),
        Command::Login => run_login(data_dir),
        Command::SignIn { input } => run_sign_in(data_dir, &input),
        Command::SignOut => run_sign_out(data_dir),
        Command::List => run_board(data_dir, None).await,
        Command::Add { title, due } => {
            run_board(data_dir, Some(BoardCommand::Add { title, due_date: due })).await
        }
        Command::Edit { id, title } => {
            run_board(data_dir, Some(BoardCommand::EditTitle { id: TaskId::from(id), title }))
                .await
        }
        Command::Status { id, status } => {
            run_board(data_dir, Some(BoardCommand::SetStatus { id: TaskId::from(id), status }))
                .await
        }
        Command::Toggle { id } => {
            run_board(data_dir, Some(BoardCommand::Toggle { id: TaskId::from(id) })).await
        }
        Command::Delete { id } => {
            run_board(data_dir, Some(BoardCommand::Delete { id: TaskId::from(id) })).await
        }
        Command::Watch => super::watch::watch(data_dir)
            .await
            .map(|()| CliOutput::success(vec![], vec!["Stopped watching".to_string()])),
    };

    result.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "command failed");
        CliOutput::failure(vec![format!("Error: {e}")])
    })
}

// === Utility Commands ===

fn run_version() -> CliOutput {
    CliOutput::success(vec![], vec![format!("todo-live v{}", crate::VERSION)])
}

fn run_ensure_config(data_dir: &Path) -> Result<CliOutput> {
    let config = config::ensure_config(data_dir)?;
    let messages = vec![
        format!("Config ensured at {}", paths::config_path(data_dir).display()),
        format!("  api_url: {}", config.api_url),
        format!("  push_url: {}", config.push_url),
        format!("  reconcile: {:?}", config.reconcile),
        format!("  insert_position: {:?}", config.insert_position),
    ];
    Ok(CliOutput::success(vec![], messages))
}

// === Session Commands ===

fn run_login(data_dir: &Path) -> Result<CliOutput> {
    let config = ClientConfig::resolve(data_dir)?;
    let url = auth::login_url(&config)?;
    Ok(CliOutput::success(vec![templates::render_login(url.as_str())?], vec![]))
}

fn run_sign_in(data_dir: &Path, input: &str) -> Result<CliOutput> {
    let store = FileTokenStore::new(data_dir);
    let mut session = Session::restore(&store)?;
    session.sign_in_from(input)?;
    Ok(CliOutput::success(
        vec![],
        vec![format!("Signed in. Token saved to {}", store.path().display())],
    ))
}

fn run_sign_out(data_dir: &Path) -> Result<CliOutput> {
    let mut session = Session::restore(FileTokenStore::new(data_dir))?;
    let was_signed_in = session.is_signed_in();
    session.sign_out()?;
    let message = if was_signed_in { "Signed out" } else { "Not signed in" };
    Ok(CliOutput::success(vec![], vec![message.to_string()]))
}

// === Task Commands ===

/// Load the list, apply one action, and print the resulting list.
async fn run_board(data_dir: &Path, command: Option<BoardCommand>) -> Result<CliOutput> {
    let config = ClientConfig::resolve(data_dir)?;
    let session = Session::restore(FileTokenStore::new(data_dir))?;
    let api = session.api(&config)?;
    let notifier = RecordingNotifier::new();
    let mut board = TaskBoard::from_config(api, &notifier, &config);

    let mut ok = board.refresh().await;
    if let (true, Some(command)) = (ok, command) {
        ok = board.execute(command).await;
    }

    let notes = notifier.take();
    let stderr = notes.iter().map(ToString::to_string).collect();
    if !ok || notes.iter().any(|n| n.level == Level::Error) {
        return Ok(CliOutput::failure(stderr));
    }
    Ok(CliOutput::success(vec![templates::render_task_list(board.tasks())?], stderr))
}
