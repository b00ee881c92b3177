//! Live view: the list on screen, push events applied as they arrive, and
//! commands read line by line from stdin.

use crate::board::{BoardCommand, TaskBoard};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::notify::ConsoleNotifier;
use crate::push::PushClient;
use crate::session::Session;
use crate::storage::FileTokenStore;
use crate::tasks::{parse_due_date, Status, Task, TaskId};
use crate::templates;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// One line typed in watch mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchInput {
    /// Run a board action.
    Command(BoardCommand),
    /// Show the command list.
    Help,
    /// Stop watching.
    Quit,
}

/// Parse a watch-mode line. Blank lines yield `None`.
///
/// # Errors
///
/// Returns a validation error describing what is wrong with the line.
pub fn parse_watch_line(line: &str) -> Option<Result<WatchInput>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    let input = match verb.to_ascii_lowercase().as_str() {
        "q" | "quit" | "exit" => Ok(WatchInput::Quit),
        "help" | "?" => Ok(WatchInput::Help),
        "refresh" => Ok(WatchInput::Command(BoardCommand::Refresh)),
        "add" => parse_add(rest),
        "edit" => id_and_rest(rest, "edit <id> <title>").map(|(id, title)| {
            WatchInput::Command(BoardCommand::EditTitle { id, title: title.to_string() })
        }),
        "status" => id_and_rest(rest, "status <id> <status>").and_then(|(id, status)| {
            let status: Status =
                status.parse().map_err(|e: crate::tasks::InvalidStatus| Error::Validation(e.to_string()))?;
            Ok(WatchInput::Command(BoardCommand::SetStatus { id, status }))
        }),
        "toggle" => single_id(rest, "toggle <id>")
            .map(|id| WatchInput::Command(BoardCommand::Toggle { id })),
        "delete" | "rm" => single_id(rest, "delete <id>")
            .map(|id| WatchInput::Command(BoardCommand::Delete { id })),
        other => Err(Error::Validation(format!("Unknown command `{other}` (try `help`)"))),
    };
    Some(input)
}

/// `add <title> [--due YYYY-MM-DD]`
fn parse_add(rest: &str) -> Result<WatchInput> {
    let (title, due_date) = match split_due_flag(rest) {
        Some((title, due)) => (title.trim(), Some(parse_due_date(due.trim())?)),
        None => (rest, None),
    };
    Ok(WatchInput::Command(BoardCommand::Add { title: title.to_string(), due_date }))
}

/// Split at the last `--due` that stands alone between whitespace.
fn split_due_flag(rest: &str) -> Option<(&str, &str)> {
    const FLAG: &str = "--due";
    rest.rmatch_indices(FLAG)
        .map(|(at, _)| at)
        .find(|&at| {
            let before = rest[..at].chars().next_back();
            let after = rest[at + FLAG.len()..].chars().next();
            before.map_or(true, char::is_whitespace) && after.map_or(true, char::is_whitespace)
        })
        .map(|at| (&rest[..at], &rest[at + FLAG.len()..]))
}

fn id_and_rest<'a>(rest: &'a str, usage: &str) -> Result<(TaskId, &'a str)> {
    rest.split_once(char::is_whitespace)
        .map(|(id, tail)| (TaskId::from(id), tail.trim()))
        .filter(|(_, tail)| !tail.is_empty())
        .ok_or_else(|| Error::Validation(format!("Usage: {usage}")))
}

fn single_id(rest: &str, usage: &str) -> Result<TaskId> {
    if rest.is_empty() || rest.contains(char::is_whitespace) {
        return Err(Error::Validation(format!("Usage: {usage}")));
    }
    Ok(TaskId::from(rest))
}

/// Run the live view until stdin closes or the user quits.
pub(super) async fn watch(data_dir: &Path) -> Result<()> {
    let config = ClientConfig::resolve(data_dir)?;
    let session = Session::restore(FileTokenStore::new(data_dir))?;
    let api = session.api(&config)?;
    let push = PushClient::new(&config)?;

    println!("{}", templates::render_watch_help(&config.push_url)?);

    // Subscribe before the first load; the connect announcement reloads
    // anything broadcast in between.
    let mut subscription = push.subscribe();
    let mut board = TaskBoard::from_config(api, ConsoleNotifier, &config);
    board.refresh().await;
    print_list(board.tasks());

    let (sender, mut commands) = mpsc::unbounded_channel();
    let reader = tokio::spawn(read_commands(sender, config.push_url.clone()));

    board.run(&mut subscription, &mut commands, |store| print_list(store.tasks())).await;

    reader.abort();
    Ok(())
}

/// Forward parsed stdin lines to the board until EOF or `quit`.
async fn read_commands(sender: mpsc::UnboundedSender<BoardCommand>, push_url: String) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "stdin read failed");
                break;
            }
        };
        match parse_watch_line(&line) {
            None => {}
            Some(Ok(WatchInput::Quit)) => break,
            Some(Ok(WatchInput::Help)) => match templates::render_watch_help(&push_url) {
                Ok(help) => eprintln!("{help}"),
                Err(e) => eprintln!("{e}"),
            },
            Some(Ok(WatchInput::Command(command))) => {
                if sender.send(command).is_err() {
                    break;
                }
            }
            Some(Err(e)) => eprintln!("{e}"),
        }
    }
}

fn print_list(tasks: &[Task]) {
    match templates::render_task_list(tasks) {
        Ok(list) => println!("{list}"),
        Err(e) => eprintln!("Error: {e}"),
    }
}
