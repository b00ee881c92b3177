//! Tests for the CLI module.

use super::*;
use crate::paths;
use crate::storage::FileTokenStore;
use crate::tasks::Status;
use crate::traits::TokenStore;
use chrono::NaiveDate;
use clap::Parser;
use std::process::ExitCode;
use tempfile::TempDir;

fn parse(args: &[&str]) -> Command {
    let argv = std::iter::once("todo-live").chain(args.iter().copied());
    Cli::try_parse_from(argv).unwrap().command
}

#[test]
fn test_parse_simple_commands() {
    assert_eq!(parse(&["login"]), Command::Login);
    assert_eq!(parse(&["sign-out"]), Command::SignOut);
    assert_eq!(parse(&["list"]), Command::List);
    assert_eq!(parse(&["watch"]), Command::Watch);
    assert_eq!(parse(&["ensure-config"]), Command::EnsureConfig);
    assert_eq!(parse(&["version"]), Command::Version);
    assert_eq!(
        parse(&["sign-in", "http://localhost:3000/?token=abc"]),
        Command::SignIn { input: "http://localhost:3000/?token=abc".to_string() }
    );
}

#[test]
fn test_parse_add_with_due_date() {
    assert_eq!(
        parse(&["add", "Buy milk", "--due", "2024-05-01"]),
        Command::Add { title: "Buy milk".to_string(), due: NaiveDate::from_ymd_opt(2024, 5, 1) }
    );
    assert_eq!(parse(&["add", "x"]), Command::Add { title: "x".to_string(), due: None });
    assert!(Cli::try_parse_from(["todo-live", "add", "x", "--due", "soon"]).is_err());
}

#[test]
fn test_parse_status_is_lenient() {
    assert_eq!(
        parse(&["status", "t1", "in-progress"]),
        Command::Status { id: "t1".to_string(), status: Status::InProgress }
    );
    assert_eq!(
        parse(&["status", "t1", "Completed"]),
        Command::Status { id: "t1".to_string(), status: Status::Completed }
    );
    assert!(Cli::try_parse_from(["todo-live", "status", "t1", "later"]).is_err());
}

#[test]
fn test_parse_requires_arguments() {
    assert!(Cli::try_parse_from(["todo-live", "toggle"]).is_err());
    assert!(Cli::try_parse_from(["todo-live", "edit", "t1"]).is_err());
    assert!(Cli::try_parse_from(["todo-live"]).is_err());
}

#[test]
fn test_command_needs_session() {
    assert!(!Command::Login.needs_session());
    assert!(!Command::SignOut.needs_session());
    assert!(!Command::Version.needs_session());
    assert!(!Command::EnsureConfig.needs_session());
    assert!(Command::List.needs_session());
    assert!(Command::Watch.needs_session());
    assert!(Command::Toggle { id: "t1".to_string() }.needs_session());
}

#[tokio::test]
async fn test_version_command() {
    let dir = TempDir::new().unwrap();
    let output = run_in(Command::Version, dir.path()).await;
    assert_eq!(output.exit_code, ExitCode::SUCCESS);
    assert!(output.stderr[0].contains(crate::VERSION));
}

#[tokio::test]
async fn test_ensure_config_creates_file() {
    let dir = TempDir::new().unwrap();
    let output = run_in(Command::EnsureConfig, dir.path()).await;
    assert_eq!(output.exit_code, ExitCode::SUCCESS);
    assert!(paths::config_path(dir.path()).exists());
    assert!(output.stderr.iter().any(|line| line.contains("api_url: http://localhost:5000/api")));
}

#[tokio::test]
#[serial_test::serial]
async fn test_login_prints_provider_url() {
    let dir = TempDir::new().unwrap();
    let output = run_in(Command::Login, dir.path()).await;
    assert_eq!(output.exit_code, ExitCode::SUCCESS);
    assert!(output.stdout[0].contains("http://localhost:5000/api/auth/google"));
}

#[tokio::test]
async fn test_sign_in_and_sign_out() {
    let dir = TempDir::new().unwrap();
    let store = FileTokenStore::new(dir.path());

    let output = run_in(
        Command::SignIn { input: "http://localhost:3000/?token=jwt-abc".to_string() },
        dir.path(),
    )
    .await;
    assert_eq!(output.exit_code, ExitCode::SUCCESS);
    assert_eq!(store.load().unwrap().unwrap().expose(), "jwt-abc");

    let output = run_in(Command::SignOut, dir.path()).await;
    assert_eq!(output.exit_code, ExitCode::SUCCESS);
    assert_eq!(output.stderr, ["Signed out"]);
    assert!(store.load().unwrap().is_none());

    let output = run_in(Command::SignOut, dir.path()).await;
    assert_eq!(output.stderr, ["Not signed in"]);
}

#[tokio::test]
async fn test_sign_in_rejects_callback_without_token() {
    let dir = TempDir::new().unwrap();
    let output =
        run_in(Command::SignIn { input: "http://localhost:3000/?error=denied".to_string() }, dir.path())
            .await;
    assert_eq!(output.exit_code, ExitCode::from(1));
    assert!(output.stderr[0].starts_with("Error: "));
}

#[tokio::test]
async fn test_task_commands_require_sign_in() {
    let dir = TempDir::new().unwrap();
    for command in [Command::List, Command::Toggle { id: "t1".to_string() }] {
        let output = run_in(command, dir.path()).await;
        assert_eq!(output.exit_code, ExitCode::from(1));
        assert!(output.stderr[0].contains("Not signed in"), "{:?}", output.stderr);
    }
}
