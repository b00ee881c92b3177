//! Template loading and rendering using Tera.
//!
//! Everything the CLI prints at length (the task list, sign-in instructions,
//! the watch help) comes from templates. Defaults are embedded in the binary;
//! files under `<data dir>/templates` override them by name.

use crate::error::{Error, Result};
use crate::paths;
use crate::tasks::{Status, Task};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tera::{Context, Tera};

/// Template for the task list.
pub const TASK_LIST: &str = "task_list.tera";
/// Template for sign-in instructions.
pub const LOGIN: &str = "login.tera";
/// Template for the watch mode banner.
pub const WATCH_HELP: &str = "watch_help.tera";

/// Embedded default templates for fallback when files don't exist.
static EMBEDDED_TEMPLATES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert(TASK_LIST, include_str!("../templates/task_list.tera"));
    m.insert(LOGIN, include_str!("../templates/login.tera"));
    m.insert(WATCH_HELP, include_str!("../templates/watch_help.tera"));
    m
});

/// Global template engine with caching.
static TERA: Lazy<RwLock<Option<Tera>>> = Lazy::new(|| RwLock::new(None));

/// Initialize the template engine, loading overrides from `templates_dir`.
///
/// With `None`, overrides come from the data directory if it can be resolved.
/// Templates missing from the directory fall back to the embedded defaults.
///
/// # Errors
///
/// Returns an error if the directory exists but contains invalid templates.
pub fn init_templates(templates_dir: Option<&Path>) -> Result<()> {
    let dir: Option<PathBuf> = templates_dir.map_or_else(
        || paths::data_dir().ok().map(|data_dir| paths::templates_dir(&data_dir)),
        |dir| Some(dir.to_path_buf()),
    );

    let mut tera = Tera::default();

    if let Some(dir) = dir.filter(|dir| dir.exists()) {
        let glob_pattern = format!("{}/**/*.tera", dir.display());
        tera = Tera::new(&glob_pattern).map_err(|e| {
            Error::Template(format!("Failed to load templates from {}: {e}", dir.display()))
        })?;
    }

    for (name, content) in EMBEDDED_TEMPLATES.iter() {
        if tera.get_template(name).is_err() {
            tera.add_raw_template(name, content)
                .map_err(|e| Error::Template(format!("Embedded template {name} is invalid: {e}")))?;
        }
    }

    *TERA.write().map_err(|e| Error::Template(e.to_string()))? = Some(tera);

    Ok(())
}

/// Render a template with the given context.
///
/// Templates are lazy-loaded on first use.
///
/// # Errors
///
/// Returns an error if the template doesn't exist or rendering fails.
pub fn render(name: &str, context: &Context) -> Result<String> {
    let needs_init = TERA.read().map_err(|e| Error::Template(e.to_string()))?.is_none();

    if needs_init {
        init_templates(None)?;
    }

    let guard = TERA.read().map_err(|e| Error::Template(e.to_string()))?;
    let tera = guard.as_ref().ok_or_else(|| Error::Template("Templates not initialized".into()))?;
    let rendered = tera
        .render(name, context)
        .map_err(|e| Error::Template(format!("Failed to render template {name}: {e}")))?;
    drop(guard);

    Ok(rendered)
}

/// Reset the template cache, forcing re-initialization on next use.
///
/// # Errors
///
/// Returns an error if the write lock cannot be acquired.
pub fn reset_cache() -> Result<()> {
    *TERA.write().map_err(|e| Error::Template(e.to_string()))? = None;
    Ok(())
}

/// One line of the task list as the template sees it.
#[derive(Debug, Serialize)]
struct TaskRow<'a> {
    id: &'a str,
    title: &'a str,
    status: &'static str,
    marker: &'static str,
    due: Option<String>,
}

impl<'a> From<&'a Task> for TaskRow<'a> {
    fn from(task: &'a Task) -> Self {
        Self {
            id: task.id.as_str(),
            title: &task.title,
            status: task.status.as_str(),
            marker: match task.status {
                Status::ToDo => "[ ]",
                Status::InProgress => "[~]",
                Status::Completed => "[x]",
            },
            due: task.due_date.map(|date| date.format("%Y-%m-%d").to_string()),
        }
    }
}

/// Render the task list in display order.
///
/// # Errors
///
/// Returns an error if the template fails to render.
pub fn render_task_list(tasks: &[Task]) -> Result<String> {
    let rows: Vec<TaskRow<'_>> = tasks.iter().map(TaskRow::from).collect();
    let mut context = Context::new();
    context.insert("tasks", &rows);
    context.insert("completed", &tasks.iter().filter(|t| t.is_completed()).count());
    render(TASK_LIST, &context)
}

/// Render sign-in instructions for the given login URL.
///
/// # Errors
///
/// Returns an error if the template fails to render.
pub fn render_login(login_url: &str) -> Result<String> {
    let mut context = Context::new();
    context.insert("login_url", login_url);
    render(LOGIN, &context)
}

/// Render the watch mode banner.
///
/// # Errors
///
/// Returns an error if the template fails to render.
pub fn render_watch_help(push_url: &str) -> Result<String> {
    let mut context = Context::new();
    context.insert("push_url", push_url);
    render(WATCH_HELP, &context)
}

/// Get the list of all embedded template names.
#[must_use]
pub fn embedded_template_names() -> Vec<&'static str> {
    EMBEDDED_TEMPLATES.keys().copied().collect()
}
