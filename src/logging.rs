//! File logging for the client.
//!
//! Writes `tracing` events to `todo-live.log` in the data directory, so
//! stdout stays free for the task list. The file is rotated to
//! `todo-live.log.old` once it grows past [`MAX_LOG_SIZE`].
//!
//! `RUST_LOG` overrides the level; otherwise it is `info`, or `debug` when
//! `debug_logging` is set in the config.

use crate::error::Result;
use crate::paths;
use std::fs::{self, File, OpenOptions};
use std::panic;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Maximum log file size before rotation (1MB).
pub const MAX_LOG_SIZE: u64 = 1_048_576;

/// Open the log file for appending, rotating it first if too large.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be created.
pub fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    if let Ok(metadata) = fs::metadata(path) {
        if metadata.len() > MAX_LOG_SIZE {
            let _ = fs::rename(path, path.with_extension("log.old"));
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}

/// The level filter used when `RUST_LOG` is not set.
fn default_filter(debug: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if debug { "todo_live=debug,info" } else { "info" })
    })
}

/// Build a subscriber writing plain-text lines to `file`.
fn subscriber(file: File, filter: EnvFilter) -> impl tracing::Subscriber + Send + Sync {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .finish()
}

/// Route `tracing` output to the log file in `data_dir`.
///
/// Calling this more than once keeps the first subscriber.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened.
pub fn init(data_dir: &Path, debug: bool) -> Result<()> {
    let file = open_log_file(&paths::log_path(data_dir))?;
    if tracing::subscriber::set_global_default(subscriber(file, default_filter(debug))).is_err() {
        tracing::debug!("logging already initialised");
        return Ok(());
    }
    tracing::info!(version = crate::VERSION, "todo-live starting");
    Ok(())
}

/// Record panics in the log before the default hook prints them.
pub fn install_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        log_panic(info);
        original_hook(info);
    }));
}

#[allow(deprecated)] // PanicInfo is deprecated but PanicHookInfo requires Rust 1.81+
fn log_panic(info: &panic::PanicInfo<'_>) {
    let location = info.location().map_or_else(
        || "unknown".to_string(),
        |loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()),
    );
    let payload = panic_payload(info.payload());
    tracing::error!(%location, "panic: {payload}");
}

fn panic_payload(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = paths::log_path(&dir.path().join("nested"));
        open_log_file(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_log_rotation() {
        let dir = TempDir::new().unwrap();
        let path = paths::log_path(dir.path());

        let size = usize::try_from(MAX_LOG_SIZE + 1).unwrap();
        fs::write(&path, "x".repeat(size)).unwrap();

        open_log_file(&path).unwrap();

        assert!(path.with_extension("log.old").exists());
        assert!(fs::metadata(&path).unwrap().len() < MAX_LOG_SIZE);
    }

    #[test]
    fn test_small_log_is_kept() {
        let dir = TempDir::new().unwrap();
        let path = paths::log_path(dir.path());
        fs::write(&path, "earlier line\n").unwrap();

        open_log_file(&path).unwrap();

        assert!(!path.with_extension("log.old").exists());
        assert_eq!(fs::read_to_string(&path).unwrap(), "earlier line\n");
    }

    #[test]
    fn test_events_are_written_to_file() {
        let dir = TempDir::new().unwrap();
        let path = paths::log_path(dir.path());
        let file = open_log_file(&path).unwrap();

        tracing::subscriber::with_default(subscriber(file, EnvFilter::new("debug")), || {
            tracing::info!(id = "t1", "task created");
            tracing::debug!("push event");
        });

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("task created"));
        assert!(content.contains("id=\"t1\""));
        assert!(content.contains("push event"));
    }

    #[test]
    fn test_filter_drops_lower_levels() {
        let dir = TempDir::new().unwrap();
        let path = paths::log_path(dir.path());
        let file = open_log_file(&path).unwrap();

        tracing::subscriber::with_default(subscriber(file, EnvFilter::new("warn")), || {
            tracing::info!("quiet");
            tracing::warn!("loud");
        });

        let content = fs::read_to_string(&path).unwrap();
        assert!(!content.contains("quiet"));
        assert!(content.contains("loud"));
    }

    #[test]
    fn test_panic_payload() {
        let text: Box<dyn std::any::Any + Send> = Box::new("static message");
        assert_eq!(panic_payload(text.as_ref()), "static message");
        let owned: Box<dyn std::any::Any + Send> = Box::new(String::from("owned message"));
        assert_eq!(panic_payload(owned.as_ref()), "owned message");
        let other: Box<dyn std::any::Any + Send> = Box::new(42_u8);
        assert_eq!(panic_payload(other.as_ref()), "unknown panic payload");
    }
}
