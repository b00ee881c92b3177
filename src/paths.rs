//! Path utilities for determining data storage locations.
//!
//! All client state lives in one data directory: `$TODO_LIVE_HOME` when set,
//! otherwise `~/.todo-live/`.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Environment variable that overrides the data directory.
pub const HOME_ENV_VAR: &str = "TODO_LIVE_HOME";

/// The data directory name under the user's home.
const DATA_DIR_NAME: &str = ".todo-live";

/// The persisted bearer token filename.
pub const TOKEN_FILENAME: &str = "token";

/// The config filename.
pub const CONFIG_FILENAME: &str = "config.yaml";

/// The log filename.
pub const LOG_FILENAME: &str = "todo-live.log";

/// The directory holding template overrides.
pub const TEMPLATES_DIRNAME: &str = "templates";

/// Get the default data directory, `~/.todo-live/`.
///
/// Returns `None` if the home directory cannot be determined.
#[must_use]
pub fn default_data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(DATA_DIR_NAME))
}

/// Resolve the data directory, honouring `$TODO_LIVE_HOME`.
///
/// # Errors
///
/// Returns a config error if neither the override nor a home directory is available.
pub fn data_dir() -> Result<PathBuf> {
    match std::env::var_os(HOME_ENV_VAR) {
        Some(dir) if !dir.is_empty() => Ok(PathBuf::from(dir)),
        _ => default_data_dir()
            .ok_or_else(|| Error::Config("cannot determine home directory".to_string())),
    }
}

/// Path of the persisted token inside a data directory.
#[must_use]
pub fn token_path(data_dir: &Path) -> PathBuf {
    data_dir.join(TOKEN_FILENAME)
}

/// Path of the config file inside a data directory.
#[must_use]
pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILENAME)
}

/// Path of the log file inside a data directory.
#[must_use]
pub fn log_path(data_dir: &Path) -> PathBuf {
    data_dir.join(LOG_FILENAME)
}

/// Path of the template override directory inside a data directory.
#[must_use]
pub fn templates_dir(data_dir: &Path) -> PathBuf {
    data_dir.join(TEMPLATES_DIRNAME)
}
