//! File-based persistence for the bearer token.
//!
//! The token is the only state the client keeps between runs. It is written
//! to `<data dir>/token`, readable only by the owner on unix.

use crate::auth::BearerToken;
use crate::error::Result;
use crate::paths;
use crate::traits::TokenStore;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Token store backed by a single file.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    /// Path to the token file.
    path: PathBuf,
}

impl FileTokenStore {
    /// Create a store for the token file inside a data directory.
    #[must_use]
    pub fn new(data_dir: &Path) -> Self {
        Self { path: paths::token_path(data_dir) }
    }

    /// Create a store with a specific file path.
    #[must_use]
    pub const fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Get the token file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<BearerToken>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(BearerToken::new(&content).ok())
    }

    fn save(&self, token: &BearerToken) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = open_private(&self.path)?;
        file.write_all(token.expose().as_bytes())?;
        // An existing file keeps the mode it was created with.
        restrict_permissions(&self.path)?;
        tracing::debug!(path = %self.path.display(), "token saved");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "token removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Open the token file for writing, creating it owner-only on unix.
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
const fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
