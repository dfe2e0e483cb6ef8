//! Error types for the directory watcher.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from watcher operations.
#[derive(Error, Debug)]
pub enum WatchError {
    /// The path vanished before it could be watched, or the OS watch limit
    /// was reached. Callers skip the path and carry on.
    #[error("Cannot watch {}: {reason}", path.display())]
    WatchUnavailable { path: PathBuf, reason: String },

    /// A changed directory was already gone when the handler looked at it.
    #[error("Changed directory no longer exists: {}", path.display())]
    MissingChangedDirectory { path: PathBuf },

    #[error("Handler failed for {}: {reason}", path.display())]
    HandlerFailure { path: PathBuf, reason: String },

    #[error("Invalid glob pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Notification backend error: {reason}")]
    Backend { reason: String },

    /// Shutdown was requested while waiting. Not a failure.
    #[error("Interrupted")]
    Interrupted,
}

impl WatchError {
    pub fn is_interrupted(&self) -> bool {
        matches!(self, WatchError::Interrupted)
    }

    pub(crate) fn unavailable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        WatchError::WatchUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<notify::Error> for WatchError {
    fn from(e: notify::Error) -> Self {
        let path = e.paths.first().cloned().unwrap_or_default();
        match e.kind {
            notify::ErrorKind::MaxFilesWatch => {
                WatchError::unavailable(path, "OS watch limit reached")
            }
            notify::ErrorKind::PathNotFound => WatchError::unavailable(path, "path not found"),
            notify::ErrorKind::Io(ref err) if err.kind() == io::ErrorKind::NotFound => {
                WatchError::unavailable(path, "path not found")
            }
            _ => WatchError::Backend {
                reason: e.to_string(),
            },
        }
    }
}
