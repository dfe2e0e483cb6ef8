//! Handler trait for changed paths

use crate::WatchError;
use std::path::Path;

/// Work to do for one changed path
///
/// Called once per path in a change set, never concurrently. Errors (and
/// panics) are logged by the runner and do not stop the remaining paths or
/// later cycles.
pub trait ChangeHandler {
    fn handle(&mut self, path: &Path) -> anyhow::Result<()>;
}

impl<F> ChangeHandler for F
where
    F: FnMut(&Path) -> anyhow::Result<()>,
{
    fn handle(&mut self, path: &Path) -> anyhow::Result<()> {
        self(path)
    }
}

/// Make sure a changed path is still an existing directory
///
/// A directory can be removed between detection and handling; that case is
/// reported as [`WatchError::MissingChangedDirectory`] so handlers can tell
/// it apart from real failures.
pub fn require_directory(path: &Path) -> Result<(), WatchError> {
    match path.symlink_metadata() {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(WatchError::HandlerFailure {
            path: path.to_path_buf(),
            reason: "not a directory".to_string(),
        }),
        Err(_) => Err(WatchError::MissingChangedDirectory {
            path: path.to_path_buf(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_closure_is_a_handler() {
        let mut seen = Vec::new();
        let mut handler = |path: &Path| -> anyhow::Result<()> {
            seen.push(path.to_path_buf());
            Ok(())
        };

        handler.handle(Path::new("/w/task-1")).unwrap();
        drop(handler);
        assert_eq!(seen, vec![Path::new("/w/task-1")]);
    }

    #[test]
    fn test_require_directory() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("meta.json");
        fs::write(&file, b"{}").unwrap();

        assert!(require_directory(temp_dir.path()).is_ok());
        assert!(matches!(
            require_directory(&file),
            Err(WatchError::HandlerFailure { .. })
        ));
        assert!(matches!(
            require_directory(&temp_dir.path().join("gone")),
            Err(WatchError::MissingChangedDirectory { .. })
        ));
    }
}
