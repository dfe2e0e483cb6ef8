//! Watch registry: which handle observes which directory
//!
//! Seeded by a recursive walk of the roots at startup, grown when new
//! directories appear and shrunk when watched directories disappear.
//! Subtrees whose directory name fails the [`PathFilter`] are pruned from the
//! walk, so nothing underneath a denied directory is ever watched.

use crate::platform::NotifySource;
use crate::{PathFilter, WatchError, WatchHandle};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Mapping from live watch handles to the absolute directory they observe
#[derive(Debug, Default)]
pub struct WatchRegistry {
    watches: HashMap<WatchHandle, PathBuf>,
}

impl WatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Watch every root and every allowed subdirectory beneath it
    ///
    /// A root that cannot be watched is an error; an unwatchable
    /// subdirectory is skipped.
    pub fn seed<S>(source: &mut S, roots: &[PathBuf], filter: &PathFilter) -> Result<Self, WatchError>
    where
        S: NotifySource + ?Sized,
    {
        let mut registry = Self::new();

        for root in roots {
            let root = absolutize(root);
            registry.add_watch(source, &root)?;
            let nested = registry.watch_tree(source, &root, filter);
            debug!(root = %root.display(), nested, "Seeded watches");
        }

        info!("Watching {} directories", registry.count());
        Ok(registry)
    }

    /// Start watching a single directory
    pub fn add_watch<S>(&mut self, source: &mut S, path: &Path) -> Result<WatchHandle, WatchError>
    where
        S: NotifySource + ?Sized,
    {
        let handle = source.add_watch(path)?;
        debug!(%handle, path = %path.display(), "Watch added");
        self.watches.insert(handle, path.to_path_buf());
        Ok(handle)
    }

    /// Watch every allowed directory below `dir` (not `dir` itself)
    ///
    /// Returns the number of watches added. Entries that vanish during the
    /// walk, or that the source refuses, are skipped.
    pub fn watch_tree<S>(&mut self, source: &mut S, dir: &Path, filter: &PathFilter) -> usize
    where
        S: NotifySource + ?Sized,
    {
        let mut added = 0;

        let walker = WalkDir::new(dir)
            .min_depth(1)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| e.file_type().is_dir() && filter.is_name_allowed(Some(e.file_name())));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!(dir = %dir.display(), "Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            match self.add_watch(source, entry.path()) {
                Ok(_) => added += 1,
                Err(e) => warn!("{}", e),
            }
        }

        added
    }

    /// Stop watching. Removing an unknown handle is a no-op.
    pub fn remove_watch<S>(&mut self, source: &mut S, handle: WatchHandle) -> Option<PathBuf>
    where
        S: NotifySource + ?Sized,
    {
        let path = self.watches.remove(&handle)?;
        source.remove_watch(handle);
        debug!(%handle, path = %path.display(), "Watch removed");
        Some(path)
    }

    /// Stop watching `handle` and every watched directory below it
    ///
    /// For a directory that was deleted or moved away; no watch is left
    /// pointing into the old location.
    pub fn remove_tree<S>(&mut self, source: &mut S, handle: WatchHandle) -> Option<PathBuf>
    where
        S: NotifySource + ?Sized,
    {
        let path = self.remove_watch(source, handle)?;

        let nested: Vec<WatchHandle> = self
            .watches
            .iter()
            .filter(|(_, p)| p.starts_with(&path))
            .map(|(h, _)| *h)
            .collect();
        for nested_handle in nested {
            self.remove_watch(source, nested_handle);
        }

        Some(path)
    }

    /// Directory observed by `handle`, if it is still live
    pub fn path_of(&self, handle: WatchHandle) -> Option<&Path> {
        self.watches.get(&handle).map(PathBuf::as_path)
    }

    /// Handle watching `path`, if any
    pub fn handle_of(&self, path: &Path) -> Option<WatchHandle> {
        self.watches
            .iter()
            .find(|(_, p)| p.as_path() == path)
            .map(|(h, _)| *h)
    }

    pub fn contains_path(&self, path: &Path) -> bool {
        self.handle_of(path).is_some()
    }

    pub fn count(&self) -> usize {
        self.watches.len()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.watches.values().map(PathBuf::as_path)
    }
}

/// Make a root absolute, resolving symlinks when the path exists
fn absolutize(root: &Path) -> PathBuf {
    if let Ok(canonical) = root.canonicalize() {
        return canonical;
    }
    if root.is_absolute() {
        return root.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(root))
        .unwrap_or_else(|_| root.to_path_buf())
}
