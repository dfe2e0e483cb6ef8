//! Change sets: the deduplicated paths handed to the handler per cycle

use crate::platform::NotifySource;
use crate::{PathFilter, RawEvent, WatchRegistry};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// Deduplicated set of absolute changed paths
///
/// Iteration order is sorted, so each run visits paths in a stable order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    paths: BTreeSet<PathBuf>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the path was already present
    pub fn insert(&mut self, path: PathBuf) -> bool {
        self.paths.insert(path)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }
}

impl FromIterator<PathBuf> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = PathBuf>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ChangeSet {
    type Item = PathBuf;
    type IntoIter = std::collections::btree_set::IntoIter<PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.into_iter()
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a PathBuf;
    type IntoIter = std::collections::btree_set::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}

/// Turns a batch of raw events into a [`ChangeSet`], keeping the registry
/// in step with directories that appear and disappear
///
/// Events are handled strictly in arrival order. For each event:
/// - an allowed new directory is watched (together with any allowed
///   directories already inside it) before anything else happens, so files
///   written into it right away are not missed
/// - a self-removal purges the handle and any watches below its directory
/// - the absolute path is the handle's directory joined with the leaf name,
///   and it is kept only if the leaf name passes the filter
///
/// Events whose handle is no longer live contribute nothing.
pub struct ChangeSetBuilder<'a, S: ?Sized> {
    source: &'a mut S,
    registry: &'a mut WatchRegistry,
    filter: &'a PathFilter,
}

impl<'a, S> ChangeSetBuilder<'a, S>
where
    S: NotifySource + ?Sized,
{
    pub fn new(source: &'a mut S, registry: &'a mut WatchRegistry, filter: &'a PathFilter) -> Self {
        Self {
            source,
            registry,
            filter,
        }
    }

    pub fn build(&mut self, events: impl IntoIterator<Item = RawEvent>) -> ChangeSet {
        let mut changes = ChangeSet::new();

        for event in events {
            let allowed = self.filter.is_name_allowed(event.name());

            if event.is_dir_creation() && allowed {
                self.watch_new_directory(&event);
            } else if event.is_self_removal() {
                self.registry.remove_tree(&mut *self.source, event.handle);
            }

            let Some(dir) = self.registry.path_of(event.handle) else {
                trace!(handle = %event.handle, "Event for stale watch ignored");
                continue;
            };

            if !allowed {
                trace!(name = ?event.name(), "Filtered out");
                continue;
            }

            let path = match event.name() {
                Some(name) => dir.join(name),
                None => dir.to_path_buf(),
            };
            changes.insert(path);
        }

        changes
    }

    fn watch_new_directory(&mut self, event: &RawEvent) {
        let (Some(parent), Some(name)) = (self.registry.path_of(event.handle), event.name()) else {
            return;
        };
        let dir = parent.join(name);

        if let Err(e) = self.registry.add_watch(&mut *self.source, &dir) {
            warn!("{}", e);
            return;
        }

        let nested = self.registry.watch_tree(&mut *self.source, &dir, self.filter);
        if nested > 0 {
            debug!(dir = %dir.display(), nested, "Watched directories created with new directory");
        }
    }
}
