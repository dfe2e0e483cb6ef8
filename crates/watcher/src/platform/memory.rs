//! In-memory notification source
//!
//! Behaves like a handle-based OS watch API without touching the
//! filesystem. Tests describe filesystem changes as [`FsChange`]s; each one
//! is resolved against the watch table at the moment it is delivered, so a
//! change inside a directory that is not (yet) watched is dropped exactly as
//! the OS would drop it.
//!
//! When every scripted burst has been consumed, `blocking_read` reports
//! [`WatchError::Interrupted`], which ends a dispatcher loop cleanly.

use super::NotifySource;
use crate::{RawEvent, RawEventKind, WatchError, WatchHandle};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A simulated change to one filesystem entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsChange {
    pub path: PathBuf,
    pub is_dir: bool,
    pub kind: RawEventKind,
}

impl FsChange {
    fn new(path: impl Into<PathBuf>, is_dir: bool, kind: RawEventKind) -> Self {
        Self {
            path: path.into(),
            is_dir,
            kind,
        }
    }

    pub fn create_dir(path: impl Into<PathBuf>) -> Self {
        Self::new(path, true, RawEventKind::Create)
    }

    pub fn create_file(path: impl Into<PathBuf>) -> Self {
        Self::new(path, false, RawEventKind::Create)
    }

    pub fn modify(path: impl Into<PathBuf>) -> Self {
        Self::new(path, false, RawEventKind::Modify)
    }

    pub fn remove_dir(path: impl Into<PathBuf>) -> Self {
        Self::new(path, true, RawEventKind::Remove)
    }

    pub fn remove_file(path: impl Into<PathBuf>) -> Self {
        Self::new(path, false, RawEventKind::Remove)
    }

    pub fn move_dir_in(path: impl Into<PathBuf>) -> Self {
        Self::new(path, true, RawEventKind::MovedTo)
    }

    pub fn move_dir_out(path: impl Into<PathBuf>) -> Self {
        Self::new(path, true, RawEventKind::MovedFrom)
    }
}

#[derive(Debug, Default)]
struct State {
    next_handle: u64,
    watches: HashMap<WatchHandle, PathBuf>,
    pending: Vec<RawEvent>,
    bursts: VecDeque<Vec<FsChange>>,
    during_debounce: VecDeque<Vec<FsChange>>,
    unavailable: HashSet<PathBuf>,
    watch_limit: Option<usize>,
}

impl State {
    fn handle_of(&self, path: &Path) -> Option<WatchHandle> {
        self.watches
            .iter()
            .find(|(_, p)| p.as_path() == path)
            .map(|(h, _)| *h)
    }

    fn deliver(&mut self, changes: &[FsChange]) {
        for change in changes {
            let own = self.handle_of(&change.path);
            let parent = change.path.parent().and_then(|p| self.handle_of(p));

            if let (Some(parent), Some(name)) = (parent, change.path.file_name()) {
                self.pending.push(RawEvent::new(
                    parent,
                    Some(name.to_os_string()),
                    change.is_dir,
                    change.kind,
                ));
            }

            if let Some(own) = own {
                match change.kind {
                    RawEventKind::Remove | RawEventKind::MovedFrom => {
                        self.pending.push(RawEvent::self_removed(own));
                    }
                    _ if parent.is_none() => {
                        self.pending.push(RawEvent::new(own, None, true, change.kind));
                    }
                    _ => {}
                }
            }
        }
    }
}

/// Notification source backed by a scripted, in-memory event queue
#[derive(Debug, Default)]
pub struct InMemorySource {
    state: Arc<Mutex<State>>,
}

/// Script and inspect an [`InMemorySource`] from outside, including from
/// inside a running handler
#[derive(Debug, Clone)]
pub struct InMemoryController {
    state: Arc<Mutex<State>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn controller(&self) -> InMemoryController {
        InMemoryController {
            state: Arc::clone(&self.state),
        }
    }
}

impl InMemoryController {
    /// Queue changes that the next blocking read will deliver as one burst
    pub fn schedule_burst(&self, changes: impl IntoIterator<Item = FsChange>) {
        self.state
            .lock()
            .bursts
            .push_back(changes.into_iter().collect());
    }

    /// Deliver changes right now, as if they just happened
    pub fn apply_now(&self, changes: impl IntoIterator<Item = FsChange>) {
        let changes: Vec<_> = changes.into_iter().collect();
        self.state.lock().deliver(&changes);
    }

    /// Deliver changes right after the next blocking read returns, i.e.
    /// while the collector is sleeping through its debounce window
    pub fn arrive_during_debounce(&self, changes: impl IntoIterator<Item = FsChange>) {
        self.state
            .lock()
            .during_debounce
            .push_back(changes.into_iter().collect());
    }

    /// Make `add_watch` fail for this path, as if it vanished
    pub fn make_unavailable(&self, path: impl Into<PathBuf>) {
        self.state.lock().unavailable.insert(path.into());
    }

    /// Cap the number of simultaneous watches
    pub fn set_watch_limit(&self, limit: usize) {
        self.state.lock().watch_limit = Some(limit);
    }

    pub fn is_watched(&self, path: &Path) -> bool {
        self.state.lock().handle_of(path).is_some()
    }

    pub fn watch_count(&self) -> usize {
        self.state.lock().watches.len()
    }

    pub fn pending_count(&self) -> usize {
        self.state.lock().pending.len()
    }
}

impl NotifySource for InMemorySource {
    fn add_watch(&mut self, path: &Path) -> Result<WatchHandle, WatchError> {
        let mut state = self.state.lock();

        if let Some(handle) = state.handle_of(path) {
            return Ok(handle);
        }
        if state.unavailable.contains(path) {
            return Err(WatchError::unavailable(path, "path not found"));
        }
        if state.watch_limit.is_some_and(|limit| state.watches.len() >= limit) {
            return Err(WatchError::unavailable(path, "OS watch limit reached"));
        }

        state.next_handle += 1;
        let handle = WatchHandle::new(state.next_handle);
        state.watches.insert(handle, path.to_path_buf());
        Ok(handle)
    }

    fn remove_watch(&mut self, handle: WatchHandle) {
        self.state.lock().watches.remove(&handle);
    }

    fn blocking_read(&mut self) -> Result<Vec<RawEvent>, WatchError> {
        let mut state = self.state.lock();

        while state.pending.is_empty() {
            let Some(burst) = state.bursts.pop_front() else {
                return Err(WatchError::Interrupted);
            };
            state.deliver(&burst);
        }
        let batch = std::mem::take(&mut state.pending);

        if let Some(late) = state.during_debounce.pop_front() {
            state.deliver(&late);
        }

        Ok(batch)
    }

    fn non_blocking_read(&mut self) -> Result<Vec<RawEvent>, WatchError> {
        Ok(std::mem::take(&mut self.state.lock().pending))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    #[test]
    fn test_changes_resolve_against_parent_watch() {
        let mut source = InMemorySource::new();
        let control = source.controller();
        let root = source.add_watch(Path::new("/w")).unwrap();

        control.schedule_burst([
            FsChange::create_dir("/w/task-1"),
            FsChange::create_file("/w/task-1/meta.json"),
        ]);

        let events = source.blocking_read().unwrap();
        assert_eq!(
            events,
            vec![RawEvent::new(root, Some(OsString::from("task-1")), true, RawEventKind::Create)]
        );
    }

    #[test]
    fn test_exhausted_script_interrupts() {
        let mut source = InMemorySource::new();
        assert!(matches!(source.blocking_read(), Err(WatchError::Interrupted)));
        assert!(source.non_blocking_read().unwrap().is_empty());
    }

    #[test]
    fn test_watched_directory_removal_reports_self_removal() {
        let mut source = InMemorySource::new();
        let control = source.controller();
        let root = source.add_watch(Path::new("/w")).unwrap();
        let child = source.add_watch(Path::new("/w/task-1")).unwrap();

        control.apply_now([FsChange::remove_dir("/w/task-1")]);

        let events = source.non_blocking_read().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].handle, root);
        assert_eq!(events[1], RawEvent::self_removed(child));
    }

    #[test]
    fn test_late_changes_arrive_after_blocking_read() {
        let mut source = InMemorySource::new();
        let control = source.controller();
        source.add_watch(Path::new("/w")).unwrap();

        control.schedule_burst([FsChange::create_file("/w/a")]);
        control.arrive_during_debounce([FsChange::create_file("/w/b")]);

        assert_eq!(source.blocking_read().unwrap().len(), 1);
        assert_eq!(control.pending_count(), 1);
        assert_eq!(source.non_blocking_read().unwrap().len(), 1);
    }

    #[test]
    fn test_watch_failures() {
        let mut source = InMemorySource::new();
        let control = source.controller();
        control.make_unavailable("/w/gone");
        control.set_watch_limit(1);

        assert!(matches!(
            source.add_watch(Path::new("/w/gone")),
            Err(WatchError::WatchUnavailable { .. })
        ));
        source.add_watch(Path::new("/w")).unwrap();
        assert!(matches!(
            source.add_watch(Path::new("/w/other")),
            Err(WatchError::WatchUnavailable { .. })
        ));
        assert_eq!(control.watch_count(), 1);
    }
}
