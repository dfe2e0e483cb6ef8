//! `notify`-backed notification source
//!
//! Each directory gets its own non-recursive watch. Events arrive from
//! notify as absolute paths and are turned back into `(handle, leaf name)`
//! pairs by looking up the parent directory among the active watches.

use super::NotifySource;
use crate::{RawEvent, RawEventKind, Shutdown, WatchError, WatchHandle};
use crossbeam_channel::{select, unbounded, Receiver, TryRecvError};
use notify::event::{CreateKind, ModifyKind, RemoveKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// Notification source over the platform's recommended notify watcher
pub struct NotifyBackend {
    watcher: RecommendedWatcher,
    events: Receiver<notify::Result<Event>>,
    shutdown: Receiver<()>,
    next_handle: u64,
    by_handle: HashMap<WatchHandle, PathBuf>,
    by_path: HashMap<PathBuf, WatchHandle>,
}

impl NotifyBackend {
    pub fn new(shutdown: &Shutdown) -> Result<Self, WatchError> {
        let (tx, rx) = unbounded();
        let watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let _ = tx.send(res);
        })?;

        Ok(Self {
            watcher,
            events: rx,
            shutdown: shutdown.receiver(),
            next_handle: 1,
            by_handle: HashMap::new(),
            by_path: HashMap::new(),
        })
    }

    fn absorb(&self, message: notify::Result<Event>, out: &mut Vec<RawEvent>) {
        match message {
            Ok(event) => self.translate(event, out),
            Err(e) => warn!("Notification error: {}", e),
        }
    }

    fn drain_into(&self, out: &mut Vec<RawEvent>) -> Result<(), WatchError> {
        loop {
            match self.events.try_recv() {
                Ok(message) => self.absorb(message, out),
                Err(TryRecvError::Empty) => return Ok(()),
                Err(TryRecvError::Disconnected) => return Err(channel_closed()),
            }
        }
    }

    fn translate(&self, event: Event, out: &mut Vec<RawEvent>) {
        if event.need_rescan() {
            warn!("Notification queue overflowed, some changes may have been missed");
        }
        let dir_hint = is_dir_hint(&event.kind);

        let changes: Vec<(PathBuf, RawEventKind)> = match event.kind {
            EventKind::Access(_) => return,
            EventKind::Create(_) => tag(event.paths, RawEventKind::Create),
            EventKind::Remove(_) => tag(event.paths, RawEventKind::Remove),
            EventKind::Modify(ModifyKind::Name(mode)) => match mode {
                RenameMode::Both if event.paths.len() >= 2 => {
                    let mut paths = event.paths.into_iter();
                    let mut changes = Vec::with_capacity(2);
                    if let Some(from) = paths.next() {
                        changes.push((from, RawEventKind::MovedFrom));
                    }
                    if let Some(to) = paths.next() {
                        changes.push((to, RawEventKind::MovedTo));
                    }
                    changes
                }
                RenameMode::From => tag(event.paths, RawEventKind::MovedFrom),
                RenameMode::To => tag(event.paths, RawEventKind::MovedTo),
                _ => event
                    .paths
                    .into_iter()
                    .map(|p| {
                        let kind = if p.exists() {
                            RawEventKind::MovedTo
                        } else {
                            RawEventKind::MovedFrom
                        };
                        (p, kind)
                    })
                    .collect(),
            },
            EventKind::Modify(_) | EventKind::Any | EventKind::Other => {
                tag(event.paths, RawEventKind::Modify)
            }
        };

        for (path, kind) in changes {
            self.resolve(&path, kind, dir_hint, out);
        }
    }

    fn resolve(&self, path: &Path, kind: RawEventKind, dir_hint: Option<bool>, out: &mut Vec<RawEvent>) {
        let own = self.by_path.get(path).copied();
        let parent = path.parent().and_then(|p| self.by_path.get(p)).copied();
        let is_dir = own.is_some() || dir_hint.unwrap_or_else(|| path.is_dir());

        match (parent, path.file_name()) {
            (Some(parent), Some(name)) => {
                out.push(RawEvent::new(parent, Some(name.to_os_string()), is_dir, kind));
            }
            _ if own.is_none() => {
                trace!(path = %path.display(), "Dropping event outside watched directories");
            }
            _ => {}
        }

        if let Some(own) = own {
            match kind {
                RawEventKind::Remove | RawEventKind::MovedFrom => {
                    out.push(RawEvent::self_removed(own));
                }
                _ if parent.is_none() => out.push(RawEvent::new(own, None, true, kind)),
                _ => {}
            }
        }
    }
}

impl NotifySource for NotifyBackend {
    fn add_watch(&mut self, path: &Path) -> Result<WatchHandle, WatchError> {
        if let Some(handle) = self.by_path.get(path) {
            return Ok(*handle);
        }
        if !path.is_dir() {
            return Err(WatchError::unavailable(path, "not an existing directory"));
        }

        self.watcher
            .watch(path, RecursiveMode::NonRecursive)
            .map_err(|e| match WatchError::from(e) {
                WatchError::WatchUnavailable { reason, .. } => WatchError::unavailable(path, reason),
                other => other,
            })?;

        let handle = WatchHandle::new(self.next_handle);
        self.next_handle += 1;
        self.by_handle.insert(handle, path.to_path_buf());
        self.by_path.insert(path.to_path_buf(), handle);

        Ok(handle)
    }

    fn remove_watch(&mut self, handle: WatchHandle) {
        let Some(path) = self.by_handle.remove(&handle) else {
            return;
        };
        self.by_path.remove(&path);

        // The OS usually drops the watch itself once the directory is gone
        if let Err(e) = self.watcher.unwatch(&path) {
            debug!(path = %path.display(), "unwatch: {}", e);
        }
    }

    fn blocking_read(&mut self) -> Result<Vec<RawEvent>, WatchError> {
        loop {
            let first = select! {
                recv(self.events) -> message => message.map_err(|_| channel_closed())?,
                recv(self.shutdown) -> _ => return Err(WatchError::Interrupted),
            };

            let mut out = Vec::new();
            self.absorb(first, &mut out);
            self.drain_into(&mut out)?;

            if !out.is_empty() {
                return Ok(out);
            }
        }
    }

    fn non_blocking_read(&mut self) -> Result<Vec<RawEvent>, WatchError> {
        let mut out = Vec::new();
        self.drain_into(&mut out)?;
        Ok(out)
    }
}

fn tag(paths: Vec<PathBuf>, kind: RawEventKind) -> Vec<(PathBuf, RawEventKind)> {
    paths.into_iter().map(|p| (p, kind)).collect()
}

fn is_dir_hint(kind: &EventKind) -> Option<bool> {
    match kind {
        EventKind::Create(CreateKind::Folder) | EventKind::Remove(RemoveKind::Folder) => Some(true),
        EventKind::Create(CreateKind::File) | EventKind::Remove(RemoveKind::File) => Some(false),
        _ => None,
    }
}

fn channel_closed() -> WatchError {
    WatchError::Backend {
        reason: "notification channel closed".to_string(),
    }
}
