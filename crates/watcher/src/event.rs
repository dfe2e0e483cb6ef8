//! Raw notification events and watch handles

use std::ffi::{OsStr, OsString};
use std::fmt;

/// Opaque identifier for one watched directory, issued by a
/// [`NotifySource`](crate::platform::NotifySource)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WatchHandle(u64);

impl WatchHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WatchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wd:{}", self.0)
    }
}

/// What happened to the entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawEventKind {
    /// Entry created
    Create,
    /// Entry contents or metadata changed
    Modify,
    /// Entry deleted
    Remove,
    /// Entry moved out of the watched directory
    MovedFrom,
    /// Entry moved into the watched directory
    MovedTo,
    /// The watched directory itself was deleted or moved away
    SelfRemoved,
}

/// One notification for one entry under a watched directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    /// Watch the event was delivered on
    pub handle: WatchHandle,
    /// Leaf name of the affected entry; `None` for the watched directory itself
    pub name: Option<OsString>,
    pub is_dir: bool,
    pub kind: RawEventKind,
}

impl RawEvent {
    pub fn new(handle: WatchHandle, name: Option<OsString>, is_dir: bool, kind: RawEventKind) -> Self {
        Self {
            handle,
            name,
            is_dir,
            kind,
        }
    }

    /// Event on the watched directory itself reporting its removal
    pub fn self_removed(handle: WatchHandle) -> Self {
        Self::new(handle, None, true, RawEventKind::SelfRemoved)
    }

    pub fn name(&self) -> Option<&OsStr> {
        self.name.as_deref()
    }

    /// A new directory appeared under the watched directory, either created
    /// in place or moved in from elsewhere
    pub fn is_dir_creation(&self) -> bool {
        self.is_dir
            && self.name.is_some()
            && matches!(self.kind, RawEventKind::Create | RawEventKind::MovedTo)
    }

    pub fn is_self_removal(&self) -> bool {
        self.kind == RawEventKind::SelfRemoved
    }
}
