//! Notification source implementations
//!
//! Provides a unified interface (NotifySource trait) over the handle-based
//! watch API of the OS, plus an in-memory source for tests.

pub mod memory;
pub mod native;

use crate::{RawEvent, WatchError, WatchHandle};
use std::path::Path;

pub use self::memory::{FsChange, InMemoryController, InMemorySource};
pub use self::native::NotifyBackend;

/// Handle-based, non-recursive directory notification capability
///
/// A source watches individual directories and reports events for their
/// direct children. Recursion is the caller's business (see
/// [`WatchRegistry`](crate::WatchRegistry)).
pub trait NotifySource {
    /// Start watching a single directory
    ///
    /// Fails with [`WatchError::WatchUnavailable`] if the path is gone or
    /// the OS watch limit is exhausted.
    fn add_watch(&mut self, path: &Path) -> Result<WatchHandle, WatchError>;

    /// Stop watching. Unknown handles are ignored.
    fn remove_watch(&mut self, handle: WatchHandle);

    /// Block until at least one event is available, then return every
    /// event currently queued
    ///
    /// Returns [`WatchError::Interrupted`] when shutdown is requested.
    fn blocking_read(&mut self) -> Result<Vec<RawEvent>, WatchError>;

    /// Return whatever is queued right now, possibly nothing
    fn non_blocking_read(&mut self) -> Result<Vec<RawEvent>, WatchError>;
}

impl<S: NotifySource + ?Sized> NotifySource for Box<S> {
    fn add_watch(&mut self, path: &Path) -> Result<WatchHandle, WatchError> {
        (**self).add_watch(path)
    }

    fn remove_watch(&mut self, handle: WatchHandle) {
        (**self).remove_watch(handle)
    }

    fn blocking_read(&mut self) -> Result<Vec<RawEvent>, WatchError> {
        (**self).blocking_read()
    }

    fn non_blocking_read(&mut self) -> Result<Vec<RawEvent>, WatchError> {
        (**self).non_blocking_read()
    }
}
