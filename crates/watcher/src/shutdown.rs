//! Cooperative shutdown for the watch loop
//!
//! Triggering drops the only sender of an internal channel, so every
//! receiver (the backend's blocking read, the debounce sleep) wakes with a
//! disconnect immediately and keeps seeing it afterwards.

use crate::WatchError;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Shared shutdown signal
#[derive(Debug, Clone)]
pub struct Shutdown {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    sender: Mutex<Option<Sender<()>>>,
    receiver: Receiver<()>,
    triggered: AtomicBool,
    in_handler: AtomicBool,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, rx) = bounded(0);
        Self {
            inner: Arc::new(Inner {
                sender: Mutex::new(Some(tx)),
                receiver: rx,
                triggered: AtomicBool::new(false),
                in_handler: AtomicBool::new(false),
            }),
        }
    }

    /// Request shutdown. Idempotent.
    pub fn trigger(&self) {
        self.inner.triggered.store(true, Ordering::SeqCst);
        self.inner.sender.lock().take();
    }

    pub fn is_triggered(&self) -> bool {
        self.inner.triggered.load(Ordering::SeqCst)
    }

    /// Receiver that becomes disconnected once shutdown is triggered
    pub fn receiver(&self) -> Receiver<()> {
        self.inner.receiver.clone()
    }

    /// Sleep for `duration` unless shutdown is triggered first
    pub fn sleep(&self, duration: Duration) -> Result<(), WatchError> {
        if self.is_triggered() {
            return Err(WatchError::Interrupted);
        }
        if duration.is_zero() {
            return Ok(());
        }

        match self.inner.receiver.recv_timeout(duration) {
            Err(RecvTimeoutError::Timeout) => Ok(()),
            _ => Err(WatchError::Interrupted),
        }
    }

    /// Whether a handler invocation is currently running
    pub fn in_handler(&self) -> bool {
        self.inner.in_handler.load(Ordering::SeqCst)
    }

    /// Mark a handler invocation as running until the guard is dropped
    pub(crate) fn handler_scope(&self) -> HandlerScope<'_> {
        self.inner.in_handler.store(true, Ordering::SeqCst);
        HandlerScope { shutdown: self }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) struct HandlerScope<'a> {
    shutdown: &'a Shutdown,
}

impl Drop for HandlerScope<'_> {
    fn drop(&mut self) {
        self.shutdown.inner.in_handler.store(false, Ordering::SeqCst);
    }
}
