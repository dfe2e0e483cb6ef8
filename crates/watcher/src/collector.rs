//! Event collection with a single debounce window
//!
//! Blocks until something happens, then waits out the debounce window once
//! and picks up whatever arrived meanwhile. The window is not re-armed by
//! the events it collects, so sustained write traffic still yields a batch
//! per window.

use crate::platform::NotifySource;
use crate::{RawEvent, Shutdown, WatchError};
use std::time::Duration;
use tracing::trace;

#[derive(Debug, Clone)]
pub struct EventCollector {
    debounce: Duration,
    shutdown: Shutdown,
}

impl EventCollector {
    pub fn new(debounce: Duration, shutdown: Shutdown) -> Self {
        Self { debounce, shutdown }
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Block for the next batch of raw events
    pub fn next_batch<S>(&self, source: &mut S) -> Result<Vec<RawEvent>, WatchError>
    where
        S: NotifySource + ?Sized,
    {
        let mut events = source.blocking_read()?;
        let first = events.len();

        if !self.debounce.is_zero() {
            self.shutdown.sleep(self.debounce)?;
            events.extend(source.non_blocking_read()?);
        }

        trace!(first, coalesced = events.len() - first, "Collected batch");
        Ok(events)
    }

    /// Take everything queued right now without waiting
    pub fn drain_pending<S>(&self, source: &mut S) -> Result<Vec<RawEvent>, WatchError>
    where
        S: NotifySource + ?Sized,
    {
        source.non_blocking_read()
    }
}
