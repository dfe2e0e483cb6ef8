//! Reporting hooks for the runner
//!
//! Purely observational: nothing a reporter does feeds back into control
//! flow.

use crate::ChangeSet;

pub trait Reporter {
    /// Number of directories being watched
    fn monitor_count(&mut self, count: usize);

    /// A cycle is about to invoke the handler for `changes`
    fn begin_run(&mut self, changes: &ChangeSet);

    /// The cycle finished; `discarded` holds paths dropped by the drain step
    fn end_run(&mut self, discarded: &ChangeSet);
}

/// Reporter that does nothing, for headless use
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn monitor_count(&mut self, _count: usize) {}

    fn begin_run(&mut self, _changes: &ChangeSet) {}

    fn end_run(&mut self, _discarded: &ChangeSet) {}
}

impl<R: Reporter + ?Sized> Reporter for Box<R> {
    fn monitor_count(&mut self, count: usize) {
        (**self).monitor_count(count)
    }

    fn begin_run(&mut self, changes: &ChangeSet) {
        (**self).begin_run(changes)
    }

    fn end_run(&mut self, discarded: &ChangeSet) {
        (**self).end_run(discarded)
    }
}
