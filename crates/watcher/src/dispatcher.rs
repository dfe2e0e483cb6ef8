//! Runner: drives the handler over each change set
//!
//! One cycle is: report the change set, invoke the handler once per path,
//! optionally drain and discard whatever the handler itself stirred up,
//! report completion. Cycles never overlap and handler invocations are
//! strictly sequential.

use crate::platform::{NotifyBackend, NotifySource};
use crate::{ChangeHandler, ChangeMonitor, ChangeSet, Reporter, Shutdown, WatchConfig, WatchError};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use tracing::{debug, error, info, warn};

/// Behaviour switches for the runner
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Drop events produced while the handler runs
    pub ignore_events_during_run: bool,
    /// Do not run the handler once at startup
    pub skip_initial_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    /// Waiting for changes
    Idle,
    /// Invoking the handler
    Running,
    /// Discarding events caused by the run
    Draining,
}

/// Result of one dispatch cycle
#[derive(Debug, Default)]
pub struct CycleOutcome {
    /// Handler invocations made
    pub invoked: usize,
    /// One entry per failed invocation
    pub failures: Vec<WatchError>,
    /// Paths dropped by the drain step
    pub discarded: ChangeSet,
}

pub struct Runner<S, R> {
    monitor: ChangeMonitor<S>,
    reporter: R,
    options: RunOptions,
    shutdown: Shutdown,
    state: RunnerState,
    cycles: u64,
}

impl<R: Reporter> Runner<NotifyBackend, R> {
    /// Watch the configured roots with the platform notification backend
    pub fn from_config(config: &WatchConfig, reporter: R, shutdown: Shutdown) -> Result<Self, WatchError> {
        let source = NotifyBackend::new(&shutdown)?;
        let monitor = ChangeMonitor::new(source, config, shutdown.clone())?;
        Ok(Self::new(monitor, reporter, config.run_options(), shutdown))
    }
}

impl<S: NotifySource, R: Reporter> Runner<S, R> {
    pub fn new(monitor: ChangeMonitor<S>, reporter: R, options: RunOptions, shutdown: Shutdown) -> Self {
        Self {
            monitor,
            reporter,
            options,
            shutdown,
            state: RunnerState::Idle,
            cycles: 0,
        }
    }

    /// Run until shutdown
    ///
    /// Returns `Ok(())` when interrupted. Handler failures never end the
    /// loop; only a broken notification backend does.
    pub fn run<H>(&mut self, handler: &mut H) -> Result<(), WatchError>
    where
        H: ChangeHandler + ?Sized,
    {
        match self.run_loop(handler) {
            Err(WatchError::Interrupted) => {
                info!(cycles = self.cycles, "Shutdown requested, watcher stopped");
                self.state = RunnerState::Idle;
                Ok(())
            }
            other => other,
        }
    }

    fn run_loop<H>(&mut self, handler: &mut H) -> Result<(), WatchError>
    where
        H: ChangeHandler + ?Sized,
    {
        self.reporter.monitor_count(self.monitor.monitor_count());

        if !self.options.skip_initial_run {
            self.dispatch(ChangeSet::new(), handler)?;
        }

        loop {
            let changes = self.monitor.next_change_set()?;
            self.dispatch(changes, handler)?;
        }
    }

    /// Run one cycle over `changes`
    pub fn dispatch<H>(&mut self, changes: ChangeSet, handler: &mut H) -> Result<CycleOutcome, WatchError>
    where
        H: ChangeHandler + ?Sized,
    {
        self.cycles += 1;
        self.state = RunnerState::Running;
        self.reporter.begin_run(&changes);
        debug!(cycle = self.cycles, paths = changes.len(), "Cycle started");

        let mut outcome = CycleOutcome::default();
        for path in changes.iter() {
            if self.shutdown.is_triggered() {
                return Err(WatchError::Interrupted);
            }

            outcome.invoked += 1;
            if let Err(e) = self.invoke(handler, path) {
                match e {
                    WatchError::MissingChangedDirectory { .. } => warn!("{}", e),
                    _ => error!("{}", e),
                }
                outcome.failures.push(e);
            }
        }

        if self.options.ignore_events_during_run {
            self.state = RunnerState::Draining;
            outcome.discarded = self.monitor.clear()?;
            if !outcome.discarded.is_empty() {
                debug!(paths = outcome.discarded.len(), "Discarded changes made during run");
            }
        }

        self.reporter.end_run(&outcome.discarded);
        self.state = RunnerState::Idle;
        Ok(outcome)
    }

    fn invoke<H>(&self, handler: &mut H, path: &Path) -> Result<(), WatchError>
    where
        H: ChangeHandler + ?Sized,
    {
        let _scope = self.shutdown.handler_scope();

        match panic::catch_unwind(AssertUnwindSafe(|| handler.handle(path))) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(match e.downcast::<WatchError>() {
                Ok(missing @ WatchError::MissingChangedDirectory { .. }) => missing,
                Ok(other) => WatchError::HandlerFailure {
                    path: path.to_path_buf(),
                    reason: other.to_string(),
                },
                Err(e) => WatchError::HandlerFailure {
                    path: path.to_path_buf(),
                    reason: format!("{:#}", e),
                },
            }),
            Err(payload) => Err(WatchError::HandlerFailure {
                path: path.to_path_buf(),
                reason: format!("handler panicked: {}", panic_message(payload.as_ref())),
            }),
        }
    }

    pub fn state(&self) -> RunnerState {
        self.state
    }

    /// Cycles dispatched so far, including the initial run
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn monitor(&self) -> &ChangeMonitor<S> {
        &self.monitor
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
