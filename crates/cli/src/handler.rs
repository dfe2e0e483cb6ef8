//! Change handlers the CLI can run

use crate::config::HandlerConfig;
use anyhow::{bail, Context, Result};
use parking_lot::Mutex;
use std::io;
use std::path::Path;
use std::process::{Child, Command, ExitStatus};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info};
use watcher::{require_directory, ChangeHandler, WatchError};

const CHILD_POLL: Duration = Duration::from_millis(20);

/// The command currently being run, shared with the signal handler so it
/// can be killed before the process exits
#[derive(Debug, Clone, Default)]
pub struct ChildSlot {
    inner: Arc<Mutex<Option<Child>>>,
}

impl ChildSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for `child` to exit, unless [`kill`](Self::kill) takes it first
    fn wait(&self, child: Child) -> io::Result<ExitStatus> {
        *self.inner.lock() = Some(child);

        loop {
            {
                let mut slot = self.inner.lock();
                let Some(child) = slot.as_mut() else {
                    return Err(io::Error::new(io::ErrorKind::Interrupted, "killed on shutdown"));
                };
                match child.try_wait() {
                    Ok(Some(status)) => {
                        slot.take();
                        return Ok(status);
                    }
                    Ok(None) => {}
                    Err(e) => {
                        slot.take();
                        return Err(e);
                    }
                }
            }
            thread::sleep(CHILD_POLL);
        }
    }

    /// Kill and reap the running command. Returns false if none was running.
    pub fn kill(&self) -> bool {
        let Some(mut child) = self.inner.lock().take() else {
            return false;
        };
        if let Err(e) = child.kill() {
            debug!("kill: {}", e);
        }
        let _ = child.wait();
        true
    }

    pub fn is_running(&self) -> bool {
        self.inner.lock().is_some()
    }
}

/// Runs an external program with the changed path as its last argument
#[derive(Debug, Clone)]
pub struct CommandHandler {
    program: String,
    args: Vec<String>,
    directories_only: bool,
    child: ChildSlot,
}

impl CommandHandler {
    /// `command` is the program followed by its leading arguments
    pub fn new(command: &[String], directories_only: bool) -> Result<Self> {
        let (program, args) = command
            .split_first()
            .context("Handler command must name a program")?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            directories_only,
            child: ChildSlot::new(),
        })
    }

    /// Publish running commands through `slot`
    pub fn with_child_slot(mut self, slot: ChildSlot) -> Self {
        self.child = slot;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl ChangeHandler for CommandHandler {
    fn handle(&mut self, path: &Path) -> Result<()> {
        if self.directories_only {
            match require_directory(path) {
                Ok(()) => {}
                Err(missing @ WatchError::MissingChangedDirectory { .. }) => return Err(missing.into()),
                Err(_) => {
                    debug!(path = %path.display(), "Skipping non-directory");
                    return Ok(());
                }
            }
        }

        info!(path = %path.display(), "Running {}", self.program);
        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .spawn()
            .with_context(|| format!("Failed to start {}", self.program))?;
        let status = self
            .child
            .wait(child)
            .with_context(|| format!("Failed waiting for {}", self.program))?;

        if !status.success() {
            bail!("{} {}", self.program, status);
        }
        Ok(())
    }
}

/// Logs each changed path and does nothing else
#[derive(Debug, Default, Clone, Copy)]
pub struct LogHandler;

impl ChangeHandler for LogHandler {
    fn handle(&mut self, path: &Path) -> Result<()> {
        info!("Changed: {}", path.display());
        Ok(())
    }
}

/// Build the configured handler; no command means [`LogHandler`]
pub fn from_config(config: &HandlerConfig, child: &ChildSlot) -> Result<Box<dyn ChangeHandler>> {
    if config.command.is_empty() {
        return Ok(Box::new(LogHandler));
    }
    let handler = CommandHandler::new(&config.command, config.directories_only)?
        .with_child_slot(child.clone());
    Ok(Box::new(handler))
}
