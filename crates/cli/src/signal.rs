//! Ctrl-C handling

use crate::handler::ChildSlot;
use crate::logging;
use anyhow::{Context, Result};
use tracing::info;
use watcher::Shutdown;

/// Route SIGINT/SIGTERM to the watcher
///
/// While waiting for changes the signal stops the loop cleanly. While a
/// handler is running the process exits at once with status 0, after killing
/// the running command and flushing the log file.
pub fn install(shutdown: Shutdown, child: ChildSlot) -> Result<()> {
    ctrlc::set_handler(move || {
        if shutdown.in_handler() {
            if child.kill() {
                info!("Killed running handler command");
            }
            info!("Interrupted while handler was running, exiting");
            logging::flush();
            std::process::exit(0);
        }
        info!("Interrupted, stopping watcher");
        shutdown.trigger();
    })
    .context("Failed to install Ctrl-C handler")
}
