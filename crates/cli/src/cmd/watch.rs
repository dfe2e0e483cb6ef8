//! Watch directories and run the handler on every change set

use crate::config::AppConfig;
use crate::handler::ChildSlot;
use crate::reporter::TerminalReporter;
use crate::{handler, signal};
use anyhow::{Context, Result};
use tracing::info;
use watcher::{NullReporter, Reporter, Runner, Shutdown};

pub fn run(config: &AppConfig, quiet: bool) -> Result<()> {
    config.watch.validate().context("Invalid watch configuration")?;

    let shutdown = Shutdown::new();
    let child = ChildSlot::new();
    signal::install(shutdown.clone(), child.clone())?;

    let mut handler = handler::from_config(&config.handler, &child)?;
    let reporter: Box<dyn Reporter> = if quiet {
        Box::new(NullReporter)
    } else {
        Box::new(TerminalReporter::stdout())
    };

    info!(
        roots = ?config.watch.roots,
        delay_secs = config.watch.delay_secs,
        "Starting watcher"
    );
    let mut runner = Runner::from_config(&config.watch, reporter, shutdown)
        .context("Failed to start watching")?;

    runner.run(handler.as_mut()).context("Watcher stopped")?;
    info!(runs = runner.cycles(), "Watcher finished");
    Ok(())
}
