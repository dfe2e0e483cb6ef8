//! Tracing setup for the dirwatch binary
//!
//! Logs go to stderr so they never interleave with the run report on stdout.
//! `RUST_LOG` overrides the configured level.

use crate::config::LogConfig;
use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const DEFAULT_LEVEL: &str = "info";

/// Writer guard for the log file, held until [`flush`]
static FILE_GUARD: Mutex<Option<WorkerGuard>> = parking_lot::const_mutex(None);

/// Flushes the log file when dropped
#[must_use = "dropping the handle flushes and closes the log file"]
pub struct LoggingHandle(());

impl Drop for LoggingHandle {
    fn drop(&mut self) {
        flush();
    }
}

/// Flush and close the log file, if one is open
///
/// Safe to call more than once; also called before a forced exit, which
/// skips destructors.
pub fn flush() {
    drop(FILE_GUARD.lock().take());
}

/// Install the global subscriber
///
/// Keep the returned handle alive for the life of the program.
pub fn init(config: &LogConfig) -> Result<LoggingHandle> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => level_filter(config.level.as_deref().unwrap_or(DEFAULT_LEVEL))?,
    };

    let (file_layer, guard) = match config.file.as_deref() {
        Some(path) => {
            let (writer, guard) = file_writer(path)?;
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    *FILE_GUARD.lock() = guard;
    Ok(LoggingHandle(()))
}

/// Parse a level or directive list such as `info,watcher=debug`
pub fn level_filter(level: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(level).with_context(|| format!("Invalid log level '{}'", level))
}

fn file_writer(path: &Path) -> Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    let file_name = path
        .file_name()
        .with_context(|| format!("Log file path has no file name: {}", path.display()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    Ok(tracing_appender::non_blocking(appender))
}
