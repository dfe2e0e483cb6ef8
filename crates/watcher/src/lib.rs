//! Recursive directory watching for dirwatch
//!
//! This crate turns low-level, per-directory notifications into debounced,
//! filtered batches of changed paths and drives a handler over each batch:
//! - Recursive watch registry that follows directories as they come and go
//! - Allow/deny glob filtering on entry names
//! - Single-window debouncing of event bursts
//! - Sequential handler dispatch with optional discarding of self-inflicted
//!   events
//!
//! ```no_run
//! use std::path::Path;
//! use watcher::{NullReporter, Runner, Shutdown, WatchConfig};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut config = WatchConfig::new(["/srv/inbox"]);
//! config.filter.allow = vec!["task-*".into()];
//! config.filter.deny = vec!["*".into()];
//!
//! let mut runner = Runner::from_config(&config, NullReporter, Shutdown::new())?;
//! runner.run(&mut |path: &Path| -> anyhow::Result<()> {
//!     println!("changed: {}", path.display());
//!     Ok(())
//! })?;
//! # Ok(())
//! # }
//! ```

pub mod changeset;
pub mod collector;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod filter;
pub mod handler;
pub mod monitor;
pub mod platform;
pub mod registry;
pub mod reporter;
pub mod shutdown;

pub use changeset::{ChangeSet, ChangeSetBuilder};
pub use collector::EventCollector;
pub use config::WatchConfig;
pub use dispatcher::{CycleOutcome, RunOptions, Runner, RunnerState};
pub use error::WatchError;
pub use event::{RawEvent, RawEventKind, WatchHandle};
pub use filter::{FilterConfig, PathFilter};
pub use handler::{require_directory, ChangeHandler};
pub use monitor::ChangeMonitor;
pub use platform::{FsChange, InMemoryController, InMemorySource, NotifyBackend, NotifySource};
pub use registry::WatchRegistry;
pub use reporter::{NullReporter, Reporter};
pub use shutdown::Shutdown;
