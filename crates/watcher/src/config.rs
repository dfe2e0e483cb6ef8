//! Watcher configuration

use crate::{FilterConfig, PathFilter, WatchError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Startup configuration for one watcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Root directories, watched recursively
    #[serde(default)]
    pub roots: Vec<PathBuf>,

    /// Seconds to keep collecting after the first event (default: 0.1,
    /// 0 disables coalescing)
    #[serde(default = "default_delay_secs")]
    pub delay_secs: f64,

    /// Discard events caused while the handler runs (default: false)
    #[serde(default)]
    pub ignore_events_during_run: bool,

    /// Wait for the first change instead of running once at startup
    /// (default: false)
    #[serde(default)]
    pub skip_initial_run: bool,

    // Tables must follow plain keys when serialized to TOML
    #[serde(default)]
    pub filter: FilterConfig,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            roots: vec![],
            delay_secs: default_delay_secs(),
            ignore_events_during_run: false,
            skip_initial_run: false,
            filter: FilterConfig::default(),
        }
    }
}

fn default_delay_secs() -> f64 {
    0.1
}

impl WatchConfig {
    pub fn new(roots: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<(), WatchError> {
        if self.roots.is_empty() {
            return Err(WatchError::InvalidConfig {
                reason: "at least one root directory is required".to_string(),
            });
        }
        if Duration::try_from_secs_f64(self.delay_secs).is_err() {
            return Err(WatchError::InvalidConfig {
                reason: format!(
                    "delay must be a non-negative, representable number of seconds, got {}",
                    self.delay_secs
                ),
            });
        }
        PathFilter::from_config(&self.filter)?;
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::try_from_secs_f64(self.delay_secs).unwrap_or(Duration::ZERO)
    }

    pub fn run_options(&self) -> crate::RunOptions {
        crate::RunOptions {
            ignore_events_during_run: self.ignore_events_during_run,
            skip_initial_run: self.skip_initial_run,
        }
    }
}
