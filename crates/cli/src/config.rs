//! Configuration file loading and command-line overrides
//!
//! Precedence: command-line flags, then the config file, then defaults.
//! The config file is `--config <file>` when given (must exist), otherwise
//! `~/.config/dirwatch/config.toml` when present.

use anyhow::{Context, Result};
use clap::Args;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use watcher::WatchConfig;

/// Full application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(flatten)]
    pub watch: WatchConfig,

    #[serde(default)]
    pub handler: HandlerConfig,

    #[serde(default)]
    pub log: LogConfig,
}

/// What to run for each changed path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerConfig {
    /// Program and leading arguments; the changed path is appended.
    /// Empty means log the path only.
    #[serde(default)]
    pub command: Vec<String>,

    /// Only hand directories to the command
    #[serde(default)]
    pub directories_only: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Level filter such as "info" or "watcher=debug" (RUST_LOG wins)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// Also write logs to this file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

/// Command-line overrides for the watch settings
#[derive(Debug, Clone, Default, Args)]
pub struct Overrides {
    /// Directories to watch recursively (replace configured roots)
    pub roots: Vec<PathBuf>,

    /// Always consider names matching this glob (repeatable, quote it)
    #[arg(long, value_name = "GLOB")]
    pub allow: Vec<String>,

    /// Ignore names matching this glob unless allowed (repeatable, quote it)
    #[arg(long, value_name = "GLOB")]
    pub deny: Vec<String>,

    /// Seconds to wait for more events after the first one (0 disables)
    #[arg(long, value_name = "SECS")]
    pub delay: Option<f64>,

    /// Discard events caused while the handler runs
    #[arg(long)]
    pub ignore_events: bool,

    /// Wait for the first change instead of running once at startup
    #[arg(long)]
    pub no_initial_run: bool,

    /// Only hand directories to the command
    #[arg(long)]
    pub dirs_only: bool,

    /// Command to run per changed path (path is appended)
    #[arg(last = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

impl AppConfig {
    /// Load from an explicit file, or from the default location if present
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_file(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::load_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Layer command-line flags over the loaded values
    pub fn apply(&mut self, overrides: &Overrides) {
        if !overrides.roots.is_empty() {
            self.watch.roots = overrides.roots.clone();
        }
        self.watch.filter.allow.extend(overrides.allow.iter().cloned());
        self.watch.filter.deny.extend(overrides.deny.iter().cloned());
        if let Some(delay) = overrides.delay {
            self.watch.delay_secs = delay;
        }
        if overrides.ignore_events {
            self.watch.ignore_events_during_run = true;
        }
        if overrides.no_initial_run {
            self.watch.skip_initial_run = true;
        }
        if overrides.dirs_only {
            self.handler.directories_only = true;
        }
        if !overrides.command.is_empty() {
            self.handler.command = overrides.command.clone();
        }
    }

    pub fn apply_logging(&mut self, level: Option<&str>, file: Option<&Path>) {
        if let Some(level) = level {
            self.log.level = Some(level.to_string());
        }
        if let Some(file) = file {
            self.log.file = Some(file.to_path_buf());
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}

/// `<config dir>/dirwatch/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("dirwatch").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
roots = ["/srv/pootle"]
delay_secs = 0.5
skip_initial_run = true

[filter]
allow = ["task-*"]
deny = ["*"]

[handler]
command = ["/usr/local/bin/import-task", "--verbose"]
directories_only = true

[log]
level = "debug"
"#;

    #[test]
    fn test_load_file() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, SAMPLE)?;

        let config = AppConfig::load(Some(&path))?;

        assert_eq!(config.watch.roots, vec![PathBuf::from("/srv/pootle")]);
        assert_eq!(config.watch.delay_secs, 0.5);
        assert!(config.watch.skip_initial_run);
        assert!(!config.watch.ignore_events_during_run);
        assert_eq!(config.watch.filter.deny, vec!["*"]);
        assert_eq!(config.handler.command.len(), 2);
        assert!(config.handler.directories_only);
        assert_eq!(config.log.level.as_deref(), Some("debug"));
        assert_eq!(config.log.file, None);
        Ok(())
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = AppConfig::load(Some(&temp_dir.path().join("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.toml");
        fs::write(&path, "roots = \"not a list\"").unwrap();

        let err = AppConfig::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_overrides_layer_on_file_values() {
        let mut config: AppConfig = toml::from_str(SAMPLE).unwrap();
        config.apply(&Overrides {
            roots: vec![PathBuf::from("/tmp/inbox")],
            allow: vec!["*.po".to_string()],
            delay: Some(0.0),
            ignore_events: true,
            command: vec!["echo".to_string()],
            ..Overrides::default()
        });

        assert_eq!(config.watch.roots, vec![PathBuf::from("/tmp/inbox")]);
        assert_eq!(config.watch.filter.allow, vec!["task-*", "*.po"]);
        assert_eq!(config.watch.filter.deny, vec!["*"]);
        assert_eq!(config.watch.delay_secs, 0.0);
        assert!(config.watch.ignore_events_during_run);
        assert!(config.watch.skip_initial_run);
        assert_eq!(config.handler.command, vec!["echo"]);
        assert!(config.handler.directories_only);
    }

    #[test]
    fn test_empty_overrides_keep_file_values() {
        let mut config: AppConfig = toml::from_str(SAMPLE).unwrap();
        let before = config.clone();
        config.apply(&Overrides::default());
        config.apply_logging(None, None);
        assert_eq!(config, before);
    }

    #[test]
    fn test_serialized_config_parses_back() -> Result<()> {
        let mut config: AppConfig = toml::from_str(SAMPLE)?;
        config.apply_logging(Some("trace"), Some(Path::new("/var/log/dirwatch.log")));

        let text = config.to_toml()?;
        let parsed: AppConfig = toml::from_str(&text)?;
        assert_eq!(parsed, config);
        Ok(())
    }

    #[test]
    fn test_default_path_location() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("dirwatch/config.toml"));
        }
    }
}
