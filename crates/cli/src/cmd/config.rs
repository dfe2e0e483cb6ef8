//! Print the effective configuration

use crate::config::{default_config_path, AppConfig};
use anyhow::Result;
use owo_colors::OwoColorize;
use std::path::Path;

/// `source` is the file given with `--config`, if any
pub fn run(config: &AppConfig, source: Option<&Path>) -> Result<()> {
    let location = match source {
        Some(path) => path.display().to_string(),
        None => match default_config_path() {
            Some(path) if path.exists() => path.display().to_string(),
            Some(path) => format!("{} (not found, using defaults)", path.display()),
            None => "(no config directory, using defaults)".to_string(),
        },
    };

    println!("{}", "Effective Configuration".bold());
    println!("{}: {}\n", "Location".dimmed(), location.dimmed());
    print!("{}", config.to_toml()?);
    Ok(())
}
