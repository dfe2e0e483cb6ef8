//! Show whether entry names pass the allow/deny rules

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use watcher::{FilterConfig, PathFilter};

pub fn run(filter: &FilterConfig, names: &[String]) -> Result<()> {
    let verdicts = verdicts(filter, names)?;

    let width = names.iter().map(|n| n.len()).max().unwrap_or(0);
    for (name, allowed) in verdicts {
        if allowed {
            println!("{:width$}  {}", name, "allowed".green(), width = width);
        } else {
            println!("{:width$}  {}", name, "denied".dimmed(), width = width);
        }
    }
    Ok(())
}

/// Whether each name passes the filter, in input order
pub fn verdicts<'a>(filter: &FilterConfig, names: &'a [String]) -> Result<Vec<(&'a str, bool)>> {
    let filter = PathFilter::from_config(filter).context("Invalid filter patterns")?;
    Ok(names
        .iter()
        .map(|name| (name.as_str(), filter.is_allowed(name)))
        .collect())
}
