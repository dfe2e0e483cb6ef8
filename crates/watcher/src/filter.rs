//! Allow/deny filtering of changed entry names
//!
//! Rules are shell-style globs evaluated against the leaf name of an entry,
//! never against its full path:
//! 1. Empty name (event on the watched directory itself) - always allowed
//! 2. Name matches an allow pattern - allowed
//! 3. Name matches a deny pattern - denied
//! 4. Otherwise - allowed
//!
//! Allow patterns win over deny patterns regardless of where they appear, so
//! `deny = ["*"]` with `allow = ["task-*"]` watches only `task-*` entries.

use crate::WatchError;
use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;

/// Leaf name filter built from a [`FilterConfig`]
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    allow: Vec<Pattern>,
    deny: Vec<Pattern>,
}

impl PathFilter {
    /// Compile allow and deny patterns
    pub fn new<A, D>(allow: A, deny: D) -> Result<Self, WatchError>
    where
        A: IntoIterator,
        A::Item: AsRef<str>,
        D: IntoIterator,
        D::Item: AsRef<str>,
    {
        Ok(Self {
            allow: compile(allow)?,
            deny: compile(deny)?,
        })
    }

    pub fn from_config(config: &FilterConfig) -> Result<Self, WatchError> {
        Self::new(&config.allow, &config.deny)
    }

    /// Check whether an entry name is of interest
    pub fn is_allowed(&self, name: &str) -> bool {
        if name.is_empty() {
            return true;
        }

        if self.allow.iter().any(|p| p.matches(name)) {
            return true;
        }

        if self.deny.iter().any(|p| p.matches(name)) {
            return false;
        }

        true
    }

    /// Same as [`is_allowed`](Self::is_allowed) for an optional OS name
    pub fn is_name_allowed(&self, name: Option<&OsStr>) -> bool {
        match name {
            Some(name) => self.is_allowed(&name.to_string_lossy()),
            None => true,
        }
    }

    pub fn allow_patterns(&self) -> impl Iterator<Item = &str> {
        self.allow.iter().map(Pattern::as_str)
    }

    pub fn deny_patterns(&self) -> impl Iterator<Item = &str> {
        self.deny.iter().map(Pattern::as_str)
    }
}

fn compile<I>(patterns: I) -> Result<Vec<Pattern>, WatchError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    patterns
        .into_iter()
        .map(|p| {
            let p = p.as_ref();
            Pattern::new(p).map_err(|e| WatchError::InvalidPattern {
                pattern: p.to_string(),
                reason: e.msg.to_string(),
            })
        })
        .collect()
}

/// Filter configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Names always considered in (quote globs on the shell)
    #[serde(default)]
    pub allow: Vec<String>,

    /// Names considered out unless allowed
    #[serde(default)]
    pub deny: Vec<String>,
}
