//! Workflow tests that run the built binary end to end

pub mod commands;
#[cfg(target_os = "linux")]
pub mod watching;
