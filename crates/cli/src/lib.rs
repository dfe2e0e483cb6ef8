//! dirwatch command-line front end
//!
//! Loads configuration, sets up logging and signal handling, and runs the
//! watcher with either an external command or a logging handler.

pub mod cmd;
pub mod config;
pub mod handler;
pub mod logging;
pub mod reporter;
pub mod signal;
