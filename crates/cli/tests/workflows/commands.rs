//! One-shot commands: check and config

use crate::dirwatch;
use anyhow::Result;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_check_reports_each_name() -> Result<()> {
    let temp_dir = TempDir::new()?;

    let result = dirwatch!(
        temp_dir.path(),
        "check",
        "--allow",
        "task-*",
        "--deny",
        "*",
        "task-1",
        "notes.txt"
    )
    .assert_success()?;

    let lines: Vec<&str> = result.stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("task-1") && lines[0].contains("allowed"));
    assert!(lines[1].starts_with("notes.txt") && lines[1].contains("denied"));
    Ok(())
}

#[test]
fn test_check_rejects_bad_pattern() -> Result<()> {
    let temp_dir = TempDir::new()?;

    let result = dirwatch!(temp_dir.path(), "check", "--deny", "[oops", "a").assert_failure()?;
    assert!(result.contains_stderr("Invalid filter patterns"));
    Ok(())
}

#[test]
fn test_config_merges_file_and_flags() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config_path = temp_dir.path().join("dirwatch.toml");
    fs::write(
        &config_path,
        "roots = [\"/srv/pootle\"]\ndelay_secs = 0.5\n\n[filter]\ndeny = [\"*\"]\n",
    )?;
    let config_arg = config_path.display().to_string();

    let result = dirwatch!(
        temp_dir.path(),
        "--config",
        &config_arg,
        "config",
        "/tmp/inbox",
        "--allow",
        "task-*",
        "--no-initial-run"
    )
    .assert_success()?;

    assert!(result.contains_stdout(&config_arg));
    assert!(result.contains_stdout("/tmp/inbox"));
    assert!(!result.contains_stdout("/srv/pootle"));
    assert!(result.contains_stdout("delay_secs = 0.5"));
    assert!(result.contains_stdout("skip_initial_run = true"));
    assert!(result.contains_stdout("task-*"));
    Ok(())
}

#[test]
fn test_config_without_file_uses_defaults() -> Result<()> {
    let temp_dir = TempDir::new()?;

    let result = dirwatch!(temp_dir.path(), "config").assert_success()?;
    assert!(result.contains_stdout("using defaults"));
    assert!(result.contains_stdout("delay_secs = 0.1"));
    Ok(())
}

#[test]
fn test_explicit_config_must_exist() -> Result<()> {
    let temp_dir = TempDir::new()?;

    let result = dirwatch!(temp_dir.path(), "--config", "missing.toml", "config").assert_failure()?;
    assert!(result.contains_stderr("Failed to read config file"));
    Ok(())
}

#[test]
fn test_watch_needs_a_root() -> Result<()> {
    let temp_dir = TempDir::new()?;

    let result = dirwatch!(temp_dir.path(), "watch", "--quiet").assert_failure()?;
    assert!(result.contains_stderr("Invalid watch configuration"));
    Ok(())
}

#[test]
fn test_watch_fails_on_missing_root() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let missing = temp_dir.path().join("nowhere").display().to_string();

    let result = dirwatch!(temp_dir.path(), "watch", &missing, "--quiet").assert_failure()?;
    assert!(result.contains_stderr("Failed to start watching"));
    Ok(())
}
