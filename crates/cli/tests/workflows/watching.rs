//! Long-running `dirwatch watch` against a real directory tree

use crate::common::cli::wait_for;
use crate::dirwatch;
use anyhow::Result;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

const TIMEOUT: Duration = Duration::from_secs(10);

#[test]
fn test_command_runs_for_allowed_directories() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path().join("inbox");
    fs::create_dir(&root)?;
    let log = temp_dir.path().join("dirwatch.log");
    let out = temp_dir.path().join("handled.txt");

    let root_arg = root.display().to_string();
    let log_arg = log.display().to_string();
    let script = format!("echo \"$0\" >> '{}'", out.display());

    let _watcher = dirwatch!(
        temp_dir.path(),
        "--log-file",
        &log_arg,
        "watch",
        &root_arg,
        "--allow",
        "task-*",
        "--deny",
        "*",
        "--delay",
        "0.05",
        "--quiet",
        "--",
        "sh",
        "-c",
        &script
    )
    .spawn()?;

    let started = wait_for(TIMEOUT, || {
        fs::read_to_string(&log).map_or(false, |text| text.contains("Watching"))
    });
    assert!(started, "watcher did not start");

    fs::write(root.join("notes.txt"), "ignored")?;
    fs::create_dir(root.join("task-1"))?;

    let handled = wait_for(TIMEOUT, || {
        fs::read_to_string(&out).map_or(false, |text| text.contains("task-1"))
    });
    assert!(handled, "handler never saw task-1");

    let text = fs::read_to_string(&out)?;
    assert!(!text.contains("notes.txt"));
    Ok(())
}
