//! Terminal progress output for each run

use owo_colors::OwoColorize;
use std::io::{self, IsTerminal, Stdout, Write};
use std::path::Path;
use watcher::{ChangeSet, Reporter};

const RULE_WIDTH: usize = 80;

/// Prints a numbered block per run
///
/// ```text
/// ================================================================================
/// Run Number: 3
/// Files     : /srv/inbox/task-1
///             /srv/inbox/task-2
///
/// --------------------------------------------------------------------------------
/// ```
pub struct TerminalReporter<W = Stdout> {
    out: W,
    color: bool,
    run_number: u64,
}

impl TerminalReporter<Stdout> {
    /// Report to stdout, colored when stdout is a terminal
    pub fn stdout() -> Self {
        let color = io::stdout().is_terminal();
        Self::new(io::stdout(), color)
    }
}

impl<W: Write> TerminalReporter<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self {
            out,
            color,
            run_number: 0,
        }
    }

    pub fn run_number(&self) -> u64 {
        self.run_number
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_begin(&mut self, changes: &ChangeSet) -> io::Result<()> {
        writeln!(self.out, "{}", "=".repeat(RULE_WIDTH))?;

        let label = "Run Number:";
        if self.color {
            writeln!(self.out, "{} {}", label.bold(), self.run_number.yellow())?;
        } else {
            writeln!(self.out, "{} {}", label, self.run_number)?;
        }

        let files = changes
            .iter()
            .map(|path| self.paint_path(path))
            .collect::<Vec<_>>()
            .join("\n            ");
        writeln!(self.out, "Files     : {}", files)?;
        writeln!(self.out)
    }

    fn write_end(&mut self, discarded: &ChangeSet) -> io::Result<()> {
        writeln!(self.out)?;
        if !discarded.is_empty() {
            let names = discarded
                .iter()
                .map(|path| path.display().to_string())
                .collect::<Vec<_>>()
                .join(" ");
            if self.color {
                writeln!(self.out, "Ignoring changed files : {}", names.dimmed())?;
            } else {
                writeln!(self.out, "Ignoring changed files : {}", names)?;
            }
            writeln!(self.out)?;
        }
        writeln!(self.out, "{}", "-".repeat(RULE_WIDTH))?;
        self.out.flush()
    }

    fn paint_path(&self, path: &Path) -> String {
        let text = path.display().to_string();
        if self.color {
            text.cyan().to_string()
        } else {
            text
        }
    }
}

// Output is best-effort: a closed stdout must not stop the watcher.
impl<W: Write> Reporter for TerminalReporter<W> {
    fn monitor_count(&mut self, count: usize) {
        let line = format!("Watching {} directories", count);
        let _ = if self.color {
            writeln!(self.out, "{}", line.dimmed())
        } else {
            writeln!(self.out, "{}", line)
        };
    }

    fn begin_run(&mut self, changes: &ChangeSet) {
        self.run_number += 1;
        let _ = self.write_begin(changes);
    }

    fn end_run(&mut self, discarded: &ChangeSet) {
        let _ = self.write_end(discarded);
    }
}
