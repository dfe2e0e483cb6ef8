//! dirwatch - run a command whenever watched directories change

use anyhow::Result;
use clap::{Parser, Subcommand};
use cli_lib::cmd;
use cli_lib::config::{AppConfig, Overrides};
use cli_lib::logging;
use std::path::PathBuf;
use watcher::FilterConfig;

/// dirwatch - Recursive directory watcher that runs a command on changes
#[derive(Parser)]
#[command(name = "dirwatch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (default: ~/.config/dirwatch/config.toml if present)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level or filter directives, e.g. "debug" or "watcher=trace"
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Also write logs to this file
    #[arg(long, global = true, value_name = "FILE")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch directories and run a command for each changed path
    Watch {
        #[command(flatten)]
        overrides: Overrides,

        /// Do not print the per-run report
        #[arg(short, long)]
        quiet: bool,
    },
    /// Show whether entry names are allowed or denied by the filter
    Check {
        /// Extra allow glob (repeatable)
        #[arg(long, value_name = "GLOB")]
        allow: Vec<String>,

        /// Extra deny glob (repeatable)
        #[arg(long, value_name = "GLOB")]
        deny: Vec<String>,

        /// Entry names to test
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Print the effective configuration
    Config {
        #[command(flatten)]
        overrides: Overrides,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_logging(cli.log_level.as_deref(), cli.log_file.as_deref());
    let _logging = logging::init(&config.log)?;

    match cli.command {
        Commands::Watch { overrides, quiet } => {
            config.apply(&overrides);
            cmd::watch::run(&config, quiet)
        }
        Commands::Check { allow, deny, names } => {
            let mut filter: FilterConfig = config.watch.filter.clone();
            filter.allow.extend(allow);
            filter.deny.extend(deny);
            cmd::check::run(&filter, &names)
        }
        Commands::Config { overrides } => {
            config.apply(&overrides);
            cmd::config::run(&config, cli.config.as_deref())
        }
    }
}
