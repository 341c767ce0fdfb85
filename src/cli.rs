// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::DEFAULT_CONFIG_FILE;

/// Command-line arguments for `querydag`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "querydag",
    version,
    about = "Refine a decomposed query by running its sub-tasks as a dependency graph.",
    long_about = None
)]
pub struct CliArgs {
    /// The user query being refined.
    #[arg(long, short, value_name = "TEXT")]
    pub query: String,

    /// Seed task store (JSON object of task name -> record).
    ///
    /// If omitted, `[decompose].cmd` from the config is run to produce it.
    #[arg(long, value_name = "PATH")]
    pub tasks: Option<PathBuf>,

    /// Path to the config file (TOML).
    ///
    /// Default: `QueryDag.toml` in the current working directory. A missing
    /// default config means "use built-in defaults".
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_FILE)]
    pub config: String,

    /// Analyse the task graph and print the execution plan without running
    /// any task.
    #[arg(long)]
    pub dry_run: bool,

    /// Do not write before/after snapshots, whatever the config says.
    #[arg(long)]
    pub no_snapshots: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// Overrides `QUERYDAG_LOG`; the default is `info`.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// The `EnvFilter` directive for this level.
    pub fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
