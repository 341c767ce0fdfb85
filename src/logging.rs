// src/logging.rs

//! Subscriber setup.
//!
//! The filter comes from `--log-level` when given, otherwise from the
//! `QUERYDAG_LOG` variable (any `EnvFilter` directive, e.g.
//! `querydag::engine=debug,info`), otherwise `info`.
//!
//! Everything goes to stderr: stdout is reserved for the refined task store
//! or the dry-run plan.

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

use crate::cli::LogLevel;

/// Environment variable consulted when `--log-level` is absent.
pub const LOG_ENV_VAR: &str = "QUERYDAG_LOG";

const DEFAULT_FILTER: &str = "info";

/// Build the filter used by [`init_logging`].
///
/// An unparsable `QUERYDAG_LOG` falls back to the default rather than
/// aborting the run.
pub fn log_filter(cli_level: Option<LogLevel>) -> EnvFilter {
    if let Some(level) = cli_level {
        return EnvFilter::new(level.as_filter());
    }

    match std::env::var(LOG_ENV_VAR) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(&directives)
            .unwrap_or_else(|e| {
                eprintln!("querydag: ignoring {LOG_ENV_VAR}={directives:?}: {e}");
                EnvFilter::new(DEFAULT_FILTER)
            }),
        _ => EnvFilter::new(DEFAULT_FILTER),
    }
}

/// Install the global subscriber. Call once, before anything logs.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli_level))
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow!("installing tracing subscriber: {e}"))
}
