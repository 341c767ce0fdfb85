// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod merge;
pub mod snapshot;
pub mod store;
pub mod types;

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{ConfigFile, default_config_path, load_and_validate};
use crate::dag::{DependencyGraph, ExecutionPlan};
use crate::engine::{QueryRefiner, RefineOutcome, decompose_with_command};
use crate::exec::TaskFunctions;
use crate::store::TaskStore;

/// Entry point behind the binary.
///
/// Loads the config and the seed store (`--tasks`, else `[decompose].cmd`),
/// then either prints the plan (`--dry-run`) or runs the fail-open
/// refinement and prints the resulting store on stdout.
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_config(&config_path)?;

    let seed = load_seed(&args, &cfg).await?;
    info!(tasks = seed.len(), query = %args.query, "seed task store loaded");

    if args.dry_run {
        print_dry_run(&seed);
        return Ok(());
    }

    let functions = TaskFunctions::from_config(&cfg, &config_root_dir(&config_path))?;
    let mut refiner = QueryRefiner::new(functions);
    if !args.no_snapshots {
        if let Some(snapshots) = cfg.snapshots.store() {
            refiner = refiner.with_snapshots(snapshots);
        }
    }

    let refinement = refiner.refine(&args.query, seed).await;
    match &refinement.outcome {
        RefineOutcome::Completed(run) => {
            debug!(statuses = ?run.statuses, "refinement statuses");
        }
        RefineOutcome::CycleFallback(_) | RefineOutcome::FailedFallback(_) => {
            info!("printing the unmodified task store (fallback)");
        }
    }

    println!("{}", refinement.after.to_pretty_json()?);
    Ok(())
}

/// Load and validate the config, falling back to built-in defaults when the
/// *default* config path does not exist.
fn load_config(path: &Path) -> Result<ConfigFile> {
    if !path.exists() && path == default_config_path().as_path() {
        debug!(path = %path.display(), "no config file; using defaults");
        return Ok(ConfigFile::default());
    }
    Ok(load_and_validate(path)?)
}

async fn load_seed(args: &CliArgs, cfg: &ConfigFile) -> Result<TaskStore> {
    if let Some(path) = args.tasks.as_ref() {
        return Ok(TaskStore::load(path)?);
    }

    match cfg.decompose.as_ref() {
        Some(decompose) => {
            Ok(decompose_with_command(&decompose.cmd, &args.query, decompose.timeout()).await?)
        }
        None => bail!("no seed task store: pass --tasks <PATH> or configure [decompose].cmd"),
    }
}

/// Directory that relative paths inside the config (e.g. `template`) are
/// resolved against: the config file's parent, or the working directory for
/// a bare file name.
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Dry-run output: the execution plan, or the cycle diagnostic.
fn print_dry_run(seed: &TaskStore) {
    println!("querydag dry-run");
    println!("  declared tasks: {}", seed.len());
    println!();

    match DependencyGraph::build(seed) {
        Ok(graph) => print!("{}", ExecutionPlan::new(&graph)),
        Err(report) => print!("{report}"),
    }

    debug!("dry-run: no task executed");
}
