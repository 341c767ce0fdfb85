// src/config/validate.rs

use crate::config::model::{CommandSection, ConfigFile, RawConfigFile};
use crate::errors::{QueryDagError, Result};
use crate::types::TaskFnKind;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::QueryDagError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_task_functions(cfg)?;
    validate_decompose(cfg)?;
    validate_snapshots(cfg)?;
    Ok(())
}

fn validate_task_functions(cfg: &RawConfigFile) -> Result<()> {
    let mut users = Vec::new();
    if cfg.workflow.task_fn == TaskFnKind::Command {
        users.push("[workflow]".to_string());
    }
    for (name, task) in cfg.task.iter() {
        if task.task_fn == Some(TaskFnKind::Command) {
            users.push(format!("[task.{name}]"));
        }
    }

    if users.is_empty() {
        return Ok(());
    }

    match cfg.workflow.command.as_ref() {
        Some(command) => validate_command("[workflow.command]", command),
        None => Err(QueryDagError::ConfigError(format!(
            "{} uses task_fn = \"command\" but [workflow.command] is missing",
            users.join(", ")
        ))),
    }
}

fn validate_decompose(cfg: &RawConfigFile) -> Result<()> {
    match cfg.decompose.as_ref() {
        Some(command) => validate_command("[decompose]", command),
        None => Ok(()),
    }
}

fn validate_command(section: &str, command: &CommandSection) -> Result<()> {
    if command.cmd.trim().is_empty() {
        return Err(QueryDagError::ConfigError(format!(
            "{section}.cmd must not be empty"
        )));
    }
    if command.timeout_secs == Some(0) {
        return Err(QueryDagError::ConfigError(format!(
            "{section}.timeout_secs must be >= 1 (got 0)"
        )));
    }
    Ok(())
}

fn validate_snapshots(cfg: &RawConfigFile) -> Result<()> {
    let s = &cfg.snapshots;
    if !s.enabled {
        return Ok(());
    }

    for (key, label) in [("before", &s.before), ("after", &s.after)] {
        if label.trim().is_empty() {
            return Err(QueryDagError::ConfigError(format!(
                "[snapshots].{key} must not be empty"
            )));
        }
        if label.contains('/') || label.contains('\\') {
            return Err(QueryDagError::ConfigError(format!(
                "[snapshots].{key} must be a plain label, not a path (got '{label}')"
            )));
        }
    }

    if s.before == s.after {
        return Err(QueryDagError::ConfigError(format!(
            "[snapshots].before and [snapshots].after must differ (both '{}')",
            s.before
        )));
    }

    Ok(())
}
