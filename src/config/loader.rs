// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Name of the config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "QueryDag.toml";

/// Read and deserialize a TOML config without semantic checks.
///
/// Missing sections get their serde defaults.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let raw: RawConfigFile = toml::from_str(&text)?;
    debug!(path = %path.display(), overrides = raw.task.len(), "config parsed");
    Ok(raw)
}

/// Read, deserialize and validate a config (see `validate.rs` for the
/// checks). Use this everywhere except tests poking at raw configs.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    ConfigFile::try_from(load_from_path(path)?)
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from(DEFAULT_CONFIG_FILE)
}
