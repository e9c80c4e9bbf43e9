//! Runtime configuration resolved from the environment.
//!
//! # Invariants
//! - Missing variables fall back to defaults; malformed values are errors.
//! - `db_path = None` selects an in-memory store.

use crate::logging::default_log_level;
use crate::repo::RepoResult;
use crate::store::Store;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "STASHBOX_DB_PATH";
pub const ENV_DEMO_MODE: &str = "STASHBOX_DEMO_MODE";
pub const ENV_LOG_LEVEL: &str = "STASHBOX_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "STASHBOX_LOG_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidBool { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBool { key, value } => write!(
                f,
                "`{key}` must be one of 1|0|true|false|yes|no|on|off, got `{value}`"
            ),
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StashboxConfig {
    /// SQLite file path; `None` keeps everything in memory.
    pub db_path: Option<PathBuf>,
    /// Wipe and re-seed canonical demo data when a session starts.
    pub demo_mode: bool,
    pub log_level: String,
    /// Absolute directory for rolling log files; `None` disables file logging.
    pub log_dir: Option<PathBuf>,
}

impl Default for StashboxConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            demo_mode: false,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl StashboxConfig {
    /// Reads `STASHBOX_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|trimmed| !trimmed.is_empty())
        };

        let defaults = Self::default();
        let demo_mode = match value(ENV_DEMO_MODE) {
            Some(raw) => parse_bool(ENV_DEMO_MODE, &raw)?,
            None => defaults.demo_mode,
        };
        Ok(Self {
            db_path: value(ENV_DB_PATH).map(PathBuf::from),
            demo_mode,
            log_level: value(ENV_LOG_LEVEL).unwrap_or(defaults.log_level),
            log_dir: value(ENV_LOG_DIR).map(PathBuf::from),
        })
    }

    /// Opens the store this configuration points at.
    pub fn open_store(&self) -> RepoResult<Store> {
        match &self.db_path {
            Some(path) => Store::open(path),
            None => Store::open_in_memory(),
        }
    }
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            key,
            value: raw.to_string(),
        }),
    }
}
