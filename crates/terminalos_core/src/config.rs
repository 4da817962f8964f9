//! Runtime configuration resolved from the environment.
//!
//! # Responsibility
//! - Resolve the data directory and the file locations derived from it.
//! - Resolve collaborator settings (joke endpoint, installer program).
//!
//! # Invariants
//! - `data_dir` is always absolute after resolution.
//! - Resolution never touches the file system.

use crate::logging::default_log_level;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_HOME: &str = "TERMINALOS_HOME";
pub const ENV_LOG_LEVEL: &str = "TERMINALOS_LOG_LEVEL";
pub const ENV_JOKE_URL: &str = "TERMINALOS_JOKE_URL";
pub const ENV_JOKE_TIMEOUT_SECS: &str = "TERMINALOS_JOKE_TIMEOUT_SECS";
pub const ENV_PYTHON: &str = "TERMINALOS_PYTHON";

pub const DEFAULT_JOKE_URL: &str = "https://icanhazdadjoke.com/";
pub const DEFAULT_JOKE_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_PYTHON: &str = "python3";

const STORE_FILE_NAME: &str = "users.json";
const LOG_DIR_NAME: &str = "logs";
const MAX_JOKE_TIMEOUT_SECS: u64 = 60;

#[derive(Debug)]
pub enum ConfigError {
    CurrentDir(std::io::Error),
    InvalidValue { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CurrentDir(err) => write!(f, "failed to resolve current directory: {err}"),
            Self::InvalidValue { key, value } => write!(f, "invalid value for {key}: `{value}`"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CurrentDir(err) => Some(err),
            Self::InvalidValue { .. } => None,
        }
    }
}

/// Resolved application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub log_level: String,
    pub joke_url: String,
    pub joke_timeout: Duration,
    pub python: String,
}

impl AppConfig {
    /// Resolves configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        let cwd = std::env::current_dir().map_err(ConfigError::CurrentDir)?;
        Self::from_vars(&vars, &cwd)
    }

    /// Resolves configuration from an explicit variable map.
    ///
    /// Relative `TERMINALOS_HOME` values are resolved against `cwd`.
    pub fn from_vars(vars: &HashMap<String, String>, cwd: &Path) -> Result<Self, ConfigError> {
        let lookup = |key: &str| {
            vars.get(key)
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
        };

        let data_dir = match lookup(ENV_HOME) {
            Some(value) => {
                let path = PathBuf::from(value);
                if path.is_absolute() {
                    path
                } else {
                    cwd.join(path)
                }
            }
            None => cwd.to_path_buf(),
        };

        let joke_timeout = match lookup(ENV_JOKE_TIMEOUT_SECS) {
            Some(value) => match value.parse::<u64>() {
                Ok(secs) if (1..=MAX_JOKE_TIMEOUT_SECS).contains(&secs) => {
                    Duration::from_secs(secs)
                }
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: ENV_JOKE_TIMEOUT_SECS,
                        value: value.to_string(),
                    })
                }
            },
            None => Duration::from_secs(DEFAULT_JOKE_TIMEOUT_SECS),
        };

        let joke_url = lookup(ENV_JOKE_URL).unwrap_or(DEFAULT_JOKE_URL);
        if !(joke_url.starts_with("http://") || joke_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                key: ENV_JOKE_URL,
                value: joke_url.to_string(),
            });
        }

        Ok(Self {
            data_dir,
            log_level: lookup(ENV_LOG_LEVEL)
                .unwrap_or(default_log_level())
                .to_string(),
            joke_url: joke_url.to_string(),
            joke_timeout,
            python: lookup(ENV_PYTHON).unwrap_or(DEFAULT_PYTHON).to_string(),
        })
    }

    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(STORE_FILE_NAME)
    }

    /// Directory for rolling diagnostic logs.
    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join(LOG_DIR_NAME)
    }

    /// Directory holding per-user activity logs.
    pub fn activity_dir(&self) -> &Path {
        &self.data_dir
    }
}
