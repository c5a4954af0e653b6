//! Engine configuration resolved from the environment.
//!
//! | Variable                      | Meaning                               |
//! |-------------------------------|---------------------------------------|
//! | `STAFFING_DB_PATH`            | SQLite file (default: temp dir)       |
//! | `STAFFING_LOG_LEVEL`          | `trace..error` (default: build mode)  |
//! | `STAFFING_LOG_DIR`            | absolute dir; unset disables logging  |
//! | `STAFFING_EMPTY_REQUIREMENTS` | `full` or `none`                      |

use crate::logging::default_log_level;
use crate::scoring::{EmptyRequirements, ScoringPolicy};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DB_PATH_VAR: &str = "STAFFING_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "STAFFING_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "STAFFING_LOG_DIR";
pub const EMPTY_REQUIREMENTS_VAR: &str = "STAFFING_EMPTY_REQUIREMENTS";

const DEFAULT_DB_FILE_NAME: &str = "staffing.sqlite3";

/// Rejected configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub variable: &'static str,
    pub value: String,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid value `{}` for {}", self.value, self.variable)
    }
}

impl Error for ConfigError {}

/// Resolved engine settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// Logging stays off when `None`.
    pub log_dir: Option<PathBuf>,
    pub scoring: ScoringPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
            scoring: ScoringPolicy::default(),
        }
    }
}

impl EngineConfig {
    /// Reads the `STAFFING_*` process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves settings through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        if let Some(path) = read(DB_PATH_VAR) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = read(LOG_LEVEL_VAR) {
            config.log_level = level;
        }
        config.log_dir = read(LOG_DIR_VAR).map(PathBuf::from);
        if let Some(raw) = read(EMPTY_REQUIREMENTS_VAR) {
            config.scoring.empty_requirements =
                EmptyRequirements::parse(&raw).ok_or(ConfigError {
                    variable: EMPTY_REQUIREMENTS_VAR,
                    value: raw,
                })?;
        }
        Ok(config)
    }
}
