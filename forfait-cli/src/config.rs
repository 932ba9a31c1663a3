//! Optional TOML configuration, merged underneath the command-line flags.
//!
//! ```toml
//! fiscal_year = 2025
//! policy_file = "policy.csv"
//! activities_file = "activities.csv"
//! log_level = "info"
//! format = "json"
//! ```
//!
//! Relative file paths are resolved against the directory holding the
//! configuration file.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::cli::{Cli, OutputFormat};

/// Default tracing filter when neither `RUST_LOG` nor the config sets one.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Contents of a configuration file. Every key is optional.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub fiscal_year: Option<i32>,
    pub policy_file: Option<PathBuf>,
    pub activities_file: Option<PathBuf>,
    pub log_level: Option<String>,
    pub format: Option<OutputFormat>,
}

impl FileConfig {
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Reads `path` and resolves relative file paths against its directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if let Some(base) = path.parent() {
            config.policy_file = config.policy_file.map(|p| base.join(p));
            config.activities_file = config.activities_file.map(|p| base.join(p));
        }
        Ok(config)
    }
}

/// Effective settings after layering flags over the config file.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub fiscal_year: Option<i32>,
    pub policy_file: Option<PathBuf>,
    pub activities_file: Option<PathBuf>,
    pub log_level: String,
    pub format: OutputFormat,
    pub log_file: Option<PathBuf>,
}

impl Settings {
    /// Loads the config named by `--config`, if any, and merges `cli` over it.
    pub fn resolve(cli: &Cli) -> Result<Self, ConfigError> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Ok(Self::merge(cli, file))
    }

    pub fn merge(
        cli: &Cli,
        file: FileConfig,
    ) -> Self {
        Self {
            fiscal_year: cli.year.or(file.fiscal_year),
            policy_file: cli.policy.clone().or(file.policy_file),
            activities_file: cli.activities.clone().or(file.activities_file),
            log_level: file
                .log_level
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            format: cli.format.or(file.format).unwrap_or_default(),
            log_file: cli.log_file.clone(),
        }
    }
}
