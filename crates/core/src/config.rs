//! TOML-based configuration for gittr tooling.
//!
//! Every section is optional; a missing file section falls back to the
//! defaults documented on each field.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::ConfigError;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level application configuration loaded from a TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub log: LogConfig,

    /// Which repository and branch a check runs against by default.
    #[serde(default)]
    pub repository: RepositoryConfig,

    /// Limits on what gets read into a base snapshot.
    #[serde(default)]
    pub snapshot: SnapshotConfig,
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Minimum tracing level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "warn".into()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Repository
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Local repository used when `--repo` is not given.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Branch pull requests target when none is named (default `main`).
    #[serde(default = "default_target_branch")]
    pub default_target_branch: String,
}

fn default_target_branch() -> String {
    "main".into()
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            path: None,
            default_target_branch: default_target_branch(),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Files larger than this are left out of snapshots (default 1 MiB).
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,

    /// Leave binary blobs out of snapshots (default true).
    #[serde(default = "default_true")]
    pub skip_binary: bool,
}

fn default_max_file_bytes() -> u64 {
    1024 * 1024
}
fn default_true() -> bool {
    true
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: default_max_file_bytes(),
            skip_binary: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading & validation
// ---------------------------------------------------------------------------

impl AppConfig {
    /// Load an [`AppConfig`] from a TOML file at the given path.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading configuration");

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        debug!("configuration parsed successfully");
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        match Self::load_from_file(path) {
            Err(ConfigError::FileNotFound(missing)) => {
                debug!(path = %missing, "no configuration file, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Validate that all fields are sane.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !LOG_LEVELS.contains(&self.log.level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "log.level".into(),
                detail: format!("must be one of {}", LOG_LEVELS.join(", ")),
            });
        }
        if self.repository.default_target_branch.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "repository.default_target_branch".into(),
                detail: "target branch must not be empty".into(),
            });
        }
        if self.snapshot.max_file_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "snapshot.max_file_bytes".into(),
                detail: "max file size must be > 0".into(),
            });
        }
        Ok(())
    }

    /// Render the configuration back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}
