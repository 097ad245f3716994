//! Configuration management.
//!
//! Settings come from three layers, later layers winning:
//!
//! 1. `config.toml` (`[dedup]` and `[logging]` sections)
//! 2. `UNIQFLOW_*` environment variables
//! 3. Command-line flags
//!
//! ```toml
//! [dedup]
//! unique_key = "${custom_id}"
//! retain_first = false
//! bulk_size = 500
//!
//! [logging]
//! format = "json"
//! filter = "uniqflow=debug"
//! file = "/var/log/uniqflow.log"
//! ```

use crate::services::deduplication::DeduplicationConfig;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "UNIQFLOW_CONFIG_PATH";

const APP_DIR: &str = "uniqflow";
const CONFIG_FILE: &str = "config.toml";

/// Main configuration for uniqflow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UniqflowConfig {
    /// Deduplication stage settings.
    pub dedup: DeduplicationConfig,
    /// Logging settings.
    #[serde(skip_serializing_if = "LoggingSettings::is_empty")]
    pub logging: LoggingSettings,
}

/// Logging section in config file.
///
/// Every field is optional; environment variables override them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Output format: `pretty` or `json`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// `EnvFilter` directive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    /// Log file path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl LoggingSettings {
    /// Returns true if no logging setting is present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.format.is_none() && self.filter.is_none() && self.file.is_none()
    }
}

/// Configuration together with the default-location files that were skipped.
#[derive(Debug)]
pub struct LoadedConfig {
    /// The effective configuration.
    pub config: UniqflowConfig,
    /// Config files that exist but could not be read or parsed.
    pub skipped: Vec<SkippedConfig>,
}

/// A config file ignored during default-location lookup.
#[derive(Debug)]
pub struct SkippedConfig {
    /// File that failed to load.
    pub path: PathBuf,
    /// Why it failed.
    pub error: Error,
}

impl UniqflowConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML for this structure.
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| Error::OperationFailed {
            operation: "parse_config_file".to_string(),
            cause: e.to_string(),
        })
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
            operation: "read_config_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;

        Self::from_toml(&contents)
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the following paths in order:
    /// 1. Platform-specific config dir (`~/.config/uniqflow/` on Linux)
    /// 2. XDG config dir (`~/.config/uniqflow/`) on other platforms
    ///
    /// Falls back to the default configuration if no readable config file is
    /// found. Files that exist but fail to load are reported in
    /// [`LoadedConfig::skipped`] so the caller can log them once logging is up.
    #[must_use]
    pub fn load_default() -> LoadedConfig {
        Self::load_first(&Self::default_paths())
    }

    /// Loads the first existing file in `paths` that parses.
    fn load_first(paths: &[PathBuf]) -> LoadedConfig {
        let mut skipped = Vec::new();
        for path in paths.iter().filter(|p| p.exists()) {
            match Self::load_from_file(path) {
                Ok(config) => return LoadedConfig { config, skipped },
                Err(error) => skipped.push(SkippedConfig {
                    path: path.clone(),
                    error,
                }),
            }
        }
        LoadedConfig {
            config: Self::default(),
            skipped,
        }
    }

    /// Candidate config file locations, most specific first.
    #[must_use]
    pub fn default_paths() -> Vec<PathBuf> {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Vec::new();
        };

        let platform_config = base_dirs.config_dir().join(APP_DIR).join(CONFIG_FILE);
        let xdg_config = base_dirs
            .home_dir()
            .join(".config")
            .join(APP_DIR)
            .join(CONFIG_FILE);

        if platform_config == xdg_config {
            vec![platform_config]
        } else {
            vec![platform_config, xdg_config]
        }
    }

    /// Loads configuration for the process.
    ///
    /// An explicit path (from `--config`) wins over `UNIQFLOW_CONFIG_PATH`,
    /// which wins over the default locations. Environment overrides are
    /// applied on top of whichever file was read.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly named file cannot be loaded or an
    /// environment override cannot be parsed.
    pub fn load(explicit: Option<&Path>) -> Result<LoadedConfig> {
        let env_path = std::env::var_os(CONFIG_PATH_ENV)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);

        let mut loaded = match explicit.map(Path::to_path_buf).or(env_path) {
            Some(path) => LoadedConfig {
                config: Self::load_from_file(&path)?,
                skipped: Vec::new(),
            },
            None => Self::load_default(),
        };
        loaded.config = loaded.config.with_env_overrides()?;
        Ok(loaded)
    }

    /// Applies `UNIQFLOW_*` environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if an override variable holds an unparseable value.
    pub fn with_env_overrides(mut self) -> Result<Self> {
        self.dedup = self.dedup.with_env_overrides()?;
        Ok(self)
    }

    /// Renders the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::OperationFailed {
            operation: "serialize_config".to_string(),
            cause: e.to_string(),
        })
    }
}
