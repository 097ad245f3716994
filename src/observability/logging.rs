//! Structured logging configuration.

use crate::config::LoggingSettings;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

const DEFAULT_FILTER: &str = "info";
const VERBOSE_FILTER: &str = "debug";

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Returns the format name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pretty => "pretty",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" | "human" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(Error::InvalidInput(format!("Unknown log format: {other}"))),
        }
    }
}

/// Resolved logging configuration.
///
/// # Precedence
///
/// | Setting | `--verbose` | Environment | Config file | Default |
/// |---------|-------------|-------------|-------------|---------|
/// | filter | `debug` | `RUST_LOG` | `logging.filter` | `info` |
/// | format | - | `UNIQFLOW_LOG_FORMAT` | `logging.format` | `pretty` |
/// | file | - | `UNIQFLOW_LOG_FILE` | `logging.file` | stderr |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Output format.
    pub format: LogFormat,
    /// `EnvFilter` directive string, e.g. `uniqflow=debug`.
    pub filter: String,
    /// Append log lines to this file instead of stderr.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            filter: DEFAULT_FILTER.to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Builds logging configuration from environment variables.
    #[must_use]
    pub fn from_env(verbose: bool) -> Self {
        Self::from_settings(None, verbose)
    }

    /// Builds logging configuration from config settings with env overrides.
    #[must_use]
    pub fn from_settings(settings: Option<&LoggingSettings>, verbose: bool) -> Self {
        Self::resolve(settings, verbose, |name| std::env::var(name).ok())
    }

    /// Resolves the configuration against an arbitrary variable lookup.
    fn resolve<F>(settings: Option<&LoggingSettings>, verbose: bool, var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

        let format = non_blank(var("UNIQFLOW_LOG_FORMAT"))
            .or_else(|| settings.and_then(|s| s.format.clone()))
            .and_then(|f| f.parse().ok())
            .unwrap_or_default();

        let filter = if verbose {
            VERBOSE_FILTER.to_string()
        } else {
            non_blank(var("RUST_LOG"))
                .or_else(|| settings.and_then(|s| s.filter.clone()))
                .unwrap_or_else(|| DEFAULT_FILTER.to_string())
        };

        let file = non_blank(var("UNIQFLOW_LOG_FILE"))
            .or_else(|| settings.and_then(|s| s.file.clone()))
            .map(PathBuf::from);

        Self {
            format,
            filter,
            file,
        }
    }
}
