//! Deduplication configuration.
//!
//! This module defines the stage settings: the key expression, which
//! duplicate survives, and how many records one invocation pulls.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::expression::KeyExpression;
use crate::models::RetentionPolicy;
use crate::{Error, Result};

/// Default key expression: every record is unique by its own id.
pub const DEFAULT_UNIQUE_KEY: &str = "${uuid}";

/// Configuration for the deduplication stage.
///
/// # Environment Variables
///
/// | Variable | Type | Default | Description |
/// |----------|------|---------|-------------|
/// | `UNIQFLOW_UNIQUE_KEY` | string | `${uuid}` | Key expression evaluated per record |
/// | `UNIQFLOW_RETAIN_FIRST` | bool | `true` | `true` keeps the first duplicate, `false` the last |
/// | `UNIQFLOW_BULK_SIZE` | usize | `0` | Records per invocation, `0` for all available |
///
/// # Example
///
/// ```rust
/// use uniqflow::models::RetentionPolicy;
/// use uniqflow::services::deduplication::DeduplicationConfig;
///
/// let config = DeduplicationConfig::default();
/// assert_eq!(config.unique_key, "${uuid}");
/// assert!(config.retain_first);
/// assert_eq!(config.bulk_size, 0);
/// assert_eq!(config.policy(), RetentionPolicy::RetainFirst);
/// assert!(config.batch_limit().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeduplicationConfig {
    /// Key expression, e.g. `${custom_id}`.
    pub unique_key: String,

    /// `true`: the first record per key survives; `false`: the last one does.
    pub retain_first: bool,

    /// Maximum records per invocation. Zero means all available.
    pub bulk_size: usize,
}

impl DeduplicationConfig {
    /// Creates a new configuration from environment variables.
    ///
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if a variable is set to a value that
    /// does not parse.
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides()
    }

    /// Applies `UNIQFLOW_*` environment overrides on top of `self`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if a variable is set to a value that
    /// does not parse.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Applies overrides read through an arbitrary variable lookup.
    fn apply_overrides<F>(mut self, var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = var("UNIQFLOW_UNIQUE_KEY").filter(|k| !k.trim().is_empty()) {
            self.unique_key = key;
        }

        if let Some(value) = var("UNIQFLOW_RETAIN_FIRST") {
            self.retain_first = parse_bool(&value).ok_or_else(|| {
                Error::InvalidInput(format!(
                    "UNIQFLOW_RETAIN_FIRST must be true or false, got '{value}'"
                ))
            })?;
        }

        if let Some(value) = var("UNIQFLOW_BULK_SIZE") {
            self.bulk_size = value.trim().parse().map_err(|e| {
                Error::InvalidInput(format!(
                    "UNIQFLOW_BULK_SIZE must be a non-negative integer, got '{value}': {e}"
                ))
            })?;
        }

        Ok(self)
    }

    /// Returns the retention policy selected by `retain_first`.
    #[must_use]
    pub const fn policy(&self) -> RetentionPolicy {
        RetentionPolicy::from_retain_first(self.retain_first)
    }

    /// Returns the per-invocation limit, `None` meaning unbounded.
    #[must_use]
    pub const fn batch_limit(&self) -> Option<NonZeroUsize> {
        NonZeroUsize::new(self.bulk_size)
    }

    /// Validates the configuration and parses the key expression.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the key expression is blank or malformed.
    pub fn validate(&self) -> Result<KeyExpression> {
        if self.unique_key.trim().is_empty() {
            return Err(Error::InvalidInput(
                "unique key expression must not be empty".to_string(),
            ));
        }
        KeyExpression::parse(&self.unique_key)
    }

    /// Builder method to set the key expression.
    #[must_use]
    pub fn with_unique_key(mut self, expression: impl Into<String>) -> Self {
        self.unique_key = expression.into();
        self
    }

    /// Builder method to set the retain-first flag.
    #[must_use]
    pub const fn with_retain_first(mut self, retain_first: bool) -> Self {
        self.retain_first = retain_first;
        self
    }

    /// Builder method to set the policy directly.
    #[must_use]
    pub const fn with_policy(mut self, policy: RetentionPolicy) -> Self {
        self.retain_first = matches!(policy, RetentionPolicy::RetainFirst);
        self
    }

    /// Builder method to set the bulk size.
    #[must_use]
    pub const fn with_bulk_size(mut self, bulk_size: usize) -> Self {
        self.bulk_size = bulk_size;
        self
    }
}

impl Default for DeduplicationConfig {
    fn default() -> Self {
        Self {
            unique_key: DEFAULT_UNIQUE_KEY.to_string(),
            retain_first: true,
            bulk_size: 0,
        }
    }
}

/// Parses a boolean flag the way the stage's settings accept them.
pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
