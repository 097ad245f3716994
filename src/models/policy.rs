//! Retention policy for duplicate records.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Which record survives when several records in a batch share a key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetentionPolicy {
    /// The first occurrence survives; later duplicates are removed.
    #[default]
    RetainFirst,
    /// The most recent occurrence survives; earlier ones are retracted.
    RetainLast,
}

impl RetentionPolicy {
    /// Maps the `retain_first` configuration flag to a policy.
    #[must_use]
    pub const fn from_retain_first(retain_first: bool) -> Self {
        if retain_first {
            Self::RetainFirst
        } else {
            Self::RetainLast
        }
    }

    /// Returns the policy as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RetainFirst => "retain_first",
            Self::RetainLast => "retain_last",
        }
    }
}

impl fmt::Display for RetentionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RetentionPolicy {
    type Err = Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "retain_first" | "first" => Ok(Self::RetainFirst),
            "retain_last" | "last" => Ok(Self::RetainLast),
            other => Err(Error::InvalidInput(format!(
                "Unknown retention policy: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_default_is_retain_first() {
        assert_eq!(RetentionPolicy::default(), RetentionPolicy::RetainFirst);
    }

    #[test]
    fn test_from_retain_first() {
        assert_eq!(
            RetentionPolicy::from_retain_first(true),
            RetentionPolicy::RetainFirst
        );
        assert_eq!(
            RetentionPolicy::from_retain_first(false),
            RetentionPolicy::RetainLast
        );
    }

    #[test_case("retain_first", RetentionPolicy::RetainFirst ; "snake case first")]
    #[test_case("Retain-Last", RetentionPolicy::RetainLast ; "kebab mixed case last")]
    #[test_case("first", RetentionPolicy::RetainFirst ; "short first")]
    #[test_case(" last ", RetentionPolicy::RetainLast ; "short last padded")]
    fn test_parse(input: &str, expected: RetentionPolicy) {
        assert_eq!(input.parse::<RetentionPolicy>().unwrap(), expected);
    }

    #[test]
    fn test_parse_unknown() {
        assert!("middle".parse::<RetentionPolicy>().is_err());
    }

    #[test]
    fn test_display_roundtrip() {
        for policy in [RetentionPolicy::RetainFirst, RetentionPolicy::RetainLast] {
            assert_eq!(policy.to_string().parse::<RetentionPolicy>().unwrap(), policy);
        }
    }
}
