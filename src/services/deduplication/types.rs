//! Key extraction seam.
//!
//! The classifier never evaluates keys itself. Callers hand it a
//! [`KeyExtractor`], which may be a closure or a configured
//! [`KeyExpression`](crate::expression::KeyExpression).

/// Derives a deduplication key from a record.
///
/// Returning `None`, an empty string, or a whitespace-only string means the
/// key could not be derived; the record is then routed to `errored`.
/// Implementations must not panic: evaluation failures are reported as `None`.
///
/// # Example
///
/// ```rust
/// use uniqflow::services::deduplication::KeyExtractor;
///
/// let by_first_char = |s: &String| s.chars().next().map(String::from);
/// assert_eq!(by_first_char.extract_key(&"apple".to_string()), Some("a".to_string()));
/// ```
pub trait KeyExtractor<R: ?Sized> {
    /// Returns the key for `record`, or `None` if it cannot be derived.
    fn extract_key(&self, record: &R) -> Option<String>;
}

impl<R: ?Sized, F> KeyExtractor<R> for F
where
    F: Fn(&R) -> Option<String>,
{
    fn extract_key(&self, record: &R) -> Option<String> {
        self(record)
    }
}

/// Filters out keys that must not take part in matching.
///
/// Blank keys are treated exactly like absent ones. Non-blank keys are
/// returned unchanged; matching is by exact string equality.
#[must_use]
pub fn usable_key(key: Option<String>) -> Option<String> {
    key.filter(|k| !k.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usable_key_rejects_blank() {
        assert_eq!(usable_key(None), None);
        assert_eq!(usable_key(Some(String::new())), None);
        assert_eq!(usable_key(Some("  \t\n".to_string())), None);
    }

    #[test]
    fn test_usable_key_keeps_value_verbatim() {
        assert_eq!(usable_key(Some(" a ".to_string())), Some(" a ".to_string()));
        assert_eq!(usable_key(Some("A".to_string())), Some("A".to_string()));
    }

    #[test]
    fn test_closure_is_extractor() {
        let extractor = |n: &u32| (*n > 0).then(|| n.to_string());
        assert_eq!(extractor.extract_key(&3), Some("3".to_string()));
        assert_eq!(extractor.extract_key(&0), None);
    }
}
