//! Attribute key expressions.
//!
//! A key expression is literal text with `${name}` references to record
//! attributes, e.g. `${custom_id}` or `${tenant}/${order_id}`. `$$` is an
//! escaped literal `$`.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

use crate::models::Record;
use crate::services::deduplication::KeyExtractor;
use crate::{Error, Result};

/// Matches an escaped `$$` or an attribute reference `${...}`.
static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\$|\$\{([^{}]*)\}").unwrap_or_else(|_| unreachable!()));

/// One piece of a parsed expression.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Attribute(String),
}

/// A parsed key expression.
///
/// Missing attributes evaluate to the empty string. If the whole expression
/// evaluates to a blank string the record has no key.
///
/// # Example
///
/// ```rust
/// use uniqflow::expression::KeyExpression;
/// use uniqflow::models::Record;
///
/// let expression = KeyExpression::parse("${tenant}/${order}")?;
/// let record = Record::new()
///     .with_attribute("tenant", "acme")
///     .with_attribute("order", "42");
///
/// assert_eq!(expression.evaluate(&record), Some("acme/42".to_string()));
/// assert_eq!(expression.references(), vec!["tenant", "order"]);
/// # Ok::<(), uniqflow::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyExpression {
    source: String,
    segments: Vec<Segment>,
}

impl KeyExpression {
    /// Parses an expression.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the expression is blank, contains an
    /// empty reference `${}`, or has an unterminated `${`.
    pub fn parse(source: &str) -> Result<Self> {
        if source.trim().is_empty() {
            return Err(Error::InvalidInput(
                "key expression must not be empty".to_string(),
            ));
        }

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut last = 0;

        for caps in TOKEN_PATTERN.captures_iter(source) {
            let Some(whole) = caps.get(0) else { continue };
            let gap = &source[last..whole.start()];
            check_unterminated(gap, source)?;
            literal.push_str(gap);
            last = whole.end();

            match caps.get(1) {
                None => literal.push('$'),
                Some(name) => {
                    let name = name.as_str().trim();
                    if name.is_empty() {
                        return Err(Error::InvalidInput(format!(
                            "empty attribute reference in key expression '{source}'"
                        )));
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Attribute(name.to_string()));
                },
            }
        }

        let tail = &source[last..];
        check_unterminated(tail, source)?;
        literal.push_str(tail);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// Returns the expression as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Names of the attributes the expression references, in order.
    #[must_use]
    pub fn references(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Attribute(name) => Some(name.as_str()),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    /// Renders the expression against an attribute lookup.
    ///
    /// Missing attributes render as the empty string.
    pub fn render<'a, F>(&self, lookup: F) -> String
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Literal(text) => text.as_str(),
                Segment::Attribute(name) => lookup(name).unwrap_or_default(),
            })
            .collect()
    }

    /// Evaluates the expression against a record.
    ///
    /// Returns `None` when the result is blank.
    #[must_use]
    pub fn evaluate(&self, record: &Record) -> Option<String> {
        let key = self.render(|name| record.attribute(name));
        (!key.trim().is_empty()).then_some(key)
    }
}

impl KeyExtractor<Record> for KeyExpression {
    fn extract_key(&self, record: &Record) -> Option<String> {
        self.evaluate(record)
    }
}

impl fmt::Display for KeyExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl std::str::FromStr for KeyExpression {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Rejects literal text that opens a reference without closing it.
fn check_unterminated(text: &str, source: &str) -> Result<()> {
    if text.contains("${") {
        return Err(Error::InvalidInput(format!(
            "unterminated attribute reference in key expression '{source}'"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn record() -> Record {
        Record::with_id("rec-1")
            .with_attribute("custom_id", "1")
            .with_attribute("custom_value", "123")
            .with_attribute("blank", "   ")
    }

    #[test]
    fn test_single_reference() {
        let expression = KeyExpression::parse("${custom_id}").unwrap();
        assert_eq!(expression.evaluate(&record()), Some("1".to_string()));
        assert_eq!(expression.references(), vec!["custom_id"]);
    }

    #[test]
    fn test_default_uuid_reference() {
        let expression = KeyExpression::parse("${uuid}").unwrap();
        assert_eq!(expression.evaluate(&record()), Some("rec-1".to_string()));
    }

    #[test]
    fn test_composite_expression() {
        let expression = KeyExpression::parse("id=${custom_id};v=${ custom_value }").unwrap();
        assert_eq!(
            expression.evaluate(&record()),
            Some("id=1;v=123".to_string())
        );
        assert_eq!(expression.references(), vec!["custom_id", "custom_value"]);
    }

    #[test]
    fn test_missing_attribute_is_no_key() {
        let expression = KeyExpression::parse("${absent}").unwrap();
        assert_eq!(expression.evaluate(&record()), None);
    }

    #[test]
    fn test_blank_attribute_is_no_key() {
        let expression = KeyExpression::parse("${blank}").unwrap();
        assert_eq!(expression.evaluate(&record()), None);
    }

    #[test]
    fn test_missing_attribute_with_literal_still_has_key() {
        let expression = KeyExpression::parse("k-${absent}").unwrap();
        assert_eq!(expression.evaluate(&record()), Some("k-".to_string()));
    }

    #[test]
    fn test_literal_only_expression() {
        let expression = KeyExpression::parse("constant").unwrap();
        assert!(expression.references().is_empty());
        assert_eq!(expression.evaluate(&record()), Some("constant".to_string()));
    }

    #[test]
    fn test_escaped_dollar() {
        let expression = KeyExpression::parse("$${custom_id}").unwrap();
        assert!(expression.references().is_empty());
        assert_eq!(
            expression.evaluate(&record()),
            Some("${custom_id}".to_string())
        );

        let expression = KeyExpression::parse("cost$$${custom_value}").unwrap();
        assert_eq!(expression.evaluate(&record()), Some("cost$123".to_string()));
    }

    #[test]
    fn test_lone_dollar_is_literal() {
        let expression = KeyExpression::parse("$${custom_id}$").unwrap();
        assert_eq!(
            expression.evaluate(&record()),
            Some("${custom_id}$".to_string())
        );
    }

    #[test_case("" ; "empty")]
    #[test_case("   " ; "whitespace")]
    #[test_case("${}" ; "empty reference")]
    #[test_case("${  }" ; "blank reference")]
    #[test_case("${custom_id" ; "unterminated")]
    #[test_case("a-${b}-${c" ; "unterminated after reference")]
    fn test_parse_rejects(input: &str) {
        assert!(matches!(
            KeyExpression::parse(input),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_display_and_from_str() {
        let expression: KeyExpression = "${custom_id}".parse().unwrap();
        assert_eq!(expression.to_string(), "${custom_id}");
        assert_eq!(expression.as_str(), "${custom_id}");
    }

    #[test]
    fn test_render_with_custom_lookup() {
        let expression = KeyExpression::parse("${a}:${b}").unwrap();
        let rendered = expression.render(|name| (name == "a").then_some("x"));
        assert_eq!(rendered, "x:");
    }
}
