//! Message filtering
//!
//! A message matches [`FilterCriteria`] when all of these hold:
//!
//! - at least one pattern matches the plain or HTML body (skipped when
//!   there are no patterns)
//! - the sender text contains `from` (skipped when unset)
//! - the subject contains `subject` (skipped when unset)
//!
//! Patterns are classified once when they are added: text that
//! compiles as a regular expression becomes [`Pattern::Regex`],
//! anything else is kept as a [`Pattern::Literal`] substring.

use crate::error::{Error, Result};
use crate::message::ParsedMessage;
use regex::Regex;

/// A body pattern.
#[derive(Debug, Clone)]
pub enum Pattern {
    Literal(String),
    Regex(Regex),
}

impl Pattern {
    /// Classify `text`: a regex if it compiles, a literal otherwise.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        Regex::new(text).map_or_else(|_| Self::Literal(text.to_string()), Self::Regex)
    }

    #[must_use]
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal(text.into())
    }

    #[must_use]
    pub fn is_match(&self, haystack: &str) -> bool {
        match self {
            Self::Literal(needle) => haystack.contains(needle.as_str()),
            Self::Regex(re) => re.is_match(haystack),
        }
    }

    fn matches_body(&self, message: &ParsedMessage) -> bool {
        self.is_match(&message.text_as_html) || self.is_match(&message.text)
    }
}

impl From<&str> for Pattern {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

impl From<String> for Pattern {
    fn from(text: String) -> Self {
        Self::parse(&text)
    }
}

impl From<Regex> for Pattern {
    fn from(re: Regex) -> Self {
        Self::Regex(re)
    }
}

/// What to look for in an inbox.
///
/// # Examples
///
/// ```
/// use miab_client::FilterCriteria;
///
/// let criteria = FilterCriteria::new()
///     .pattern(r"code: \d{6}")
///     .sender("noreply@example.com");
/// assert!(!criteria.is_empty());
/// assert!(FilterCriteria::new().validate().is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    patterns: Vec<Pattern>,
    from: Option<String>,
    subject: Option<String>,
}

impl FilterCriteria {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one pattern.
    #[must_use]
    pub fn pattern(mut self, pattern: impl Into<Pattern>) -> Self {
        self.patterns.push(pattern.into());
        self
    }

    /// Add several patterns.
    #[must_use]
    pub fn patterns<I, P>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Pattern>,
    {
        self.patterns.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Require the sender text to contain `from`. Empty means unset.
    #[must_use]
    pub fn sender(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into()).filter(|s| !s.is_empty());
        self
    }

    /// Require the subject to contain `subject`. Empty means unset.
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into()).filter(|s| !s.is_empty());
        self
    }

    #[must_use]
    pub fn pattern_list(&self) -> &[Pattern] {
        &self.patterns
    }

    #[must_use]
    pub fn from_constraint(&self) -> Option<&str> {
        self.from.as_deref()
    }

    #[must_use]
    pub fn subject_constraint(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// No patterns, no sender, no subject.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty() && self.from.is_none() && self.subject.is_none()
    }

    /// # Errors
    ///
    /// Returns [`Error::Criteria`] when the criteria are empty.
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(Error::Criteria(
                "At least one of patterns, from or subject must be specified".into(),
            ));
        }
        Ok(())
    }

    /// Whether `message` satisfies every constraint.
    #[must_use]
    pub fn matches(&self, message: &ParsedMessage) -> bool {
        let pattern_match =
            self.patterns.is_empty() || self.patterns.iter().any(|p| p.matches_body(message));
        let from_match = self
            .from
            .as_deref()
            .is_none_or(|from| message.from.contains(from));
        let subject_match = self
            .subject
            .as_deref()
            .is_none_or(|subject| message.subject.contains(subject));

        pattern_match && from_match && subject_match
    }
}

/// Messages matching `criteria`, in their original order.
///
/// # Errors
///
/// Returns [`Error::Criteria`] when the criteria are empty.
pub fn filter<'a>(
    messages: &'a [ParsedMessage],
    criteria: &FilterCriteria,
) -> Result<Vec<&'a ParsedMessage>> {
    criteria.validate()?;
    Ok(messages.iter().filter(|m| criteria.matches(m)).collect())
}
