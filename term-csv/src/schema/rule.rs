//! Per-column validation rules.
//!
//! A [`ValidationRule`] is plain data apart from the optional [`Predicate`]
//! slot. Checks run in a fixed order and stop at the first failure:
//!
//! 1. required-but-blank
//! 2. minimum length
//! 3. maximum length
//! 4. pattern
//! 5. predicate

use crate::error::{CsvError, IssueKind, Result};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// A user-supplied check over a raw field value.
///
/// Implemented for every `Fn(&str) -> bool + Send + Sync`.
pub trait Predicate: Send + Sync {
    /// Returns true if the value is acceptable.
    fn test(&self, value: &str) -> bool;
}

impl<F> Predicate for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn test(&self, value: &str) -> bool {
        self(value)
    }
}

/// Constraint set attached to a column.
///
/// `min_length <= max_length` is not checked when the rule is built; each
/// bound is checked against every value on its own.
///
/// # Examples
///
/// ```rust
/// use term_csv::schema::ValidationRule;
///
/// let rule = ValidationRule::new()
///     .required()
///     .min_length(3)
///     .pattern(r"^[A-Z]+$")
///     .unwrap()
///     .predicate(|v: &str| v != "XXX");
///
/// assert!(rule.check("ABC").is_ok());
/// assert!(rule.check("AB").is_err());
/// assert!(rule.check("XXX").is_err());
/// ```
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationRule {
    /// Blank values are rejected when set
    pub is_required: bool,
    /// Minimum length in characters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    /// Maximum length in characters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Pattern the value must match (unanchored search)
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_pattern",
        deserialize_with = "deserialize_pattern"
    )]
    pub pattern: Option<Regex>,
    /// Custom check, not serialized
    #[serde(skip)]
    pub predicate: Option<Arc<dyn Predicate>>,
    /// Message used instead of the generated one for any failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl fmt::Debug for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationRule")
            .field("is_required", &self.is_required)
            .field("min_length", &self.min_length)
            .field("max_length", &self.max_length)
            .field("pattern", &self.pattern.as_ref().map(Regex::as_str))
            .field("predicate", &self.predicate.as_ref().map(|_| "<fn>"))
            .field("message", &self.message)
            .finish()
    }
}

/// A failed rule check: which check and the message to report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleViolation {
    /// The failing check
    pub kind: IssueKind,
    /// Override message or generated description
    pub message: String,
}

impl ValidationRule {
    /// Creates a rule with no checks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects blank values.
    pub fn required(mut self) -> Self {
        self.is_required = true;
        self
    }

    /// Sets the minimum length in characters.
    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    /// Sets the maximum length in characters.
    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    /// Sets the pattern values must match.
    ///
    /// The match is a search: anchor with `^...$` for a full match.
    pub fn pattern(mut self, pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)
            .map_err(|e| CsvError::Argument(format!("invalid pattern '{pattern}': {e}")))?;
        self.pattern = Some(regex);
        Ok(self)
    }

    /// Sets the custom predicate.
    pub fn predicate<P>(mut self, predicate: P) -> Self
    where
        P: Predicate + 'static,
    {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    /// Sets the message reported for any failure of this rule.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Runs the checks against `value`, stopping at the first failure.
    pub fn check(&self, value: &str) -> std::result::Result<(), RuleViolation> {
        if self.is_required && value.trim().is_empty() {
            return Err(self.violation(IssueKind::Required, "value is required".to_string()));
        }

        let length = value.chars().count();
        if let Some(min) = self.min_length {
            if length < min {
                return Err(self.violation(
                    IssueKind::MinLength { min },
                    format!("length {length} is less than minimum {min}"),
                ));
            }
        }
        if let Some(max) = self.max_length {
            if length > max {
                return Err(self.violation(
                    IssueKind::MaxLength { max },
                    format!("length {length} exceeds maximum {max}"),
                ));
            }
        }

        if let Some(pattern) = &self.pattern {
            if !pattern.is_match(value) {
                return Err(self.violation(
                    IssueKind::Pattern {
                        pattern: pattern.as_str().to_string(),
                    },
                    format!("value '{value}' does not match pattern '{}'", pattern.as_str()),
                ));
            }
        }

        if let Some(predicate) = &self.predicate {
            if !predicate.test(value) {
                return Err(self.violation(
                    IssueKind::Predicate,
                    format!("value '{value}' failed custom validation"),
                ));
            }
        }

        Ok(())
    }

    fn violation(&self, kind: IssueKind, default_message: String) -> RuleViolation {
        RuleViolation {
            kind,
            message: self.message.clone().unwrap_or(default_message),
        }
    }
}

fn serialize_pattern<S: Serializer>(
    pattern: &Option<Regex>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match pattern {
        Some(regex) => serializer.serialize_some(regex.as_str()),
        None => serializer.serialize_none(),
    }
}

fn deserialize_pattern<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<Regex>, D::Error> {
    let source: Option<String> = Option::deserialize(deserializer)?;
    source
        .map(|s| Regex::new(&s).map_err(serde::de::Error::custom))
        .transpose()
}
