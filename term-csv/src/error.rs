//! Error types for the term-csv parsing library.
//!
//! All fallible operations return [`CsvError`] through the crate-wide
//! [`Result`] alias. Schema problems are split into structural mismatches
//! ([`CsvError::Template`]) and value-level problems ([`CsvError::Validation`])
//! so callers can tell a wrong file layout from a bad record.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for term-csv.
#[derive(Error, Debug)]
pub enum CsvError {
    /// The requested input path does not exist.
    #[error("File not found: {}", path.display())]
    NotFound {
        /// The path that was requested
        path: PathBuf,
    },

    /// Malformed input or an unexpected lower-level failure.
    #[error("Parse error: {message}")]
    Parse {
        /// Human-readable description of what was being done
        message: String,
        /// Optional underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// One or more schema columns are absent from the header line.
    #[error("Template mismatch: missing columns: {}", missing.join(", "))]
    Template {
        /// Every missing column name, in schema order
        missing: Vec<String>,
    },

    /// A single value failed type conversion or a rule check.
    #[error("{0}")]
    Validation(ValidationIssue),

    /// Every issue found while validating in accumulate mode.
    #[error("Validation failed with {} issue(s); first: {}", issues.len(), first_message(issues))]
    ValidationReport {
        /// All issues in input order
        issues: Vec<ValidationIssue>,
    },

    /// Invalid input to a constructor or builder.
    #[error("Invalid argument: {0}")]
    Argument(String),

    /// Options or schema definitions that could not be loaded.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

fn first_message(issues: &[ValidationIssue]) -> String {
    issues
        .first()
        .map(|issue| issue.to_string())
        .unwrap_or_default()
}

/// A type alias for `Result<T, CsvError>`.
pub type Result<T> = std::result::Result<T, CsvError>;

/// Which check produced a [`ValidationIssue`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum IssueKind {
    /// A required column is missing from the row
    MissingColumn,
    /// The value could not be converted to the declared type
    TypeConversion {
        /// Name of the declared type
        expected: String,
    },
    /// A required value is blank
    Required,
    /// The value is shorter than the minimum length
    MinLength {
        /// Minimum allowed length in characters
        min: usize,
    },
    /// The value is longer than the maximum length
    MaxLength {
        /// Maximum allowed length in characters
        max: usize,
    },
    /// The value does not match the rule pattern
    Pattern {
        /// Source of the pattern
        pattern: String,
    },
    /// The custom predicate rejected the value
    Predicate,
}

/// A single value-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Column the failing value belongs to
    pub column: String,
    /// 0-based physical line number of the failing row
    pub row: usize,
    /// The check that failed
    #[serde(flatten)]
    pub kind: IssueKind,
    /// Rule override message or generated description
    pub message: String,
}

impl ValidationIssue {
    /// Creates a new issue.
    pub fn new(
        column: impl Into<String>,
        row: usize,
        kind: IssueKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            row,
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Validation failed for column '{}' at row {}: {}",
            self.column, self.row, self.message
        )
    }
}

impl CsvError {
    /// Creates a parse error without an underlying cause.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a parse error wrapping an underlying cause.
    pub fn parse_with_source(
        message: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Parse {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Creates a validation error for a single issue.
    pub fn validation(issue: ValidationIssue) -> Self {
        Self::Validation(issue)
    }

    /// Returns the validation issues carried by this error, if any.
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            CsvError::Validation(issue) => std::slice::from_ref(issue),
            CsvError::ValidationReport { issues } => issues,
            _ => &[],
        }
    }
}

impl From<std::io::Error> for CsvError {
    fn from(err: std::io::Error) -> Self {
        CsvError::parse_with_source("I/O failure", Box::new(err))
    }
}

impl From<serde_json::Error> for CsvError {
    fn from(err: serde_json::Error) -> Self {
        CsvError::Configuration(err.to_string())
    }
}

/// Extension trait for adding context to lower-level errors.
///
/// Every error, a [`CsvError`] included, is wrapped into a
/// [`CsvError::Parse`] whose message is the context and whose source is the
/// original error.
pub trait ErrorContext<T> {
    /// Adds context to an error.
    fn context(self, msg: &str) -> Result<T>;

    /// Adds context with a lazy message.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| CsvError::parse_with_source(msg, Box::new(e)))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| CsvError::parse_with_source(f(), Box::new(e)))
    }
}
