//! Parser configuration.

use crate::error::{CsvError, Result};
use crate::sniff::DEFAULT_SAMPLE_LINES;
use serde::{Deserialize, Serialize};

/// Default number of bytes pulled per read in streaming mode.
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// How row validation failures are reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Abort at the first failing row
    #[default]
    FailFast,
    /// Validate every row and report all issues at the end
    AccumulateAll,
}

/// Options consumed by a [`ParsingEngine`](crate::ParsingEngine).
///
/// Every field has a default, so JSON configuration only needs the keys it
/// changes:
///
/// ```rust
/// use term_csv::ParsingOptions;
///
/// let options = ParsingOptions::from_json(r#"{"delimiter": ";", "trim_whitespace": false}"#).unwrap();
/// assert_eq!(options.delimiter, Some(';'));
/// assert!(!options.trim_whitespace);
/// assert!(options.has_headers);
/// assert_eq!(options.buffer_size, 4096);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsingOptions {
    /// Field separator; `None` detects it from the input
    pub delimiter: Option<char>,
    /// Whether the first line names the columns
    pub has_headers: bool,
    /// Quote character
    pub quote_char: char,
    /// Trim fields after quote resolution
    pub trim_whitespace: bool,
    /// Skip lines that contain only whitespace
    pub skip_empty_lines: bool,
    /// Bytes per read in streaming mode
    pub buffer_size: usize,
    /// Lines sampled for delimiter detection
    pub sample_lines: usize,
    /// How validation failures are reported
    pub validation_mode: ValidationMode,
}

impl Default for ParsingOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            has_headers: true,
            quote_char: '"',
            trim_whitespace: true,
            skip_empty_lines: true,
            buffer_size: DEFAULT_BUFFER_SIZE,
            sample_lines: DEFAULT_SAMPLE_LINES,
            validation_mode: ValidationMode::FailFast,
        }
    }
}

impl ParsingOptions {
    /// Creates the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads options from JSON and validates them.
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Sets a fixed delimiter.
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Detects the delimiter from the input.
    pub fn with_auto_delimiter(mut self) -> Self {
        self.delimiter = None;
        self
    }

    /// Sets whether the first line is a header.
    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    /// Sets the quote character.
    pub fn with_quote_char(mut self, quote_char: char) -> Self {
        self.quote_char = quote_char;
        self
    }

    /// Sets field trimming.
    pub fn with_trim_whitespace(mut self, trim: bool) -> Self {
        self.trim_whitespace = trim;
        self
    }

    /// Sets blank line skipping.
    pub fn with_skip_empty_lines(mut self, skip: bool) -> Self {
        self.skip_empty_lines = skip;
        self
    }

    /// Sets the streaming read size.
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Sets the number of lines sampled for delimiter detection.
    pub fn with_sample_lines(mut self, sample_lines: usize) -> Self {
        self.sample_lines = sample_lines;
        self
    }

    /// Sets the validation mode.
    pub fn with_validation_mode(mut self, mode: ValidationMode) -> Self {
        self.validation_mode = mode;
        self
    }

    /// Checks the options for values the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.buffer_size == 0 {
            return Err(CsvError::Argument(
                "buffer_size must be greater than zero".to_string(),
            ));
        }
        if self.sample_lines == 0 {
            return Err(CsvError::Argument(
                "sample_lines must be greater than zero".to_string(),
            ));
        }
        if self.delimiter == Some(self.quote_char) {
            return Err(CsvError::Argument(format!(
                "delimiter and quote character are both '{}'",
                self.quote_char
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ParsingOptions::default();
        assert_eq!(options.delimiter, None);
        assert!(options.has_headers);
        assert_eq!(options.quote_char, '"');
        assert!(options.trim_whitespace);
        assert!(options.skip_empty_lines);
        assert_eq!(options.buffer_size, 4096);
        assert_eq!(options.sample_lines, 5);
        assert_eq!(options.validation_mode, ValidationMode::FailFast);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let options = ParsingOptions::new()
            .with_delimiter('|')
            .with_headers(false)
            .with_buffer_size(16)
            .with_validation_mode(ValidationMode::AccumulateAll);
        assert_eq!(options.delimiter, Some('|'));
        assert!(!options.has_headers);
        assert_eq!(options.buffer_size, 16);
        assert_eq!(options.with_auto_delimiter().delimiter, None);
    }

    #[test]
    fn test_validate_rejects_unusable_values() {
        for options in [
            ParsingOptions::new().with_buffer_size(0),
            ParsingOptions::new().with_sample_lines(0),
            ParsingOptions::new().with_delimiter('"'),
        ] {
            assert!(matches!(options.validate(), Err(CsvError::Argument(_))));
        }
    }

    #[test]
    fn test_from_json() {
        let options =
            ParsingOptions::from_json(r#"{"validation_mode": "accumulate_all", "sample_lines": 10}"#)
                .unwrap();
        assert_eq!(options.validation_mode, ValidationMode::AccumulateAll);
        assert_eq!(options.sample_lines, 10);
        assert_eq!(options.quote_char, '"');

        assert!(matches!(
            ParsingOptions::from_json(r#"{"buffer_size": "big"}"#),
            Err(CsvError::Configuration(_))
        ));
        assert!(matches!(
            ParsingOptions::from_json(r#"{"buffer_size": 0}"#),
            Err(CsvError::Argument(_))
        ));
    }
}
