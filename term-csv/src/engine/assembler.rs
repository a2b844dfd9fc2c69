//! Turns physical lines into rows.
//!
//! Shared by every parse mode so header handling, blank-line filtering and
//! validation behave the same whether lines come from a string or a stream.

use crate::error::{CsvError, Result, ValidationIssue};
use crate::{log_row, log_sniff};
use crate::logging::{truncate_field, LogConfig};
use crate::options::{ParsingOptions, ValidationMode};
use crate::row::Row;
use crate::schema::Schema;
use crate::sniff::DelimiterSniffer;
use crate::tokenizer::LineTokenizer;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

pub(crate) struct RowAssembler {
    options: ParsingOptions,
    log_config: LogConfig,
    delimiter: Option<char>,
    tokenizer: Option<LineTokenizer>,
    headers: Option<Arc<[String]>>,
    issues: Vec<ValidationIssue>,
    emitted: usize,
}

impl RowAssembler {
    /// `delimiter` of `None` detects it from the header line.
    pub(crate) fn new(
        options: ParsingOptions,
        log_config: LogConfig,
        delimiter: Option<char>,
    ) -> Self {
        Self {
            options,
            log_config,
            delimiter,
            tokenizer: None,
            headers: None,
            issues: Vec::new(),
            emitted: 0,
        }
    }

    /// Consumes one physical line without its terminator.
    ///
    /// Returns the row the line produced, if any. Header lines, dropped lines
    /// and rows withheld in accumulate mode yield `None`.
    pub(crate) fn push_line(
        &mut self,
        line: &str,
        line_no: usize,
        schema: Option<&Schema>,
    ) -> Result<Option<Row>> {
        if line.is_empty() {
            return Ok(None);
        }
        if self.options.skip_empty_lines && line.trim().is_empty() {
            return Ok(None);
        }

        if self.tokenizer.is_none() {
            self.start(line, schema)?;
            if self.options.has_headers {
                return Ok(None);
            }
        }
        let (Some(tokenizer), Some(headers)) = (self.tokenizer, self.headers.clone()) else {
            return Err(CsvError::parse("header state missing after first line"));
        };

        let row = Row::new(headers, tokenizer.tokenize(line), line_no);
        if let Some(schema) = schema {
            match self.options.validation_mode {
                ValidationMode::FailFast => {
                    if let Err(e) = schema.validate_row(&row, line_no) {
                        warn!(line = line_no, error = %e, "Row failed validation");
                        return Err(e);
                    }
                }
                ValidationMode::AccumulateAll => {
                    let issues = schema.validate_row_all(&row, line_no);
                    if !issues.is_empty() {
                        warn!(line = line_no, issues = issues.len(), "Row failed validation");
                        self.issues.extend(issues);
                        return Ok(None);
                    }
                }
            }
        }

        log_row!(
            self.log_config,
            line = line_no,
            row = %truncate_field(line, self.log_config.max_field_length),
            "Emitting row"
        );
        self.emitted += 1;
        Ok(Some(row))
    }

    /// Handles the first non-blank line: settles the delimiter and headers.
    fn start(&mut self, line: &str, schema: Option<&Schema>) -> Result<()> {
        let delimiter = match self.delimiter {
            Some(delimiter) => delimiter,
            None => {
                let detected = DelimiterSniffer::new()
                    .with_sample_lines(1)
                    .with_quote_char(self.options.quote_char)
                    .detect(line);
                log_sniff!(
                    self.log_config,
                    delimiter = ?detected,
                    "Detected delimiter from header line"
                );
                detected
            }
        };
        let tokenizer = LineTokenizer::new(delimiter, self.options.quote_char)
            .with_trim(self.options.trim_whitespace);
        let fields = tokenizer.tokenize(line);

        let headers: Vec<String> = if self.options.has_headers {
            check_unique_headers(&fields)?;
            if let Some(schema) = schema {
                schema.validate_headers(fields.as_slice())?;
            }
            fields
        } else {
            (1..=fields.len()).map(|i| format!("Column{i}")).collect()
        };
        debug!(columns = headers.len(), delimiter = ?delimiter, "Resolved headers");

        self.delimiter = Some(delimiter);
        self.tokenizer = Some(tokenizer);
        self.headers = Some(headers.into());
        Ok(())
    }

    /// Number of rows emitted so far.
    pub(crate) fn emitted(&self) -> usize {
        self.emitted
    }

    /// Ends the parse, failing with the collected issues in accumulate mode.
    pub(crate) fn finish(&mut self) -> Result<()> {
        if self.issues.is_empty() {
            debug!(rows = self.emitted, "Finished assembling rows");
            return Ok(());
        }
        let issues = std::mem::take(&mut self.issues);
        warn!(issues = issues.len(), "Validation failed");
        Err(CsvError::ValidationReport { issues })
    }
}

/// Header names must be unique under the same ASCII case folding used for
/// schema matching.
fn check_unique_headers(headers: &[String]) -> Result<()> {
    let mut seen = HashSet::with_capacity(headers.len());
    for name in headers {
        if !seen.insert(name.to_ascii_lowercase()) {
            return Err(CsvError::parse(format!(
                "duplicate column name '{name}' in header"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IssueKind;
    use crate::schema::ValidationRule;

    fn assembler(options: ParsingOptions) -> RowAssembler {
        RowAssembler::new(options, LogConfig::default(), None)
    }

    #[test]
    fn test_header_then_rows() {
        let mut asm = assembler(ParsingOptions::default());
        assert!(asm.push_line("a;b", 0, None).unwrap().is_none());
        let row = asm.push_line("1;2", 1, None).unwrap().unwrap();
        assert_eq!(row.get("b"), Some("2"));
        assert_eq!(row.line(), 1);
        assert_eq!(asm.emitted(), 1);
    }

    #[test]
    fn test_blank_lines_are_dropped() {
        let mut asm = assembler(ParsingOptions::default());
        asm.push_line("a,b", 0, None).unwrap();
        assert!(asm.push_line("", 1, None).unwrap().is_none());
        assert!(asm.push_line("   ", 2, None).unwrap().is_none());

        let mut keep = assembler(ParsingOptions::default().with_skip_empty_lines(false));
        keep.push_line("a,b", 0, None).unwrap();
        let row = keep.push_line("   ", 1, None).unwrap().unwrap();
        assert_eq!(row.values(), &["", ""]);
    }

    #[test]
    fn test_synthesized_headers() {
        let mut asm = assembler(ParsingOptions::default().with_headers(false));
        let row = asm.push_line("x,y,z", 0, None).unwrap().unwrap();
        assert_eq!(row.headers(), &["Column1", "Column2", "Column3"]);
        assert_eq!(row.get("Column2"), Some("y"));
    }

    #[test]
    fn test_accumulate_withholds_failing_rows() {
        let mut schema = Schema::new();
        schema.add_int("n", ValidationRule::new().required()).unwrap();

        let options = ParsingOptions::default().with_validation_mode(ValidationMode::AccumulateAll);
        let mut asm = assembler(options);
        asm.push_line("n", 0, Some(&schema)).unwrap();
        assert!(asm.push_line("x", 1, Some(&schema)).unwrap().is_none());
        assert!(asm.push_line("2", 2, Some(&schema)).unwrap().is_some());
        assert!(asm.push_line(" ", 3, Some(&schema)).unwrap().is_none());

        let err = asm.finish().unwrap_err();
        let issues = err.issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].row, 1);
        assert!(matches!(issues[0].kind, IssueKind::TypeConversion { .. }));
    }

    #[test]
    fn test_duplicate_headers_are_rejected() {
        let mut asm = assembler(ParsingOptions::default());
        let err = asm.push_line("a,a,b", 0, None).unwrap_err();
        assert!(matches!(err, CsvError::Parse { ref message, .. } if message.contains("'a'")));

        let mut folded = assembler(ParsingOptions::default());
        let err = folded.push_line("id,Name,NAME", 0, None).unwrap_err();
        assert!(matches!(err, CsvError::Parse { ref message, .. } if message.contains("'NAME'")));

        let mut unnamed = assembler(ParsingOptions::default().with_headers(false));
        let row = unnamed.push_line("a,a", 0, None).unwrap().unwrap();
        assert_eq!(row.headers(), &["Column1", "Column2"]);
    }
}
