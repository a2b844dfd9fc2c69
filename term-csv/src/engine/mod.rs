//! The parsing engine.
//!
//! [`ParsingEngine`] ties the sniffers, the tokenizer and schema validation
//! together. It offers four ways in:
//!
//! | Input | Call | Output |
//! |-------|------|--------|
//! | `&str` | [`parse_text`](ParsingEngine::parse_text) | `Vec<Row>` |
//! | path | [`parse_file`](ParsingEngine::parse_file) | `Vec<Row>` |
//! | [`std::io::Read`] | [`rows_from_reader`](ParsingEngine::rows_from_reader) | [`RowReader`] |
//! | [`tokio::io::AsyncRead`] | [`parse_stream`](ParsingEngine::parse_stream) | [`RowStream`] |
//!
//! Whole-text parsing detects the delimiter from a sample of the whole input;
//! the streaming modes detect it from the header line alone. Every row carries
//! the 0-based physical line number it was read from.
//!
//! ## Example
//!
//! ```rust
//! use term_csv::{ParsingEngine, ParsingOptions};
//! use term_csv::schema::{Schema, ValidationRule};
//!
//! # fn main() -> term_csv::Result<()> {
//! let engine = ParsingEngine::new(ParsingOptions::default())?;
//!
//! let mut schema = Schema::new();
//! schema
//!     .add_string("Name", ValidationRule::new().required())?
//!     .add_int("Age", None)?;
//!
//! let rows = engine.parse_text("Name;Age\nJohn;30\n\nJane;25\n", Some(&schema))?;
//! assert_eq!(rows.len(), 2);
//! assert_eq!(&rows[1]["Name"], "Jane");
//! assert_eq!(rows[1].line(), 3);
//! # Ok(())
//! # }
//! ```

mod assembler;
mod lines;
mod reader;
mod stream;

pub use reader::RowReader;
pub use stream::RowStream;

use crate::error::{CsvError, Result};
use crate::log_sniff;
use crate::logging::LogConfig;
use crate::options::ParsingOptions;
use crate::row::Row;
use crate::schema::Schema;
use crate::sniff::{DelimiterSniffer, EncodingSniffer, TextEncoding};
use assembler::RowAssembler;
use lines::LineBuffer;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use tokio::io::AsyncRead;
use tracing::{info, instrument, Level};

/// Parses delimited text into [`Row`]s.
///
/// The engine holds only an immutable configuration, so one instance can be
/// shared across threads and reused for any number of parses.
#[derive(Debug, Clone, Default)]
pub struct ParsingEngine {
    options: ParsingOptions,
    log_config: LogConfig,
    encoding_sniffer: EncodingSniffer,
}

impl ParsingEngine {
    /// Creates an engine, rejecting unusable options.
    pub fn new(options: ParsingOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            options,
            log_config: LogConfig::default(),
            encoding_sniffer: EncodingSniffer::default(),
        })
    }

    /// Sets the logging configuration.
    pub fn with_log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }

    /// Sets the sniffer used when `parse_file` is not given an encoding.
    pub fn with_encoding_sniffer(mut self, sniffer: EncodingSniffer) -> Self {
        self.encoding_sniffer = sniffer;
        self
    }

    /// The options this engine parses with.
    pub fn options(&self) -> &ParsingOptions {
        &self.options
    }

    fn assembler(&self, delimiter: Option<char>) -> RowAssembler {
        RowAssembler::new(self.options.clone(), self.log_config.clone(), delimiter)
    }

    /// Parses a complete text.
    ///
    /// Empty input yields no rows and is not an error, even with a schema.
    /// With a schema, headers are checked before any row and each row is
    /// validated according to the configured
    /// [`ValidationMode`](crate::ValidationMode).
    #[instrument(skip_all, fields(len = text.len(), schema = schema.is_some()))]
    pub fn parse_text(&self, text: &str, schema: Option<&Schema>) -> Result<Vec<Row>> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        let delimiter = match self.options.delimiter {
            Some(delimiter) => delimiter,
            None => {
                let detected = DelimiterSniffer::new()
                    .with_sample_lines(self.options.sample_lines)
                    .with_quote_char(self.options.quote_char)
                    .detect(text);
                log_sniff!(self.log_config, delimiter = ?detected, "Detected delimiter");
                detected
            }
        };

        let mut assembler = self.assembler(Some(delimiter));
        let mut rows = Vec::new();
        for (line_no, line) in text.split('\n').enumerate() {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if let Some(row) = assembler.push_line(line, line_no, schema)? {
                rows.push(row);
            }
        }
        assembler.finish()?;

        if self.log_config.base_level >= Level::INFO {
            info!(rows = rows.len(), delimiter = ?delimiter, "Parsed text");
        }
        Ok(rows)
    }

    /// Reads and parses a file.
    ///
    /// Without an explicit `encoding` the file's first bytes are sniffed.
    /// Fails with [`CsvError::NotFound`] if the path does not exist.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn parse_file(
        &self,
        path: impl AsRef<Path>,
        schema: Option<&Schema>,
        encoding: Option<TextEncoding>,
    ) -> Result<Vec<Row>> {
        let path = path.as_ref();
        let encoding = match encoding {
            Some(encoding) => encoding,
            None => {
                let detected = self.encoding_sniffer.detect_file(path)?;
                log_sniff!(self.log_config, encoding = %detected, "Detected file encoding");
                detected
            }
        };

        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => CsvError::NotFound {
                path: path.to_path_buf(),
            },
            _ => CsvError::parse_with_source(
                format!("Failed to read '{}'", path.display()),
                Box::new(e),
            ),
        })?;
        let text = encoding.decode(&bytes);
        self.parse_text(&text, schema)
    }

    /// Runs [`parse_text`](Self::parse_text) on tokio's blocking pool.
    pub async fn parse_text_async(
        &self,
        text: impl Into<String>,
        schema: Option<Schema>,
    ) -> Result<Vec<Row>> {
        let engine = self.clone();
        let text = text.into();
        tokio::task::spawn_blocking(move || engine.parse_text(&text, schema.as_ref()))
            .await
            .map_err(|e| CsvError::parse_with_source("parse task failed", Box::new(e)))?
    }

    /// Runs [`parse_file`](Self::parse_file) on tokio's blocking pool.
    pub async fn parse_file_async(
        &self,
        path: impl Into<PathBuf>,
        schema: Option<Schema>,
        encoding: Option<TextEncoding>,
    ) -> Result<Vec<Row>> {
        let engine = self.clone();
        let path = path.into();
        tokio::task::spawn_blocking(move || engine.parse_file(&path, schema.as_ref(), encoding))
            .await
            .map_err(|e| CsvError::parse_with_source("parse task failed", Box::new(e)))?
    }

    /// Returns an iterator that parses `reader` one row at a time.
    ///
    /// The delimiter, when not configured, is detected from the header line.
    ///
    /// ```rust
    /// use term_csv::{ParsingEngine, ParsingOptions};
    /// use term_csv::sniff::TextEncoding;
    ///
    /// let engine = ParsingEngine::new(ParsingOptions::default()).unwrap();
    /// let input = "id|name\n1|a\n2|b\n".as_bytes();
    /// let names: Vec<String> = engine
    ///     .rows_from_reader(input, None, TextEncoding::Utf8)
    ///     .map(|row| row.map(|r| r["name"].to_string()))
    ///     .collect::<term_csv::Result<_>>()
    ///     .unwrap();
    /// assert_eq!(names, vec!["a", "b"]);
    /// ```
    pub fn rows_from_reader<R: Read>(
        &self,
        reader: R,
        schema: Option<Schema>,
        encoding: TextEncoding,
    ) -> RowReader<R> {
        RowReader::new(
            reader,
            self.options.buffer_size,
            LineBuffer::new(encoding),
            self.assembler(self.options.delimiter),
            schema,
        )
    }

    /// Returns a stream that parses `reader` one row at a time.
    ///
    /// Nothing is read until the stream is polled. The delimiter, when not
    /// configured, is detected from the header line.
    #[instrument(skip_all, fields(encoding = %encoding))]
    pub fn parse_stream<R>(
        &self,
        reader: R,
        schema: Option<Schema>,
        encoding: TextEncoding,
    ) -> RowStream
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        RowStream::new(
            reader,
            self.options.buffer_size,
            LineBuffer::new(encoding),
            self.assembler(self.options.delimiter),
            schema,
        )
    }
}
