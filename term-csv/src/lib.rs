//! # term-csv - Delimited Text Parsing for Rust
//!
//! term-csv reads CSV-like text, works out how it is encoded and delimited,
//! splits each line into fields honoring quotes, and optionally checks every
//! record against a declarative schema.
//!
//! ## Overview
//!
//! Input rarely arrives with its parameters written down. term-csv sniffs the
//! character encoding from byte order marks and UTF-8 validity, picks the
//! field separator from a sample of lines, and then hands each record back as
//! a [`Row`]. A [`Schema`](schema::Schema) declares column types and rules
//! (required values, length bounds, regular expressions and custom
//! predicates) and is applied while parsing.
//!
//! ## Quick Start
//!
//! ```rust
//! use term_csv::prelude::*;
//!
//! # fn main() -> term_csv::Result<()> {
//! let mut schema = Schema::new();
//! schema
//!     .add_string("Name", ValidationRule::new().required())?
//!     .add_int("Age", None)?
//!     .add_string("Email", ValidationRule::new().pattern(r"^[^@\s]+@[^@\s]+$")?)?;
//!
//! let engine = ParsingEngine::new(ParsingOptions::default())?;
//! let rows = engine.parse_text(
//!     "Name,Age,Email\nJohn,30,john@example.com\n",
//!     Some(&schema),
//! )?;
//!
//! assert_eq!(rows.len(), 1);
//! assert_eq!(&rows[0]["Age"], "30");
//! # Ok(())
//! # }
//! ```
//!
//! ## Key Features
//!
//! ### Sniffing
//!
//! - **Encoding**: UTF-8 (with or without BOM), UTF-16 LE/BE, UTF-32 LE/BE,
//!   with a configurable single-byte fallback such as windows-1252
//! - **Delimiter**: `,` `;` tab `|` and `:` chosen by consistent per-line counts
//!
//! ### Validation
//!
//! - Header checks report every missing column at once
//! - Values convert to `String`, `Int`, `Decimal`, `DateTime` or `Boolean`
//! - Fail on the first bad row, or collect every issue with
//!   [`ValidationMode::AccumulateAll`]
//!
//! ### Streaming
//!
//! Large inputs can be parsed one row at a time, either from a blocking
//! [`std::io::Read`] or from a tokio [`AsyncRead`](tokio::io::AsyncRead):
//!
//! ```rust
//! use futures::StreamExt;
//! use term_csv::prelude::*;
//! use term_csv::sniff::TextEncoding;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> term_csv::Result<()> {
//! let engine = ParsingEngine::new(ParsingOptions::default())?;
//! let mut rows = engine.parse_stream(&b"id;name\n1;a\n2;b\n"[..], None, TextEncoding::Utf8);
//!
//! while let Some(row) = rows.next().await {
//!     let row = row?;
//!     println!("{} -> {}", &row["id"], &row["name"]);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Observability
//!
//! The engine emits structured events with the `tracing` crate. Installing a
//! subscriber is up to the application; see [`logging::setup`].
//!
//! ## Architecture
//!
//! - **`sniff`**: encoding and delimiter detection, incremental decoding
//! - **`tokenizer`**: quote-aware splitting of one line
//! - **`schema`**: column declarations, rules and typed conversion
//! - **`engine`**: whole-text, file, reader and stream parsing
//! - **`options`**: parser configuration
//! - **`error`**: the [`CsvError`] type
//! - **`logging`**: log configuration and subscriber setup

pub mod engine;
pub mod error;
pub mod logging;
pub mod options;
pub mod prelude;
pub mod row;
pub mod schema;
pub mod sniff;
pub mod tokenizer;

pub use engine::{ParsingEngine, RowReader, RowStream};
pub use error::{CsvError, Result};
pub use options::{ParsingOptions, ValidationMode};
pub use row::Row;
