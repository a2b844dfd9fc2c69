//! Prelude for commonly used types and traits in term-csv.

pub use crate::engine::{ParsingEngine, RowReader, RowStream};
pub use crate::error::{CsvError, ErrorContext, Result};
pub use crate::logging::LogConfig;
pub use crate::options::{ParsingOptions, ValidationMode};
pub use crate::row::Row;
pub use crate::schema::{ColumnType, Schema, ValidationRule};
