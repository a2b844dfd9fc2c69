//! Declarative column schemas and row validation.
//!
//! A [`Schema`] is an ordered set of [`ColumnSchema`] declarations. It checks
//! two things separately:
//!
//! - **Structure**: [`Schema::validate_headers`] fails with
//!   [`CsvError::Template`] when declared columns are absent from the header
//!   line.
//! - **Values**: [`Schema::validate_row`] converts each value to its declared
//!   [`ColumnType`] and applies the column's [`ValidationRule`], failing with
//!   [`CsvError::Validation`] at the first problem.
//!
//! ## Example
//!
//! ```rust
//! use term_csv::schema::{Schema, ValidationRule};
//! use term_csv::Row;
//!
//! # fn main() -> term_csv::Result<()> {
//! let mut schema = Schema::new();
//! schema
//!     .add_string("Name", ValidationRule::new().required())?
//!     .add_int("Age", None)?
//!     .add_string("Email", ValidationRule::new().pattern(r"^[^@]+@[^@]+$")?)?;
//!
//! schema.validate_headers(&["name", "AGE", "Email"])?;
//!
//! let row = Row::from_pairs([("Name", "John"), ("Age", "30"), ("Email", "john@example.com")]);
//! schema.validate_row(&row, 1)?;
//! # Ok(())
//! # }
//! ```

mod column;
mod rule;
mod types;

pub use column::ColumnSchema;
pub use rule::{Predicate, RuleViolation, ValidationRule};
pub use types::{ColumnType, ConversionError, TypedValue};

use crate::error::{CsvError, IssueKind, Result, ValidationIssue};
use crate::row::Row;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Ordered mapping from column name to [`ColumnSchema`].
///
/// Names are stored case-sensitively and are unique; adding a column with an
/// existing name replaces the declaration in place. Header matching is ASCII
/// case-insensitive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<ColumnSchema>", into = "Vec<ColumnSchema>")]
pub struct Schema {
    columns: Vec<ColumnSchema>,
    index: HashMap<String, usize>,
}

impl Schema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a schema from a JSON array of column declarations.
    ///
    /// ```rust
    /// use term_csv::schema::{ColumnType, Schema};
    ///
    /// let schema = Schema::from_json(r#"[
    ///     {"name": "id", "type": "int", "rule": {"is_required": true}},
    ///     {"name": "email", "type": "string", "rule": {"pattern": "@"}}
    /// ]"#).unwrap();
    /// assert_eq!(schema.column_names(), vec!["id", "email"]);
    /// assert_eq!(schema.column("id").unwrap().column_type(), ColumnType::Int);
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Adds or replaces a column.
    pub fn add_column(
        &mut self,
        name: impl Into<String>,
        column_type: ColumnType,
        rule: impl Into<Option<ValidationRule>>,
    ) -> Result<&mut Self> {
        let column = ColumnSchema::new(name, column_type, rule.into())?;
        self.insert(column);
        Ok(self)
    }

    /// Adds a `String` column.
    pub fn add_string(
        &mut self,
        name: impl Into<String>,
        rule: impl Into<Option<ValidationRule>>,
    ) -> Result<&mut Self> {
        self.add_column(name, ColumnType::String, rule)
    }

    /// Adds an `Int` column.
    pub fn add_int(
        &mut self,
        name: impl Into<String>,
        rule: impl Into<Option<ValidationRule>>,
    ) -> Result<&mut Self> {
        self.add_column(name, ColumnType::Int, rule)
    }

    /// Adds a `Decimal` column.
    pub fn add_decimal(
        &mut self,
        name: impl Into<String>,
        rule: impl Into<Option<ValidationRule>>,
    ) -> Result<&mut Self> {
        self.add_column(name, ColumnType::Decimal, rule)
    }

    /// Adds a `DateTime` column.
    pub fn add_datetime(
        &mut self,
        name: impl Into<String>,
        rule: impl Into<Option<ValidationRule>>,
    ) -> Result<&mut Self> {
        self.add_column(name, ColumnType::DateTime, rule)
    }

    /// Adds a `Boolean` column.
    pub fn add_boolean(
        &mut self,
        name: impl Into<String>,
        rule: impl Into<Option<ValidationRule>>,
    ) -> Result<&mut Self> {
        self.add_column(name, ColumnType::Boolean, rule)
    }

    fn insert(&mut self, column: ColumnSchema) {
        match self.index.get(column.name()) {
            Some(&idx) => self.columns[idx] = column,
            None => {
                self.index.insert(column.name().to_string(), self.columns.len());
                self.columns.push(column);
            }
        }
    }

    /// Column names in declaration order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(ColumnSchema::name).collect()
    }

    /// Column declarations in declaration order.
    pub fn columns(&self) -> &[ColumnSchema] {
        &self.columns
    }

    /// Looks a column up by its exact name.
    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.index.get(name).map(|&idx| &self.columns[idx])
    }

    /// Number of declared columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if no columns are declared.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Checks that every declared column appears in `headers`.
    ///
    /// All missing names are reported in one [`CsvError::Template`].
    pub fn validate_headers<S: AsRef<str>>(&self, headers: &[S]) -> Result<()> {
        let missing: Vec<String> = self
            .columns
            .iter()
            .filter(|column| {
                !headers
                    .iter()
                    .any(|h| h.as_ref().eq_ignore_ascii_case(column.name()))
            })
            .map(|column| column.name().to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            debug!(missing = ?missing, "Header validation failed");
            Err(CsvError::Template { missing })
        }
    }

    /// Validates a row, stopping at the first failing column.
    pub fn validate_row(&self, row: &Row, row_index: usize) -> Result<()> {
        for column in &self.columns {
            if let Some(issue) = self.check_column(column, row, row_index) {
                return Err(CsvError::Validation(issue));
            }
        }
        Ok(())
    }

    /// Validates a row and returns the first issue of every failing column.
    pub fn validate_row_all(&self, row: &Row, row_index: usize) -> Vec<ValidationIssue> {
        self.columns
            .iter()
            .filter_map(|column| self.check_column(column, row, row_index))
            .collect()
    }

    fn check_column(
        &self,
        column: &ColumnSchema,
        row: &Row,
        row_index: usize,
    ) -> Option<ValidationIssue> {
        match row.find(column.name()) {
            Some(value) => column.validate_value(value, row_index).err(),
            None => {
                let required = column.rule().map_or(false, |rule| rule.is_required);
                required.then(|| {
                    ValidationIssue::new(
                        column.name(),
                        row_index,
                        IssueKind::MissingColumn,
                        format!("required column '{}' is missing", column.name()),
                    )
                })
            }
        }
    }

    /// Converts the declared columns of `row` to typed values.
    ///
    /// Columns absent from the row are left out. Fails on the first value
    /// that does not convert.
    pub fn convert_row(&self, row: &Row) -> Result<Vec<(String, TypedValue)>> {
        let mut typed = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            let Some(value) = row.find(column.name()) else {
                continue;
            };
            let converted = column.column_type().convert(value).map_err(|e| {
                CsvError::Validation(ValidationIssue::new(
                    column.name(),
                    row.line(),
                    IssueKind::TypeConversion {
                        expected: column.column_type().name().to_string(),
                    },
                    e.to_string(),
                ))
            })?;
            typed.push((column.name().to_string(), converted));
        }
        Ok(typed)
    }
}

impl TryFrom<Vec<ColumnSchema>> for Schema {
    type Error = CsvError;

    fn try_from(columns: Vec<ColumnSchema>) -> Result<Self> {
        let mut schema = Schema::new();
        for column in columns {
            if column.name().trim().is_empty() {
                return Err(CsvError::Argument(
                    "column name must not be empty".to_string(),
                ));
            }
            schema.insert(column);
        }
        Ok(schema)
    }
}

impl From<Schema> for Vec<ColumnSchema> {
    fn from(schema: Schema) -> Self {
        schema.columns
    }
}
