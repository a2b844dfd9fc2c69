//! Column declarations.

use super::{ColumnType, ValidationRule};
use crate::error::{CsvError, IssueKind, Result, ValidationIssue};
use serde::{Deserialize, Serialize};

/// Declaration of a single column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSchema {
    name: String,
    #[serde(rename = "type")]
    column_type: ColumnType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rule: Option<ValidationRule>,
}

impl ColumnSchema {
    /// Creates a column declaration.
    ///
    /// Fails with [`CsvError::Argument`] when `name` is empty or whitespace.
    pub fn new(
        name: impl Into<String>,
        column_type: ColumnType,
        rule: Option<ValidationRule>,
    ) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CsvError::Argument(
                "column name must not be empty".to_string(),
            ));
        }
        Ok(Self {
            name,
            column_type,
            rule,
        })
    }

    /// The column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared type.
    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    /// The attached rule, if any.
    pub fn rule(&self) -> Option<&ValidationRule> {
        self.rule.as_ref()
    }

    /// Validates one value of this column.
    ///
    /// Conversion runs first, then the rule checks.
    pub fn validate_value(
        &self,
        value: &str,
        row_index: usize,
    ) -> std::result::Result<(), ValidationIssue> {
        if let Err(e) = self.column_type.convert(value) {
            return Err(ValidationIssue::new(
                &self.name,
                row_index,
                IssueKind::TypeConversion {
                    expected: self.column_type.name().to_string(),
                },
                format!(
                    "{e} (column '{}', row {row_index}, expected type {})",
                    self.name, self.column_type
                ),
            ));
        }

        if let Some(rule) = &self.rule {
            rule.check(value).map_err(|violation| {
                ValidationIssue::new(&self.name, row_index, violation.kind, violation.message)
            })?;
        }
        Ok(())
    }
}
