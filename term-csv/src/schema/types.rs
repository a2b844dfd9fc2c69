//! Declared column types and string conversion.

use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

/// The type a column's values must convert to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Any text
    String,
    /// 64-bit signed integer
    Int,
    /// Arbitrary precision decimal
    Decimal,
    /// Date or date-time
    DateTime,
    /// `true` or `false`, case-insensitive
    Boolean,
}

impl ColumnType {
    /// Returns the type name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            ColumnType::String => "String",
            ColumnType::Int => "Int",
            ColumnType::Decimal => "Decimal",
            ColumnType::DateTime => "DateTime",
            ColumnType::Boolean => "Boolean",
        }
    }

    /// Converts a raw field value to this type.
    ///
    /// Blank values (empty or whitespace only) convert to the type's zero
    /// value: `""`, `0`, `0`, the Unix epoch and `false`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use term_csv::schema::{ColumnType, TypedValue};
    ///
    /// assert_eq!(ColumnType::Int.convert("30").unwrap(), TypedValue::Int(30));
    /// assert_eq!(ColumnType::Int.convert("  ").unwrap(), TypedValue::Int(0));
    /// assert!(ColumnType::Int.convert("NotANumber").is_err());
    /// ```
    pub fn convert(&self, raw: &str) -> Result<TypedValue, ConversionError> {
        let value = raw.trim();
        if value.is_empty() {
            return Ok(self.zero_value(raw));
        }

        let converted = match self {
            ColumnType::String => Some(TypedValue::String(raw.to_string())),
            ColumnType::Int => i64::from_str(value).ok().map(TypedValue::Int),
            ColumnType::Decimal => BigDecimal::from_str(value).ok().map(TypedValue::Decimal),
            ColumnType::DateTime => parse_datetime(value).map(TypedValue::DateTime),
            ColumnType::Boolean => parse_bool(value).map(TypedValue::Boolean),
        };

        converted.ok_or_else(|| ConversionError {
            expected: *self,
            value: raw.to_string(),
        })
    }

    fn zero_value(&self, raw: &str) -> TypedValue {
        match self {
            ColumnType::String => TypedValue::String(raw.to_string()),
            ColumnType::Int => TypedValue::Int(0),
            ColumnType::Decimal => TypedValue::Decimal(BigDecimal::zero()),
            ColumnType::DateTime => TypedValue::DateTime(NaiveDateTime::default()),
            ColumnType::Boolean => TypedValue::Boolean(false),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

fn parse_bool(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// A field value converted to its declared type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    /// Text, kept as read
    String(String),
    /// Integer value
    Int(i64),
    /// Decimal value
    Decimal(BigDecimal),
    /// Date-time; values with an offset are normalized to UTC
    DateTime(NaiveDateTime),
    /// Boolean value
    Boolean(bool),
}

impl TypedValue {
    /// The declared type this value belongs to.
    pub fn column_type(&self) -> ColumnType {
        match self {
            TypedValue::String(_) => ColumnType::String,
            TypedValue::Int(_) => ColumnType::Int,
            TypedValue::Decimal(_) => ColumnType::Decimal,
            TypedValue::DateTime(_) => ColumnType::DateTime,
            TypedValue::Boolean(_) => ColumnType::Boolean,
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::String(s) => f.write_str(s),
            TypedValue::Int(i) => write!(f, "{i}"),
            TypedValue::Decimal(d) => write!(f, "{d}"),
            TypedValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
            TypedValue::Boolean(b) => write!(f, "{b}"),
        }
    }
}

/// A value that does not convert to its declared type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot convert '{value}' to {expected}")]
pub struct ConversionError {
    /// The declared type
    pub expected: ColumnType,
    /// The raw value
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_conversion() {
        assert_eq!(ColumnType::Int.convert("30").unwrap(), TypedValue::Int(30));
        assert_eq!(ColumnType::Int.convert(" -7 ").unwrap(), TypedValue::Int(-7));
        let err = ColumnType::Int.convert("NotANumber").unwrap_err();
        assert_eq!(err.expected, ColumnType::Int);
        assert_eq!(err.to_string(), "cannot convert 'NotANumber' to Int");
        assert!(ColumnType::Int.convert("1.5").is_err());
    }

    #[test]
    fn test_blank_values_convert_to_zero() {
        assert_eq!(ColumnType::Int.convert("").unwrap(), TypedValue::Int(0));
        assert_eq!(
            ColumnType::Decimal.convert("   ").unwrap(),
            TypedValue::Decimal(BigDecimal::zero())
        );
        assert_eq!(
            ColumnType::Boolean.convert("").unwrap(),
            TypedValue::Boolean(false)
        );
        assert_eq!(
            ColumnType::DateTime.convert("").unwrap(),
            TypedValue::DateTime(NaiveDateTime::default())
        );
    }

    #[test]
    fn test_decimal_conversion() {
        let value = ColumnType::Decimal.convert("19.99").unwrap();
        assert_eq!(value, TypedValue::Decimal(BigDecimal::from_str("19.99").unwrap()));
        assert!(ColumnType::Decimal.convert("1,5").is_err());
    }

    #[test]
    fn test_datetime_conversion() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        for input in [
            "2024-03-15 10:30:00",
            "2024-03-15T10:30:00",
            "2024-03-15T10:30:00Z",
            "2024-03-15T12:30:00+02:00",
            "03/15/2024 10:30:00",
            "03/15/2024 10:30:00 AM",
        ] {
            assert_eq!(
                ColumnType::DateTime.convert(input).unwrap(),
                TypedValue::DateTime(expected),
                "{input}"
            );
        }

        let midnight = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(
            ColumnType::DateTime.convert("15.03.2024").unwrap(),
            TypedValue::DateTime(midnight)
        );
        assert!(ColumnType::DateTime.convert("yesterday").is_err());
        assert!(ColumnType::DateTime.convert("2024-13-45").is_err());
    }

    #[test]
    fn test_boolean_conversion() {
        assert_eq!(
            ColumnType::Boolean.convert("TRUE").unwrap(),
            TypedValue::Boolean(true)
        );
        assert_eq!(
            ColumnType::Boolean.convert("false").unwrap(),
            TypedValue::Boolean(false)
        );
        assert!(ColumnType::Boolean.convert("yes").is_err());
    }

    #[test]
    fn test_string_keeps_raw_value() {
        assert_eq!(
            ColumnType::String.convert(" padded ").unwrap(),
            TypedValue::String(" padded ".to_string())
        );
    }

    #[test]
    fn test_type_names_round_trip_through_serde() {
        let json = serde_json::to_string(&ColumnType::DateTime).unwrap();
        assert_eq!(json, "\"datetime\"");
        let parsed: ColumnType = serde_json::from_str("\"boolean\"").unwrap();
        assert_eq!(parsed, ColumnType::Boolean);
        assert_eq!(TypedValue::Int(4).column_type(), ColumnType::Int);
    }
}
