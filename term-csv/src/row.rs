//! Parsed records.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;
use std::ops::Index;
use std::sync::Arc;

/// One parsed data record: an ordered mapping from column name to value.
///
/// Rows from the same parse share their header names. A row is immutable once
/// handed to the caller.
///
/// # Examples
///
/// ```rust
/// use term_csv::Row;
///
/// let row = Row::from_pairs([("Name", "John"), ("Age", "30")]);
/// assert_eq!(row.get("Age"), Some("30"));
/// assert_eq!(row.find("age"), Some("30"));
/// assert_eq!(&row["Name"], "John");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    headers: Arc<[String]>,
    values: Vec<String>,
    line: usize,
}

impl Row {
    /// Zips `fields` against `headers`.
    ///
    /// Missing trailing fields become empty strings and fields beyond the
    /// header count are dropped.
    pub fn new(headers: Arc<[String]>, mut fields: Vec<String>, line: usize) -> Self {
        fields.resize(headers.len(), String::new());
        Self {
            headers,
            values: fields,
            line,
        }
    }

    /// Builds a row from name/value pairs, mostly useful in tests.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let (headers, values): (Vec<String>, Vec<String>) = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .unzip();
        Self {
            headers: headers.into(),
            values,
            line: 0,
        }
    }

    /// Returns the value of `column` using an exact name match.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.headers
            .iter()
            .position(|h| h == column)
            .map(|idx| self.values[idx].as_str())
    }

    /// Returns the value of `column`, falling back to an ASCII
    /// case-insensitive match when no exact match exists.
    pub fn find(&self, column: &str) -> Option<&str> {
        self.get(column).or_else(|| {
            self.headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(column))
                .map(|idx| self.values[idx].as_str())
        })
    }

    /// Returns true if the row has a column named exactly `column`.
    pub fn contains(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }

    /// Column names in order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Values in column order.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// 0-based physical line number the row was read from.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates `(column, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.headers
            .iter()
            .zip(self.values.iter())
            .map(|(h, v)| (h.as_str(), v.as_str()))
    }

    /// Converts the row into an unordered map.
    pub fn into_map(self) -> HashMap<String, String> {
        self.headers.iter().cloned().zip(self.values).collect()
    }
}

impl Index<&str> for Row {
    type Output = str;

    /// # Panics
    ///
    /// Panics if the column does not exist.
    fn index(&self, column: &str) -> &str {
        match self.get(column) {
            Some(value) => value,
            None => panic!("column '{column}' not found in row"),
        }
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Arc<[String]> {
        names.iter().map(|s| s.to_string()).collect::<Vec<_>>().into()
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let row = Row::new(headers(&["a", "b", "c"]), vec!["1".to_string()], 1);
        assert_eq!(row.values(), &["1", "", ""]);
        assert_eq!(row.get("c"), Some(""));
    }

    #[test]
    fn test_extra_fields_are_dropped() {
        let fields = vec!["1".to_string(), "2".to_string(), "3".to_string()];
        let row = Row::new(headers(&["a", "b"]), fields, 1);
        assert_eq!(row.len(), 2);
        assert_eq!(row.values(), &["1", "2"]);
    }

    #[test]
    fn test_lookup() {
        let row = Row::from_pairs([("Name", "John"), ("name", "lower")]);
        assert_eq!(row.get("Name"), Some("John"));
        assert_eq!(row.get("NAME"), None);
        assert_eq!(row.find("NAME"), Some("John"));
        assert_eq!(row.find("name"), Some("lower"));
        assert!(row.contains("Name"));
        assert!(!row.contains("Age"));
    }

    #[test]
    #[should_panic(expected = "column 'Missing' not found in row")]
    fn test_index_panics_on_missing_column() {
        let row = Row::from_pairs([("a", "1")]);
        let _ = &row["Missing"];
    }

    #[test]
    fn test_serializes_in_column_order() {
        let row = Row::from_pairs([("b", "2"), ("a", "1")]);
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"b":"2","a":"1"}"#);
    }

    #[test]
    fn test_into_map() {
        let map = Row::from_pairs([("a", "1"), ("b", "2")]).into_map();
        assert_eq!(map.get("b").map(String::as_str), Some("2"));
    }
}
