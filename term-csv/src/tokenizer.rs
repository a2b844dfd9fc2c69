//! Quote-aware splitting of a single line into fields.

/// Splits lines into fields honoring a quote character.
///
/// Quote characters toggle a quoted region and are not emitted. A doubled
/// quote yields one literal quote when it appears inside a quoted region or
/// in the middle of an unquoted field; at the start of a field it is an empty
/// quoted region. Delimiters inside a quoted region are data. The final field
/// is always emitted, so a line without delimiters yields exactly one field.
///
/// # Examples
///
/// ```rust
/// use term_csv::tokenizer::LineTokenizer;
///
/// let tokenizer = LineTokenizer::new(',', '"');
/// assert_eq!(
///     tokenizer.tokenize(r#"John Doe,"A person with, comma""#),
///     vec!["John Doe", "A person with, comma"]
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineTokenizer {
    delimiter: char,
    quote_char: char,
    trim: bool,
}

impl LineTokenizer {
    /// Creates a tokenizer that keeps surrounding whitespace.
    pub fn new(delimiter: char, quote_char: char) -> Self {
        Self {
            delimiter,
            quote_char,
            trim: false,
        }
    }

    /// Trims each field after quotes have been resolved.
    pub fn with_trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    /// The field delimiter.
    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// The quote character.
    pub fn quote_char(&self) -> char {
        self.quote_char
    }

    /// Splits `line` into fields.
    pub fn tokenize(&self, line: &str) -> Vec<String> {
        let mut fields = Vec::new();
        let mut current = String::new();
        let mut in_quotes = false;
        let mut chars = line.chars().peekable();

        while let Some(c) = chars.next() {
            if c == self.quote_char {
                let escaped = in_quotes || !current.is_empty();
                if escaped && chars.peek() == Some(&self.quote_char) {
                    current.push(self.quote_char);
                    chars.next();
                } else {
                    in_quotes = !in_quotes;
                }
            } else if c == self.delimiter && !in_quotes {
                fields.push(self.finish_field(&mut current));
            } else {
                current.push(c);
            }
        }
        fields.push(self.finish_field(&mut current));
        fields
    }

    fn finish_field(&self, current: &mut String) -> String {
        let field = std::mem::take(current);
        if self.trim {
            let trimmed = field.trim();
            if trimmed.len() != field.len() {
                return trimmed.to_string();
            }
        }
        field
    }
}

/// Splits `line` on `delimiter` honoring `quote_char`, without trimming.
pub fn tokenize(line: &str, delimiter: char, quote_char: char) -> Vec<String> {
    LineTokenizer::new(delimiter, quote_char).tokenize(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_field_with_delimiter() {
        assert_eq!(
            tokenize("John Doe,\"A person with, comma\"", ',', '"'),
            vec!["John Doe", "A person with, comma"]
        );
    }

    #[test]
    fn test_doubled_quote_becomes_literal() {
        assert_eq!(
            tokenize("\"Another \"\"quoted\"\" value\"", ',', '"'),
            vec!["Another \"quoted\" value"]
        );
        assert_eq!(
            tokenize("Another \"\"quoted\"\" value", ',', '"'),
            vec!["Another \"quoted\" value"]
        );
    }

    #[test]
    fn test_empty_quoted_field() {
        assert_eq!(tokenize("a,\"\",b", ',', '"'), vec!["a", "", "b"]);
        assert_eq!(tokenize("\"\"\"\"", ',', '"'), vec!["\""]);
    }

    #[test]
    fn test_line_without_delimiter_yields_one_field() {
        assert_eq!(tokenize("single", ',', '"'), vec!["single"]);
        assert_eq!(tokenize("", ',', '"'), vec![""]);
    }

    #[test]
    fn test_empty_fields_are_kept() {
        assert_eq!(tokenize(",a,,", ',', '"'), vec!["", "a", "", ""]);
    }

    #[test]
    fn test_trim_after_quote_resolution() {
        let tokenizer = LineTokenizer::new(',', '"').with_trim(true);
        assert_eq!(
            tokenizer.tokenize("  a , \"  b  \" ,c  "),
            vec!["a", "b", "c"]
        );

        let untrimmed = LineTokenizer::new(',', '"');
        assert_eq!(
            untrimmed.tokenize(" a ,\" b \""),
            vec![" a ", " b "]
        );
    }

    #[test]
    fn test_alternate_delimiter_and_quote() {
        let tokenizer = LineTokenizer::new(';', '\'');
        assert_eq!(
            tokenizer.tokenize("'x;y';'it''s';\"z\""),
            vec!["x;y", "it's", "\"z\""]
        );
    }

    #[test]
    fn test_unterminated_quote_consumes_rest_of_line() {
        assert_eq!(tokenize("a,\"b,c", ',', '"'), vec!["a", "b,c"]);
    }

    #[test]
    fn test_multibyte_characters() {
        assert_eq!(tokenize("café|naïve|日本", '|', '"'), vec!["café", "naïve", "日本"]);
    }
}
