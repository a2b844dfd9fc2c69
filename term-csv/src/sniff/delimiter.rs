//! Field delimiter inference from sampled lines.

use tracing::debug;

/// Delimiters considered during detection, in tie-break order.
pub const CANDIDATE_DELIMITERS: [char; 5] = [',', ';', '\t', '|', ':'];

/// Delimiter used when nothing qualifies.
pub const DEFAULT_DELIMITER: char = ',';

/// Default number of non-empty lines sampled.
pub const DEFAULT_SAMPLE_LINES: usize = 5;

/// Picks the most likely field separator for a text blob.
///
/// A candidate qualifies when it occurs the same number of times (at least
/// once) on every sampled line, outside quoted regions. The qualifying
/// candidate with the most occurrences wins; ties go to the earlier entry of
/// [`CANDIDATE_DELIMITERS`].
///
/// # Examples
///
/// ```rust
/// use term_csv::sniff::DelimiterSniffer;
///
/// let sniffer = DelimiterSniffer::new();
/// assert_eq!(sniffer.detect("a;b;c\n1;2;3"), ';');
/// assert_eq!(sniffer.detect("\"x,y\"|z\n1|2"), '|');
/// ```
#[derive(Debug, Clone, Copy)]
pub struct DelimiterSniffer {
    sample_lines: usize,
    quote_char: char,
}

impl Default for DelimiterSniffer {
    fn default() -> Self {
        Self {
            sample_lines: DEFAULT_SAMPLE_LINES,
            quote_char: '"',
        }
    }
}

impl DelimiterSniffer {
    /// Creates a sniffer sampling 5 lines with `"` as quote character.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how many non-empty lines are sampled.
    pub fn with_sample_lines(mut self, sample_lines: usize) -> Self {
        self.sample_lines = sample_lines;
        self
    }

    /// Sets the quote character used to skip quoted regions.
    pub fn with_quote_char(mut self, quote_char: char) -> Self {
        self.quote_char = quote_char;
        self
    }

    /// Detects the delimiter of `text`.
    pub fn detect(&self, text: &str) -> char {
        let lines: Vec<&str> = text
            .lines()
            .filter(|line| !line.is_empty())
            .take(self.sample_lines)
            .collect();

        if lines.is_empty() {
            debug!("No sample lines, using default delimiter");
            return DEFAULT_DELIMITER;
        }

        let mut best: Option<(char, usize)> = None;
        for candidate in CANDIDATE_DELIMITERS {
            let Some(count) = self.consistent_count(&lines, candidate) else {
                continue;
            };
            // Strictly greater keeps the earlier candidate on ties
            if best.map_or(true, |(_, best_count)| count > best_count) {
                best = Some((candidate, count));
            }
        }

        let delimiter = best.map_or(DEFAULT_DELIMITER, |(delimiter, _)| delimiter);
        debug!(
            delimiter = ?delimiter,
            sampled = lines.len(),
            "Detected delimiter"
        );
        delimiter
    }

    /// Returns the per-line count if it is identical and non-zero on every line.
    fn consistent_count(&self, lines: &[&str], delimiter: char) -> Option<usize> {
        let first = self.count_unquoted(lines[0], delimiter);
        if first == 0 {
            return None;
        }
        lines[1..]
            .iter()
            .all(|line| self.count_unquoted(line, delimiter) == first)
            .then_some(first)
    }

    /// Counts `delimiter` outside quoted regions.
    ///
    /// Every quote character toggles the quoted state; doubled quotes are not
    /// treated as escapes here.
    fn count_unquoted(&self, line: &str, delimiter: char) -> usize {
        let mut in_quotes = false;
        let mut count = 0;
        for c in line.chars() {
            if c == self.quote_char {
                in_quotes = !in_quotes;
            } else if c == delimiter && !in_quotes {
                count += 1;
            }
        }
        count
    }
}

/// Detects the delimiter of `text` sampling `sample_lines` lines.
pub fn detect_delimiter(text: &str, sample_lines: usize) -> char {
    DelimiterSniffer::new()
        .with_sample_lines(sample_lines)
        .detect(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_candidate_is_detected() {
        for delimiter in CANDIDATE_DELIMITERS {
            let text = format!("a{d}b{d}c\n1{d}2{d}3\n4{d}5{d}6", d = delimiter);
            assert_eq!(detect_delimiter(&text, 5), delimiter, "{delimiter:?}");
        }
    }

    #[test]
    fn test_empty_input_defaults_to_comma() {
        assert_eq!(detect_delimiter("", 5), ',');
        assert_eq!(detect_delimiter("\n\n\n", 5), ',');
    }

    #[test]
    fn test_no_candidate_defaults_to_comma() {
        assert_eq!(detect_delimiter("single\ncolumn\nvalues", 5), ',');
    }

    #[test]
    fn test_single_line_needs_one_occurrence() {
        assert_eq!(detect_delimiter("a|b", 5), '|');
    }

    #[test]
    fn test_inconsistent_counts_disqualify() {
        // Commas vary per line, semicolons are consistent
        let text = "a,b;c\nd;e,f,g\nh;i";
        assert_eq!(detect_delimiter(text, 5), ';');
    }

    #[test]
    fn test_highest_count_wins() {
        let text = "a;b,c,d\ne;f,g,h";
        assert_eq!(detect_delimiter(text, 5), ',');
    }

    #[test]
    fn test_ties_follow_candidate_order() {
        let text = "a;b,c\nd;e,f";
        assert_eq!(detect_delimiter(text, 5), ',');
        let text = "a|b\tc\nd|e\tf";
        assert_eq!(detect_delimiter(text, 5), '\t');
    }

    #[test]
    fn test_quoted_delimiters_are_ignored() {
        let text = "name;note\n\"x\";\"a,b,c\"\n\"y\";\"d,e\"";
        assert_eq!(detect_delimiter(text, 5), ';');
    }

    #[test]
    fn test_sample_size_limits_lines() {
        // The third line breaks semicolon consistency only when it is sampled
        let text = "a;b\nc;d\ne,f";
        assert_eq!(detect_delimiter(text, 2), ';');
        assert_eq!(detect_delimiter(text, 3), ',');
    }

    #[test]
    fn test_custom_quote_char() {
        let sniffer = DelimiterSniffer::new().with_quote_char('\'');
        assert_eq!(sniffer.detect("'a;b',c\n'd;e',f"), ',');
    }
}
