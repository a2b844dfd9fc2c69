//! Heuristic detection of structural parameters.
//!
//! - [`EncodingSniffer`]: picks a text encoding from byte order marks or UTF-8 validity
//! - [`DelimiterSniffer`]: picks a field separator from a handful of sample lines

mod delimiter;
mod encoding;

pub use delimiter::{
    detect_delimiter, DelimiterSniffer, CANDIDATE_DELIMITERS, DEFAULT_DELIMITER,
    DEFAULT_SAMPLE_LINES,
};
pub use encoding::{EncodingSniffer, StreamDecoder, TextEncoding, DEFAULT_SAMPLE_SIZE};
