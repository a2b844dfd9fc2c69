//! Byte-order-mark and UTF-8 based encoding detection.
//!
//! Detection looks at the first bytes of the input only. When no byte order
//! mark is present the sample is validated as strict UTF-8 and, if that fails,
//! the configured fallback encoding is used (windows-1252 unless changed).
//!
//! UTF-16 and legacy encodings are decoded with `encoding_rs`. `encoding_rs`
//! implements the WHATWG encoding standard which has no UTF-32, so UTF-32 is
//! decoded here.

use crate::error::{CsvError, Result};
use encoding_rs::{CoderResult, Decoder, Encoding, UTF_16BE, UTF_16LE, UTF_8, WINDOWS_1252};
use std::fmt;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use tracing::{debug, instrument};

/// Number of bytes inspected when no byte order mark is found.
pub const DEFAULT_SAMPLE_SIZE: usize = 1024;

const BOM_UTF8: &[u8] = &[0xEF, 0xBB, 0xBF];
const BOM_UTF16_LE: &[u8] = &[0xFF, 0xFE];
const BOM_UTF16_BE: &[u8] = &[0xFE, 0xFF];
const BOM_UTF32_LE: &[u8] = &[0xFF, 0xFE, 0x00, 0x00];
const BOM_UTF32_BE: &[u8] = &[0x00, 0x00, 0xFE, 0xFF];

/// A text encoding the parser can decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// UTF-8 without a byte order mark
    Utf8,
    /// UTF-8 prefixed with `EF BB BF`
    Utf8Bom,
    /// UTF-16 little-endian
    Utf16Le,
    /// UTF-16 big-endian
    Utf16Be,
    /// UTF-32 little-endian
    Utf32Le,
    /// UTF-32 big-endian
    Utf32Be,
    /// Any other encoding known to `encoding_rs` (e.g. windows-1252)
    Legacy(&'static Encoding),
}

impl Default for TextEncoding {
    fn default() -> Self {
        TextEncoding::Utf8
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TextEncoding {
    /// Returns the canonical name of the encoding.
    pub fn name(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "UTF-8",
            TextEncoding::Utf8Bom => "UTF-8 (BOM)",
            TextEncoding::Utf16Le => "UTF-16LE",
            TextEncoding::Utf16Be => "UTF-16BE",
            TextEncoding::Utf32Le => "UTF-32LE",
            TextEncoding::Utf32Be => "UTF-32BE",
            TextEncoding::Legacy(encoding) => encoding.name(),
        }
    }

    /// Looks an encoding up by label, e.g. `"utf-8"`, `"utf-32be"`, `"latin1"`.
    ///
    /// Labels are matched case-insensitively using the WHATWG label table,
    /// extended with the UTF-32 labels.
    pub fn for_label(label: &str) -> Option<Self> {
        let normalized = label.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "utf-32" | "utf-32le" | "utf32" | "utf32le" => return Some(TextEncoding::Utf32Le),
            "utf-32be" | "utf32be" => return Some(TextEncoding::Utf32Be),
            "utf-8-bom" | "utf-8-sig" => return Some(TextEncoding::Utf8Bom),
            _ => {}
        }
        Encoding::for_label(normalized.as_bytes()).map(Self::from_encoding)
    }

    /// Wraps an `encoding_rs` encoding.
    pub fn from_encoding(encoding: &'static Encoding) -> Self {
        if encoding == UTF_8 {
            TextEncoding::Utf8
        } else if encoding == UTF_16LE {
            TextEncoding::Utf16Le
        } else if encoding == UTF_16BE {
            TextEncoding::Utf16Be
        } else {
            TextEncoding::Legacy(encoding)
        }
    }

    /// The byte order mark this encoding may start with.
    pub fn bom(&self) -> &'static [u8] {
        match self {
            TextEncoding::Utf8 | TextEncoding::Utf8Bom => BOM_UTF8,
            TextEncoding::Utf16Le => BOM_UTF16_LE,
            TextEncoding::Utf16Be => BOM_UTF16_BE,
            TextEncoding::Utf32Le => BOM_UTF32_LE,
            TextEncoding::Utf32Be => BOM_UTF32_BE,
            TextEncoding::Legacy(_) => &[],
        }
    }

    /// Decodes a complete buffer, dropping a leading byte order mark.
    ///
    /// Malformed sequences are replaced with U+FFFD.
    pub fn decode(&self, bytes: &[u8]) -> String {
        let mut decoder = StreamDecoder::new(*self);
        let mut out = String::with_capacity(bytes.len());
        decoder.decode_chunk(bytes, true, &mut out);
        out
    }
}

/// Incremental decoder for chunked input.
///
/// Multi-byte sequences split across chunks are carried over to the next
/// call. A byte order mark at the very start of the input is dropped.
pub struct StreamDecoder {
    kind: DecoderKind,
}

enum DecoderKind {
    Whatwg(Decoder),
    Utf32 {
        big_endian: bool,
        pending: Vec<u8>,
        at_start: bool,
    },
}

impl fmt::Debug for StreamDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DecoderKind::Whatwg(decoder) => f
                .debug_struct("StreamDecoder")
                .field("encoding", &decoder.encoding().name())
                .finish(),
            DecoderKind::Utf32 { big_endian, .. } => f
                .debug_struct("StreamDecoder")
                .field("encoding", &if *big_endian { "UTF-32BE" } else { "UTF-32LE" })
                .finish(),
        }
    }
}

impl StreamDecoder {
    /// Creates a decoder for the given encoding.
    pub fn new(encoding: TextEncoding) -> Self {
        let kind = match encoding {
            TextEncoding::Utf8 | TextEncoding::Utf8Bom => {
                DecoderKind::Whatwg(UTF_8.new_decoder_with_bom_removal())
            }
            TextEncoding::Utf16Le => DecoderKind::Whatwg(UTF_16LE.new_decoder_with_bom_removal()),
            TextEncoding::Utf16Be => DecoderKind::Whatwg(UTF_16BE.new_decoder_with_bom_removal()),
            TextEncoding::Legacy(encoding) => {
                DecoderKind::Whatwg(encoding.new_decoder_without_bom_handling())
            }
            TextEncoding::Utf32Le => DecoderKind::Utf32 {
                big_endian: false,
                pending: Vec::new(),
                at_start: true,
            },
            TextEncoding::Utf32Be => DecoderKind::Utf32 {
                big_endian: true,
                pending: Vec::new(),
                at_start: true,
            },
        };
        Self { kind }
    }

    /// Decodes `bytes` and appends the text to `out`.
    ///
    /// `last` must be set on the final call so incomplete trailing sequences
    /// are flushed as replacement characters.
    pub fn decode_chunk(&mut self, bytes: &[u8], last: bool, out: &mut String) {
        match &mut self.kind {
            DecoderKind::Whatwg(decoder) => {
                let mut src = bytes;
                loop {
                    let needed = decoder
                        .max_utf8_buffer_length(src.len())
                        .unwrap_or(src.len() * 3 + 16);
                    out.reserve(needed);
                    let (result, read, _) = decoder.decode_to_string(src, out, last);
                    src = &src[read..];
                    match result {
                        CoderResult::InputEmpty => break,
                        CoderResult::OutputFull => continue,
                    }
                }
            }
            DecoderKind::Utf32 {
                big_endian,
                pending,
                at_start,
            } => {
                pending.extend_from_slice(bytes);
                let mut units = pending.chunks_exact(4);
                for unit in &mut units {
                    let quad = [unit[0], unit[1], unit[2], unit[3]];
                    let code = if *big_endian {
                        u32::from_be_bytes(quad)
                    } else {
                        u32::from_le_bytes(quad)
                    };
                    if *at_start {
                        *at_start = false;
                        if code == 0xFEFF {
                            continue;
                        }
                    }
                    out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
                }
                let rest = units.remainder().to_vec();
                *pending = rest;
                if last && !pending.is_empty() {
                    pending.clear();
                    out.push(char::REPLACEMENT_CHARACTER);
                }
            }
        }
    }
}

/// Picks a text encoding from a byte prefix.
///
/// # Examples
///
/// ```rust
/// use term_csv::sniff::{EncodingSniffer, TextEncoding};
///
/// let sniffer = EncodingSniffer::new();
/// assert_eq!(sniffer.detect(&[0xEF, 0xBB, 0xBF, b'a']), TextEncoding::Utf8Bom);
/// assert_eq!(sniffer.detect(b"plain ascii"), TextEncoding::Utf8);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct EncodingSniffer {
    fallback: &'static Encoding,
    sample_size: usize,
}

impl Default for EncodingSniffer {
    fn default() -> Self {
        Self {
            fallback: WINDOWS_1252,
            sample_size: DEFAULT_SAMPLE_SIZE,
        }
    }
}

impl EncodingSniffer {
    /// Creates a sniffer with a windows-1252 fallback and a 1024 byte sample.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the encoding returned when the sample is neither marked nor UTF-8.
    pub fn with_fallback(mut self, fallback: &'static Encoding) -> Self {
        self.fallback = fallback;
        self
    }

    /// Sets how many bytes are validated when no byte order mark is present.
    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size.max(4);
        self
    }

    /// The encoding used when detection finds neither a mark nor UTF-8.
    pub fn fallback(&self) -> TextEncoding {
        TextEncoding::from_encoding(self.fallback)
    }

    /// Detects the encoding of a byte prefix.
    pub fn detect(&self, bytes: &[u8]) -> TextEncoding {
        let detected = if bytes.starts_with(BOM_UTF8) {
            TextEncoding::Utf8Bom
        } else if bytes.starts_with(BOM_UTF16_LE) {
            if bytes[2..].starts_with(&[0x00, 0x00]) {
                TextEncoding::Utf32Le
            } else {
                TextEncoding::Utf16Le
            }
        } else if bytes.starts_with(BOM_UTF16_BE) {
            TextEncoding::Utf16Be
        } else if bytes.starts_with(BOM_UTF32_BE) {
            TextEncoding::Utf32Be
        } else {
            self.detect_unmarked(bytes)
        };
        debug!(encoding = %detected, sample_len = bytes.len(), "Detected encoding");
        detected
    }

    fn detect_unmarked(&self, bytes: &[u8]) -> TextEncoding {
        let sample_len = bytes.len().min(self.sample_size);
        let sample = &bytes[..sample_len];
        match std::str::from_utf8(sample) {
            Ok(_) => TextEncoding::Utf8,
            // A sequence cut by the sample boundary is not evidence against UTF-8
            Err(e) if e.error_len().is_none() && sample_len == self.sample_size => {
                TextEncoding::Utf8
            }
            Err(_) => self.fallback(),
        }
    }

    /// Detects the encoding of a file from its first bytes.
    ///
    /// The file is opened, at most the sample size is read, and the handle is
    /// closed before this returns.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn detect_file(&self, path: impl AsRef<Path>) -> Result<TextEncoding> {
        let path = path.as_ref();
        let prefix = {
            let file = File::open(path).map_err(|e| match e.kind() {
                ErrorKind::NotFound => CsvError::NotFound {
                    path: path.to_path_buf(),
                },
                _ => CsvError::parse_with_source(
                    format!("Failed to open '{}'", path.display()),
                    Box::new(e),
                ),
            })?;
            let mut prefix = Vec::with_capacity(self.sample_size);
            file.take(self.sample_size as u64)
                .read_to_end(&mut prefix)
                .map_err(|e| {
                    CsvError::parse_with_source(
                        format!("Failed to read '{}'", path.display()),
                        Box::new(e),
                    )
                })?;
            prefix
        };
        Ok(self.detect(&prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_byte_order_marks() {
        let sniffer = EncodingSniffer::new();
        assert_eq!(sniffer.detect(&[0xEF, 0xBB, 0xBF, 0x41]), TextEncoding::Utf8Bom);
        assert_eq!(sniffer.detect(&[0xFF, 0xFE, 0x41, 0x00]), TextEncoding::Utf16Le);
        assert_eq!(sniffer.detect(&[0xFF, 0xFE, 0x00, 0x00]), TextEncoding::Utf32Le);
        assert_eq!(sniffer.detect(&[0xFE, 0xFF, 0x00, 0x41]), TextEncoding::Utf16Be);
        assert_eq!(sniffer.detect(&[0x00, 0x00, 0xFE, 0xFF]), TextEncoding::Utf32Be);
    }

    #[test]
    fn test_short_buffers() {
        let sniffer = EncodingSniffer::new();
        assert_eq!(sniffer.detect(&[]), TextEncoding::Utf8);
        assert_eq!(sniffer.detect(&[0xFF, 0xFE]), TextEncoding::Utf16Le);
        assert_eq!(sniffer.detect(&[0xFF]), TextEncoding::Legacy(WINDOWS_1252));
    }

    #[test]
    fn test_unmarked_utf8_and_fallback() {
        let sniffer = EncodingSniffer::new();
        assert_eq!(sniffer.detect("naïve,café".as_bytes()), TextEncoding::Utf8);
        // 0xE9 is 'é' in windows-1252 and invalid on its own in UTF-8
        assert_eq!(
            sniffer.detect(b"caf\xE9,ok"),
            TextEncoding::Legacy(WINDOWS_1252)
        );

        let latin2 = EncodingSniffer::new().with_fallback(encoding_rs::ISO_8859_2);
        assert_eq!(
            latin2.detect(b"caf\xE9"),
            TextEncoding::Legacy(encoding_rs::ISO_8859_2)
        );
    }

    #[test]
    fn test_sample_boundary_inside_multibyte_char() {
        let sniffer = EncodingSniffer::new().with_sample_size(4);
        // "abc" + first byte of 'é' fills the 4 byte sample
        assert_eq!(sniffer.detect("abcé".as_bytes()), TextEncoding::Utf8);
        // Invalid bytes past the sample are not inspected
        assert_eq!(sniffer.detect(b"abcd\xFF"), TextEncoding::Utf8);
    }

    #[test]
    fn test_decode_strips_bom() {
        assert_eq!(TextEncoding::Utf8Bom.decode(b"\xEF\xBB\xBFa,b"), "a,b");

        let utf16: Vec<u8> = [0xFF, 0xFE]
            .into_iter()
            .chain("a,b".encode_utf16().flat_map(|u| u.to_le_bytes()))
            .collect();
        assert_eq!(TextEncoding::Utf16Le.decode(&utf16), "a,b");

        let utf32: Vec<u8> = [0x00, 0x00, 0xFE, 0xFF]
            .into_iter()
            .chain("x;é".chars().flat_map(|c| (c as u32).to_be_bytes()))
            .collect();
        assert_eq!(TextEncoding::Utf32Be.decode(&utf32), "x;é");

        assert_eq!(TextEncoding::Legacy(WINDOWS_1252).decode(b"caf\xE9"), "café");
    }

    #[test]
    fn test_stream_decoder_handles_split_sequences() {
        let bytes = "héllo".as_bytes();
        let mut decoder = StreamDecoder::new(TextEncoding::Utf8);
        let mut out = String::new();
        decoder.decode_chunk(&bytes[..2], false, &mut out);
        decoder.decode_chunk(&bytes[2..], true, &mut out);
        assert_eq!(out, "héllo");

        let utf32: Vec<u8> = "ab".chars().flat_map(|c| (c as u32).to_le_bytes()).collect();
        let mut decoder = StreamDecoder::new(TextEncoding::Utf32Le);
        let mut out = String::new();
        decoder.decode_chunk(&utf32[..3], false, &mut out);
        decoder.decode_chunk(&utf32[3..], false, &mut out);
        decoder.decode_chunk(&[0x41], true, &mut out);
        assert_eq!(out, "ab\u{FFFD}");
    }

    #[test]
    fn test_for_label() {
        assert_eq!(TextEncoding::for_label("UTF-8"), Some(TextEncoding::Utf8));
        assert_eq!(TextEncoding::for_label("utf-16le"), Some(TextEncoding::Utf16Le));
        assert_eq!(TextEncoding::for_label("utf-32be"), Some(TextEncoding::Utf32Be));
        assert_eq!(
            TextEncoding::for_label("latin1"),
            Some(TextEncoding::Legacy(WINDOWS_1252))
        );
        assert_eq!(TextEncoding::for_label("no-such-encoding"), None);
    }

    #[test]
    fn test_detect_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0xFE, 0xFF, 0x00, b'a']).unwrap();
        let sniffer = EncodingSniffer::new();
        assert_eq!(
            sniffer.detect_file(file.path()).unwrap(),
            TextEncoding::Utf16Be
        );
    }

    #[test]
    fn test_detect_missing_file() {
        let err = EncodingSniffer::new()
            .detect_file("/definitely/not/here.csv")
            .unwrap_err();
        assert!(matches!(err, CsvError::NotFound { .. }));
    }
}
