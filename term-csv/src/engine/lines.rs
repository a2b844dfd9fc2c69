//! Incremental line splitting over decoded byte chunks.

use crate::sniff::{StreamDecoder, TextEncoding};

/// Decodes chunks and hands out complete lines with their physical line
/// numbers. Only the undecoded tail of the current chunk and the partial last
/// line are retained.
#[derive(Debug)]
pub(crate) struct LineBuffer {
    decoder: StreamDecoder,
    text: String,
    pos: usize,
    next_line: usize,
    finished: bool,
}

impl LineBuffer {
    pub(crate) fn new(encoding: TextEncoding) -> Self {
        Self {
            decoder: StreamDecoder::new(encoding),
            text: String::new(),
            pos: 0,
            next_line: 0,
            finished: false,
        }
    }

    /// Appends a chunk. `last` marks the end of input.
    pub(crate) fn feed(&mut self, bytes: &[u8], last: bool) {
        if self.pos > 0 {
            self.text.drain(..self.pos);
            self.pos = 0;
        }
        self.decoder.decode_chunk(bytes, last, &mut self.text);
        if last {
            self.finished = true;
        }
    }

    /// Returns true once the final chunk has been fed.
    pub(crate) fn is_finished(&self) -> bool {
        self.finished
    }

    /// Next complete line without its `\n` or `\r\n` terminator.
    ///
    /// After the final chunk an unterminated remainder is returned as a line.
    pub(crate) fn next_line(&mut self) -> Option<(usize, String)> {
        let rest = &self.text[self.pos..];
        let (line, consumed) = match rest.find('\n') {
            Some(end) => (&rest[..end], end + 1),
            None if self.finished && !rest.is_empty() => (rest, rest.len()),
            None => return None,
        };
        let line = line.strip_suffix('\r').unwrap_or(line).to_string();
        self.pos += consumed;

        let line_no = self.next_line;
        self.next_line += 1;
        Some((line_no, line))
    }
}
