//! Blocking row iterator over any [`Read`] source.

use super::assembler::RowAssembler;
use super::lines::LineBuffer;
use crate::error::{CsvError, Result};
use crate::row::Row;
use crate::schema::Schema;
use std::io::{ErrorKind, Read};

/// Single-pass iterator of rows pulled from a reader.
///
/// Created by [`ParsingEngine::rows_from_reader`](crate::ParsingEngine::rows_from_reader).
/// Reads `buffer_size` bytes at a time and yields each row as soon as its
/// line is complete. The iterator ends after the first error.
pub struct RowReader<R> {
    reader: R,
    buffer: Vec<u8>,
    lines: LineBuffer,
    assembler: RowAssembler,
    schema: Option<Schema>,
    done: bool,
}

impl<R: Read> RowReader<R> {
    pub(crate) fn new(
        reader: R,
        buffer_size: usize,
        lines: LineBuffer,
        assembler: RowAssembler,
        schema: Option<Schema>,
    ) -> Self {
        Self {
            reader,
            buffer: vec![0; buffer_size],
            lines,
            assembler,
            schema,
            done: false,
        }
    }

    /// Rows yielded so far.
    pub fn rows_read(&self) -> usize {
        self.assembler.emitted()
    }

    fn next_row(&mut self) -> Result<Option<Row>> {
        loop {
            if let Some((line_no, line)) = self.lines.next_line() {
                match self.assembler.push_line(&line, line_no, self.schema.as_ref())? {
                    Some(row) => return Ok(Some(row)),
                    None => continue,
                }
            }
            if self.lines.is_finished() {
                self.assembler.finish()?;
                return Ok(None);
            }
            let read = match self.reader.read(&mut self.buffer) {
                Ok(read) => read,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(CsvError::parse_with_source(
                        "failed to read input",
                        Box::new(e),
                    ))
                }
            };
            self.lines.feed(&self.buffer[..read], read == 0);
        }
    }
}

impl<R: Read> Iterator for RowReader<R> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_row() {
            Ok(Some(row)) => Some(Ok(row)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<R> std::fmt::Debug for RowReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowReader")
            .field("buffer_size", &self.buffer.len())
            .field("rows_read", &self.assembler.emitted())
            .field("done", &self.done)
            .finish()
    }
}
