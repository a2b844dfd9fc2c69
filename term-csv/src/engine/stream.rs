//! Async row stream over a tokio [`AsyncRead`].

use super::assembler::RowAssembler;
use super::lines::LineBuffer;
use crate::error::{ErrorContext, Result};
use crate::row::Row;
use crate::schema::Schema;
use futures::stream::{self, BoxStream, Stream};
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncReadExt};

/// Single-pass stream of rows.
///
/// Created by [`ParsingEngine::parse_stream`](crate::ParsingEngine::parse_stream).
/// Bytes are read only when the next row is polled, so at most one chunk is
/// held ahead of the current row. Dropping the stream between rows cancels
/// the parse. The stream ends after the first error.
pub struct RowStream {
    inner: BoxStream<'static, Result<Row>>,
}

struct StreamState<R> {
    reader: R,
    buffer: Vec<u8>,
    lines: LineBuffer,
    assembler: RowAssembler,
    schema: Option<Schema>,
}

impl RowStream {
    pub(crate) fn new<R>(
        reader: R,
        buffer_size: usize,
        lines: LineBuffer,
        assembler: RowAssembler,
        schema: Option<Schema>,
    ) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let state = StreamState {
            reader,
            buffer: vec![0; buffer_size],
            lines,
            assembler,
            schema,
        };
        let inner = stream::try_unfold(state, next_row);
        Self {
            inner: Box::pin(inner),
        }
    }
}

async fn next_row<R>(mut state: StreamState<R>) -> Result<Option<(Row, StreamState<R>)>>
where
    R: AsyncRead + Unpin,
{
    loop {
        if let Some((line_no, line)) = state.lines.next_line() {
            let row = state
                .assembler
                .push_line(&line, line_no, state.schema.as_ref())?;
            match row {
                Some(row) => return Ok(Some((row, state))),
                None => continue,
            }
        }
        if state.lines.is_finished() {
            state.assembler.finish()?;
            return Ok(None);
        }
        let read = state
            .reader
            .read(&mut state.buffer)
            .await
            .context("failed to read input stream")?;
        state.lines.feed(&state.buffer[..read], read == 0);
    }
}

impl Stream for RowStream {
    type Item = Result<Row>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl fmt::Debug for RowStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowStream").finish_non_exhaustive()
    }
}
