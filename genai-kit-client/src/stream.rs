//! Server-sent events parser for `streamGenerateContent?alt=sse`.
//!
//! Each `data:` line carries a complete `GenerateContentResponse` chunk, not
//! a delta. Chunks are yielded in the order they arrive. A chunk that fails
//! to decode is yielded as an error rather than skipped.

use crate::error::ClientError;
use crate::types::GenerateContentResponse;
use bytes::Bytes;
use futures::Stream;
use pin_project_lite::pin_project;
use std::pin::Pin;
use std::task::{Context, Poll};

pin_project! {
    /// Parses an SSE byte stream into response chunks.
    pub struct SseResponseStream<S> {
        #[pin]
        inner: S,
        buffer: Vec<u8>,
        done: bool,
    }
}

impl<S> SseResponseStream<S> {
    /// Wrap a byte stream.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
            done: false,
        }
    }
}

/// Outcome of inspecting one SSE line.
enum Line {
    Skip,
    Done,
    Chunk(Result<GenerateContentResponse, ClientError>),
}

fn parse_line(raw: &[u8]) -> Line {
    let line = match std::str::from_utf8(raw) {
        Ok(s) => s.trim(),
        Err(e) => return Line::Chunk(Err(ClientError::invalid_response(e.to_string()))),
    };

    // Comments, blank separators and non-data fields.
    let Some(data) = line.strip_prefix("data:") else {
        return Line::Skip;
    };
    let data = data.trim_start();

    if data.is_empty() {
        Line::Skip
    } else if data == "[DONE]" {
        Line::Done
    } else {
        Line::Chunk(serde_json::from_str(data).map_err(ClientError::from))
    }
}

impl<S, E> Stream for SseResponseStream<S>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Into<ClientError>,
{
    type Item = Result<GenerateContentResponse, ClientError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        if *this.done {
            return Poll::Ready(None);
        }

        loop {
            while let Some(pos) = this.buffer.iter().position(|b| *b == b'\n') {
                let raw: Vec<u8> = this.buffer.drain(..=pos).collect();
                match parse_line(&raw) {
                    Line::Skip => continue,
                    Line::Done => {
                        *this.done = true;
                        return Poll::Ready(None);
                    }
                    Line::Chunk(chunk) => return Poll::Ready(Some(chunk)),
                }
            }

            match this.inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => this.buffer.extend_from_slice(&bytes),
                Poll::Ready(Some(Err(e))) => {
                    *this.done = true;
                    return Poll::Ready(Some(Err(e.into())));
                }
                Poll::Ready(None) => {
                    *this.done = true;
                    let rest = std::mem::take(this.buffer);
                    return match parse_line(&rest) {
                        Line::Chunk(chunk) => Poll::Ready(Some(chunk)),
                        Line::Skip | Line::Done => Poll::Ready(None),
                    };
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
