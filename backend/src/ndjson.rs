//! Newline-delimited JSON framing for message streams over HTTP bodies.
//!
//! Inbound: one JSON object per `\n`-terminated line, blank lines skipped, a
//! trailing unterminated line accepted. A transport error becomes
//! [`AppError::StreamAborted`], an undecodable or oversized line becomes
//! [`AppError::InvalidRequest`]; either one ends the stream.

use std::pin::Pin;

use axum::body::{Body, Bytes};
use futures::{Stream, StreamExt};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{AppError, AppResult};

pub const CONTENT_TYPE: &str = "application/x-ndjson";

/// Longest accepted line, terminator excluded
pub const MAX_LINE_BYTES: usize = 64 * 1024;

struct LineReader<S> {
    chunks: Pin<Box<S>>,
    buffer: Vec<u8>,
    /// Bytes of `buffer` already searched for a terminator
    scan_from: usize,
    line_number: usize,
    eof: bool,
    failed: bool,
}

impl<S, E> LineReader<S>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: std::fmt::Display,
{
    fn new(chunks: S) -> Self {
        Self {
            chunks: Box::pin(chunks),
            buffer: Vec::new(),
            scan_from: 0,
            line_number: 0,
            eof: false,
            failed: false,
        }
    }

    /// Next raw line without its terminator
    async fn next_line(&mut self) -> Option<AppResult<Vec<u8>>> {
        loop {
            let found = self.buffer[self.scan_from..]
                .iter()
                .position(|b| *b == b'\n')
                .map(|offset| self.scan_from + offset);

            if let Some(pos) = found {
                self.line_number += 1;
                if pos > MAX_LINE_BYTES {
                    return Some(Err(self.oversized()));
                }
                let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
                line.pop();
                self.scan_from = 0;
                return Some(Ok(line));
            }
            self.scan_from = self.buffer.len();

            if self.buffer.len() > MAX_LINE_BYTES {
                self.line_number += 1;
                return Some(Err(self.oversized()));
            }

            if self.eof {
                if self.buffer.is_empty() {
                    return None;
                }
                self.line_number += 1;
                self.scan_from = 0;
                return Some(Ok(std::mem::take(&mut self.buffer)));
            }

            match self.chunks.next().await {
                Some(Ok(chunk)) => self.buffer.extend_from_slice(&chunk),
                Some(Err(e)) => {
                    self.buffer.clear();
                    self.scan_from = 0;
                    return Some(Err(AppError::StreamAborted(e.to_string())));
                }
                None => self.eof = true,
            }
        }
    }

    fn oversized(&mut self) -> AppError {
        self.buffer.clear();
        self.scan_from = 0;
        AppError::invalid(
            "body",
            format!("line {} exceeds {} bytes", self.line_number, MAX_LINE_BYTES),
        )
    }

    async fn next_message<T: DeserializeOwned>(&mut self) -> Option<AppResult<T>> {
        if self.failed {
            return None;
        }
        loop {
            let line = match self.next_line().await? {
                Ok(line) => line,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            };

            if line.iter().all(|b| b.is_ascii_whitespace()) {
                continue;
            }

            return match serde_json::from_slice::<T>(&line) {
                Ok(message) => Some(Ok(message)),
                Err(e) => {
                    self.failed = true;
                    Some(Err(AppError::invalid(
                        "body",
                        format!("line {}: {}", self.line_number, e),
                    )))
                }
            };
        }
    }
}

/// Decode a stream of byte chunks into messages
pub fn decode<T, S, E>(chunks: S) -> impl Stream<Item = AppResult<T>> + Send + 'static
where
    T: DeserializeOwned + Send + 'static,
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    futures::stream::unfold(LineReader::new(chunks), |mut reader| async move {
        let message = reader.next_message::<T>().await;
        message.map(|message| (message, reader))
    })
}

/// Decode a request body into messages
pub fn decode_body<T>(body: Body) -> impl Stream<Item = AppResult<T>> + Send + 'static
where
    T: DeserializeOwned + Send + 'static,
{
    decode(body.into_data_stream())
}

/// Encode messages as a streaming response body
pub fn encode<T, S>(messages: S) -> Body
where
    T: Serialize + Send + 'static,
    S: Stream<Item = T> + Send + 'static,
{
    Body::from_stream(messages.map(|message| {
        serde_json::to_vec(&message).map(|mut line| {
            line.push(b'\n');
            Bytes::from(line)
        })
    }))
}
