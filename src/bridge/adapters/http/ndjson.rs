//! Decoding of newline-delimited JSON reply streams.

use crate::bridge::{
    domain::CodeExecutionReply,
    ports::{CodeExecutionReplies, TransportError, TransportResult},
};
use futures::stream::{self, BoxStream};
use futures::{Stream, StreamExt};
use std::collections::VecDeque;
use std::fmt;

struct Decoder<B, E> {
    chunks: BoxStream<'static, Result<B, E>>,
    buffer: Vec<u8>,
    ready: VecDeque<TransportResult<CodeExecutionReply>>,
    finished: bool,
}

impl<B, E> Decoder<B, E>
where
    B: AsRef<[u8]>,
{
    fn push(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
        while let Some(newline) = self.buffer.iter().position(|byte| *byte == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            self.decode_line(&line);
        }
    }

    fn flush(&mut self) {
        let rest = std::mem::take(&mut self.buffer);
        self.decode_line(&rest);
    }

    fn decode_line(&mut self, line: &[u8]) {
        let trimmed = line.trim_ascii();
        if trimmed.is_empty() {
            return;
        }
        self.ready.push_back(
            serde_json::from_slice(trimmed)
                .map_err(|err| TransportError::Protocol(format!("invalid reply line: {err}"))),
        );
    }
}

/// Turns a byte-chunk stream into code execution replies, one per line.
///
/// Lines may span chunks. Blank lines are skipped; a final line without a
/// trailing newline is still decoded. A chunk error ends the stream after
/// being reported.
pub fn decode_ndjson<S, B, E>(chunks: S) -> CodeExecutionReplies
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: fmt::Display + Send + 'static,
{
    let decoder = Decoder {
        chunks: chunks.boxed(),
        buffer: Vec::new(),
        ready: VecDeque::new(),
        finished: false,
    };
    stream::unfold(decoder, |mut state| async move {
        loop {
            if let Some(reply) = state.ready.pop_front() {
                return Some((reply, state));
            }
            if state.finished {
                return None;
            }
            match state.chunks.next().await {
                Some(Ok(chunk)) => state.push(chunk.as_ref()),
                Some(Err(err)) => {
                    state.finished = true;
                    state
                        .ready
                        .push_back(Err(TransportError::Protocol(err.to_string())));
                }
                None => {
                    state.finished = true;
                    state.flush();
                }
            }
        }
    })
    .boxed()
}
