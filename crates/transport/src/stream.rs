//! Accumulate a streamed reply into one string.
//!
//! There is no end-of-message sentinel: end of the transport stream is end of
//! the reply. The outcome is classified so the caller can choose the
//! non-streaming fallback without exception-style control flow.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tracing::{debug, trace};

/// Result of consuming a reply stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamOutcome {
    /// Non-empty reply text, trimmed.
    Usable(String),
    /// The stream ended without any non-whitespace text.
    Empty,
    /// A chunk read failed part-way through.
    Errored(String),
}

impl StreamOutcome {
    pub fn is_usable(&self) -> bool {
        matches!(self, StreamOutcome::Usable(_))
    }
}

/// Incremental UTF-8 decoder that carries incomplete trailing sequences over
/// to the next chunk. Invalid bytes decode to U+FFFD.
#[derive(Debug, Default)]
pub(crate) struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub(crate) fn push(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);
        let mut out = String::new();
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    out.push_str(text);
                    self.pending.clear();
                    return out;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match e.error_len() {
                        Some(bad) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + bad);
                        }
                        None => {
                            // Incomplete sequence at the end; wait for more bytes.
                            self.pending.drain(..valid);
                            return out;
                        }
                    }
                }
            }
        }
    }

    pub(crate) fn finish(&mut self) -> String {
        let rest = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        rest
    }
}

/// Read `stream` to exhaustion, concatenating decoded chunks in arrival order.
pub async fn accumulate<S, E>(stream: S) -> StreamOutcome
where
    S: Stream<Item = Result<Bytes, E>>,
    E: std::fmt::Display,
{
    let mut stream = std::pin::pin!(stream);
    let mut decoder = Utf8Decoder::default();
    let mut full = String::new();
    let mut chunks = 0usize;

    while let Some(chunk) = stream.next().await {
        match chunk {
            Ok(bytes) => {
                chunks += 1;
                trace!(len = bytes.len(), "stream chunk");
                full.push_str(&decoder.push(&bytes));
            }
            Err(e) => {
                debug!(error = %e, chunks, "reply stream failed");
                return StreamOutcome::Errored(e.to_string());
            }
        }
    }
    full.push_str(&decoder.finish());

    let trimmed = full.trim();
    debug!(chunks, len = trimmed.len(), "reply stream finished");
    if trimmed.is_empty() {
        StreamOutcome::Empty
    } else {
        StreamOutcome::Usable(trimmed.to_string())
    }
}
