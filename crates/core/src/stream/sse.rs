//! Server-sent events decoding.
//!
//! Frames are separated by a blank line (`\n\n` or `\r\n\r\n`) and may be
//! split across network chunks. Within a frame, `event:` names the event,
//! `data:` lines are joined with `\n`, and `:` comment lines (keep-alive
//! pings) are skipped. A frame that grows past [`MAX_PENDING_BYTES`]
//! without completing ends the stream.

use crate::stream::StreamMessage;
use dcc_protocol::WireEvent;
use std::fmt::Display;
use thiserror::Error;
use tokio_stream::{Stream, StreamExt};

/// SSE default event name for frames without an `event:` line.
const DEFAULT_EVENT_NAME: &str = "message";

/// Most bytes a frame may occupy before its terminating blank line.
pub const MAX_PENDING_BYTES: usize = 8 * 1024 * 1024;

/// Longest frame delimiter (`\r\n\r\n`) minus one.
const DELIMITER_OVERLAP: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    pub event: Option<String>,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("event stream frame exceeds {limit} bytes ({pending} pending)")]
pub struct FrameTooLarge {
    pub pending: usize,
    pub limit: usize,
}

/// Incremental frame decoder.
#[derive(Debug)]
pub struct SseDecoder {
    buf: Vec<u8>,
    /// Offset up to which `buf` holds no delimiter.
    scanned: usize,
    limit: usize,
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self::with_limit(MAX_PENDING_BYTES)
    }
}

impl SseDecoder {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            buf: Vec::new(),
            scanned: 0,
            limit,
        }
    }

    /// Feed one chunk and return every frame it completes.
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buf.extend_from_slice(chunk);
        let mut frames = Vec::new();
        while let Some((idx, delim_len)) = find_frame_delimiter(&self.buf, self.scanned) {
            let frame_bytes: Vec<u8> = self.buf.drain(..idx + delim_len).take(idx).collect();
            self.scanned = 0;
            if let Some(frame) = parse_sse_frame(&frame_bytes) {
                frames.push(frame);
            }
        }
        // A delimiter may straddle the next chunk boundary.
        self.scanned = self.buf.len().saturating_sub(DELIMITER_OVERLAP);
        frames
    }

    /// Bytes received but not yet part of a complete frame.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Fails once the unfinished frame has outgrown the limit.
    pub fn check_pending(&self) -> Result<(), FrameTooLarge> {
        if self.buf.len() > self.limit {
            return Err(FrameTooLarge {
                pending: self.buf.len(),
                limit: self.limit,
            });
        }
        Ok(())
    }
}

fn find_frame_delimiter(buf: &[u8], from: usize) -> Option<(usize, usize)> {
    let mut i = from;
    while i + 1 < buf.len() {
        if buf[i] == b'\n' && buf[i + 1] == b'\n' {
            return Some((i, 2));
        }
        if i + 3 < buf.len() && &buf[i..i + 4] == b"\r\n\r\n" {
            return Some((i, 4));
        }
        i += 1;
    }
    None
}

fn parse_sse_frame(bytes: &[u8]) -> Option<SseFrame> {
    if bytes.is_empty() {
        return None;
    }
    let text = String::from_utf8_lossy(bytes);
    let mut event: Option<String> = None;
    let mut data_lines: Vec<&str> = Vec::new();
    for raw_line in text.split('\n') {
        let line = raw_line.trim_end_matches('\r');
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        if let Some(rest) = line.strip_prefix("event:") {
            event = Some(rest.trim_start().to_string());
        } else if let Some(rest) = line.strip_prefix("data:") {
            data_lines.push(rest.strip_prefix(' ').unwrap_or(rest));
        }
    }
    if event.is_none() && data_lines.is_empty() {
        return None;
    }
    Some(SseFrame {
        event,
        data: data_lines.join("\n"),
    })
}

/// Validate one frame against the event taxonomy of `E`.
pub fn decode_frame<E: WireEvent>(frame: &SseFrame) -> StreamMessage<E> {
    let name = frame.event.as_deref().unwrap_or(DEFAULT_EVENT_NAME);
    match E::decode(name, &frame.data) {
        Ok(event) => StreamMessage::Event(event),
        Err(err) => StreamMessage::Dropped(err),
    }
}

/// Turn a byte stream into stream messages.
///
/// Yields one message per frame in arrival order. The last message is
/// always `Disconnected`: either the transport error or end of stream.
pub fn event_stream<E, S, B, X>(chunks: S) -> impl Stream<Item = StreamMessage<E>> + Send
where
    E: WireEvent,
    S: Stream<Item = Result<B, X>> + Send + 'static,
    B: AsRef<[u8]> + Send,
    X: Display + Send,
{
    async_stream::stream! {
        let mut chunks = Box::pin(chunks);
        let mut decoder = SseDecoder::default();
        loop {
            match chunks.next().await {
                Some(Ok(chunk)) => {
                    for frame in decoder.push_chunk(chunk.as_ref()) {
                        yield decode_frame::<E>(&frame);
                    }
                    if let Err(err) = decoder.check_pending() {
                        yield StreamMessage::Disconnected(err.to_string());
                        break;
                    }
                }
                Some(Err(err)) => {
                    yield StreamMessage::Disconnected(format!("event stream error: {err}"));
                    break;
                }
                None => {
                    yield StreamMessage::Disconnected("event stream closed by server".to_string());
                    break;
                }
            }
        }
    }
}
