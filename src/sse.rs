//! Server-Sent Events (SSE) processing for streaming responses.
//!
//! This module turns the raw byte stream of a `chat/completions` response into a stream of
//! [`ChatCompletionChunk`] values.  Events are delimited by a blank line.  Comment lines (used by
//! OpenRouter as keep-alives) and events without data are skipped, and `data: [DONE]` ends the
//! stream.

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};

use crate::observability::STREAM_BYTES;
use crate::{ChatCompletionChunk, Error, Result};

/// What a single SSE event amounts to.
#[derive(Debug)]
enum SseEvent {
    /// A parsed (or unparseable) chunk payload.
    Chunk(Result<ChatCompletionChunk>),
    /// The `[DONE]` sentinel.
    Done,
    /// Comments, keep-alives and events without data.
    Skip,
}

/// Process a stream of bytes into a stream of completion chunks.
///
/// Bytes are buffered until a full event is available, so events and multi-byte characters split
/// across network reads are reassembled before decoding.  A transport error ends the stream after
/// being yielded.
pub fn process_sse<S>(byte_stream: S) -> impl Stream<Item = Result<ChatCompletionChunk>> + Send
where
    S: Stream<Item = std::result::Result<Bytes, reqwest::Error>> + Unpin + Send + 'static,
{
    stream::unfold(
        (byte_stream, Vec::<u8>::new(), false),
        move |(mut stream, mut buffer, finished)| async move {
            if finished {
                return None;
            }
            loop {
                // First drain complete events already in the buffer
                while let Some(event) = take_event(&mut buffer) {
                    match parse_event(&event) {
                        SseEvent::Skip => continue,
                        SseEvent::Done => return None,
                        SseEvent::Chunk(chunk) => return Some((chunk, (stream, buffer, false))),
                    }
                }

                // Read more data
                match stream.next().await {
                    Some(Ok(bytes)) => {
                        STREAM_BYTES.count(bytes.len() as u64);
                        buffer.extend(bytes.iter().copied().filter(|b| *b != b'\r'));
                    }
                    Some(Err(e)) => {
                        let err =
                            Error::streaming(format!("Error in HTTP stream: {e}"), Some(Box::new(e)));
                        return Some((Err(err), (stream, buffer, true)));
                    }
                    None => {
                        // End of stream; the last event may lack its trailing blank line
                        if buffer.iter().all(u8::is_ascii_whitespace) {
                            return None;
                        }
                        let event = std::mem::take(&mut buffer);
                        return match parse_event(&event) {
                            SseEvent::Chunk(chunk) => Some((chunk, (stream, buffer, true))),
                            SseEvent::Done | SseEvent::Skip => None,
                        };
                    }
                }
            }
        },
    )
}

/// Remove the first complete event from `buffer`, without its delimiter.
fn take_event(buffer: &mut Vec<u8>) -> Option<Vec<u8>> {
    let end = buffer.windows(2).position(|w| w == b"\n\n")?;
    let mut event: Vec<u8> = buffer.drain(..end + 2).collect();
    event.truncate(end);
    Some(event)
}

/// Interpret one event.
fn parse_event(event: &[u8]) -> SseEvent {
    let text = match std::str::from_utf8(event) {
        Ok(text) => text,
        Err(e) => {
            return SseEvent::Chunk(Err(Error::encoding(
                format!("Invalid UTF-8 in stream: {e}"),
                Some(Box::new(e)),
            )));
        }
    };

    let mut data: Option<String> = None;
    for line in text.lines() {
        if line.starts_with(':') {
            continue;
        }
        if let Some(value) = line.strip_prefix("data:") {
            let value = value.strip_prefix(' ').unwrap_or(value);
            match data.as_mut() {
                Some(data) => {
                    data.push('\n');
                    data.push_str(value);
                }
                None => data = Some(value.to_string()),
            }
        }
    }

    match data.as_deref().map(str::trim) {
        None | Some("") => SseEvent::Skip,
        Some("[DONE]") => SseEvent::Done,
        Some(json) => SseEvent::Chunk(serde_json::from_str(json).map_err(|e| {
            Error::serialization(format!("Failed to parse event JSON: {e}"), Some(Box::new(e)))
        })),
    }
}
