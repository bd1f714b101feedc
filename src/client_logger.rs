//! Logging trait for OpenRouter client operations.
//!
//! This module provides the [`ClientLogger`] trait that allows callers to capture every API
//! interaction passing through the [`OpenRouter`](crate::OpenRouter) client, and
//! [`StderrLogger`], which writes them as JSON lines to standard error.

use std::io::{self, Write};

use crate::{ChatCompletionChunk, ChatCompletionRequest, Error};

/// A trait for logging client operations.
///
/// # Example
///
/// ```rust,ignore
/// use termchat::{ChatCompletionChunk, ChatCompletionRequest, ClientLogger, Error};
///
/// struct CountingLogger(std::sync::atomic::AtomicU64);
///
/// impl ClientLogger for CountingLogger {
///     fn log_request(&self, _: &ChatCompletionRequest) {}
///
///     fn log_stream_chunk(&self, _: &ChatCompletionChunk) {
///         self.0.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
///     }
///
///     fn log_error(&self, _: &Error) {}
/// }
/// ```
pub trait ClientLogger: Send + Sync {
    /// Log an outgoing request, before it is sent.
    fn log_request(&self, request: &ChatCompletionRequest);

    /// Log one parsed chunk of a streamed response.
    fn log_stream_chunk(&self, chunk: &ChatCompletionChunk);

    /// Log a failed request or a failure part way through a stream.
    fn log_error(&self, error: &Error);
}

/// Writes one JSON object per line to stderr.
#[derive(Debug, Default)]
pub struct StderrLogger;

impl StderrLogger {
    fn emit(&self, kind: &str, payload: serde_json::Value) {
        let line = serde_json::json!({ "kind": kind, "payload": payload });
        let mut stderr = io::stderr().lock();
        let _ = writeln!(stderr, "{line}");
    }
}

impl ClientLogger for StderrLogger {
    fn log_request(&self, request: &ChatCompletionRequest) {
        // Message bodies stay out of the log; the count is enough to debug context issues.
        self.emit(
            "request",
            serde_json::json!({
                "model": request.model,
                "messages": request.messages.len(),
                "temperature": request.temperature,
            }),
        );
    }

    fn log_stream_chunk(&self, chunk: &ChatCompletionChunk) {
        match serde_json::to_value(chunk) {
            Ok(value) => self.emit("chunk", value),
            Err(err) => self.emit("chunk", serde_json::json!({ "unserializable": err.to_string() })),
        }
    }

    fn log_error(&self, error: &Error) {
        self.emit("error", serde_json::json!({ "message": error.to_string() }));
    }
}
