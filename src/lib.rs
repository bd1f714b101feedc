//! termchat is a streaming terminal chat client for OpenRouter-compatible chat completion APIs.
//!
//! The library half provides the HTTP client, the server-sent-events parser and the chat session
//! that keeps conversation history; the `termchat` binary wires them to a line editor.

// Public modules
pub mod chat;
pub mod client;
pub mod client_logger;
pub mod error;
pub mod observability;
pub mod render;
pub mod sse;
pub mod types;

// Re-exports
pub use client::{ChatBackend, FragmentStream, OpenRouter};
pub use client_logger::{ClientLogger, StderrLogger};
pub use error::{Error, Result};
pub use observability::register_biometrics;
pub use render::{PlainTextRenderer, Renderer};
pub use types::*;
