//! Chat application module for interactive conversations over OpenRouter.
//!
//! This module provides a streaming REPL chat interface built on top of the
//! termchat client library. It supports:
//!
//! - Streaming responses with real-time fragment display
//! - Dimmed output for model reasoning
//! - Slash commands for session control
//! - Interrupting a response with Ctrl+C
//!
//! # Architecture
//!
//! The module is organized into several components:
//!
//! - [`config`]: CLI argument parsing and environment configuration
//! - [`session`]: Core chat session management and API interaction
//! - [`commands`]: Slash command parsing and the model menu
//! - [`interrupt`]: The handle a Ctrl+C handler uses to stop a response

mod commands;
mod config;
mod interrupt;
mod session;

pub use crate::render::{PlainTextRenderer, Renderer};
pub use commands::{
    ChatCommand, ModelSelection, format_model_menu, help_text, parse_command, parse_confirmation,
    parse_model_selection,
};
pub use config::{API_KEY_ENV, ChatArgs, ChatConfig, DEFAULT_MODEL_ENV};
pub use interrupt::{Armed, Interrupt};
pub use session::{ChatSession, SessionStats, TurnOutcome};
