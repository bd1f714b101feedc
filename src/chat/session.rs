//! Core chat session management.
//!
//! This module provides the `ChatSession` struct which manages conversation state and handles
//! streaming API interactions.

use std::sync::Arc;

use futures::StreamExt;

use crate::chat::commands::ModelSelection;
use crate::chat::config::ChatConfig;
use crate::chat::interrupt::Interrupt;
use crate::client::{ChatBackend, OpenRouter};
use crate::client_logger::StderrLogger;
use crate::error::Result;
use crate::observability::{CHAT_INTERRUPTS, CHAT_TURNS};
use crate::render::Renderer;
use crate::types::{ChatCompletionRequest, Fragment, Message};

/// How a turn that did not fail came to an end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The stream closed normally and the assistant message was recorded.
    Completed,

    /// The user interrupted; the partial response was discarded.
    Interrupted,
}

/// Aggregated stats for a chat session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStats {
    /// The active model.
    pub model: String,
    /// The number of messages in the conversation.
    pub message_count: usize,
    /// Total number of API requests made.
    pub total_requests: u64,
    /// Turns that produced an assistant message.
    pub completed_turns: u64,
    /// Turns stopped by the user.
    pub interrupted_turns: u64,
    /// Turns that ended in an error.
    pub failed_turns: u64,
}

/// A chat session that manages conversation state and API interactions.
///
/// The session owns the message history and the active model.  History only grows by whole
/// turns: a user message, then at most one assistant message.
pub struct ChatSession<B: ChatBackend = OpenRouter> {
    backend: B,
    config: ChatConfig,
    messages: Vec<Message>,
    request_count: u64,
    completed_turns: u64,
    interrupted_turns: u64,
    failed_turns: u64,
}

impl ChatSession<OpenRouter> {
    /// Creates a new chat session talking to the endpoint named by `config`.
    pub fn new(config: ChatConfig) -> Result<Self> {
        let mut client =
            OpenRouter::with_options(config.api_key.clone(), config.base_url.as_deref(), None)?;
        if config.debug {
            client = client.with_logger(Arc::new(StderrLogger));
        }
        Ok(Self::with_backend(client, config))
    }
}

impl<B: ChatBackend> ChatSession<B> {
    /// Creates a new chat session with a custom backend.
    pub fn with_backend(backend: B, config: ChatConfig) -> Self {
        Self {
            backend,
            config,
            messages: Vec::new(),
            request_count: 0,
            completed_turns: 0,
            interrupted_turns: 0,
            failed_turns: 0,
        }
    }

    /// Sends a user message and streams the response.
    ///
    /// This method:
    /// 1. Adds the user message to history
    /// 2. Sends a streaming request with the full history
    /// 3. Renders fragments as they arrive
    /// 4. Adds the complete assistant response to history
    ///
    /// If `interrupt` fires before the stream closes, the partial response is discarded and
    /// [`TurnOutcome::Interrupted`] is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the stream breaks.  The user message stays in
    /// history; no assistant message is added.
    pub async fn send_streaming(
        &mut self,
        user_input: &str,
        renderer: &mut dyn Renderer,
        interrupt: &Interrupt,
    ) -> Result<TurnOutcome> {
        let _armed = interrupt.arm();
        self.messages.push(Message::user(user_input));
        CHAT_TURNS.click();
        self.request_count = self.request_count.saturating_add(1);
        renderer.start_response(&self.config.model);

        let request = self.build_request();
        let started = tokio::select! {
            biased;
            _ = interrupt.triggered() => None,
            result = self.backend.stream_chat(request) => Some(result),
        };
        let mut stream = match started {
            Some(Ok(stream)) => stream,
            Some(Err(err)) => {
                self.failed_turns += 1;
                return Err(err);
            }
            None => return Ok(self.abandon_turn(renderer)),
        };

        let mut response = String::new();
        loop {
            let next = tokio::select! {
                biased;
                _ = interrupt.triggered() => None,
                item = stream.next() => Some(item),
            };
            match next {
                None => return Ok(self.abandon_turn(renderer)),
                Some(None) => break,
                Some(Some(Ok(Fragment::Text(text)))) => {
                    renderer.print_text(&text);
                    response.push_str(&text);
                }
                Some(Some(Ok(Fragment::Reasoning(text)))) => {
                    if self.config.show_reasoning {
                        renderer.print_reasoning(&text);
                    }
                }
                Some(Some(Err(err))) => {
                    self.failed_turns += 1;
                    return Err(err);
                }
            }
        }

        renderer.finish_response();
        self.messages.push(Message::assistant(response));
        self.completed_turns += 1;
        Ok(TurnOutcome::Completed)
    }

    fn abandon_turn(&mut self, renderer: &mut dyn Renderer) -> TurnOutcome {
        CHAT_INTERRUPTS.click();
        self.interrupted_turns += 1;
        renderer.print_interrupted();
        TurnOutcome::Interrupted
    }

    fn build_request(&self) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(self.messages.len() + 1);
        if let Some(prompt) = &self.config.system_prompt {
            messages.push(Message::system(prompt.clone()));
        }
        messages.extend(self.messages.iter().cloned());
        ChatCompletionRequest::new(self.config.model.clone(), messages)
            .with_temperature(self.config.temperature)
    }

    /// Clears the conversation history.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Returns the number of messages in the conversation.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Returns the conversation history, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Changes the model used for responses.
    pub fn set_model(&mut self, model: impl Into<String>) {
        self.config.model = model.into();
    }

    /// Applies an answer to the model menu.
    ///
    /// Returns the previous model when the selection switched models.  Any other selection
    /// leaves the session untouched.
    pub fn apply_model_selection(&mut self, selection: &ModelSelection) -> Option<String> {
        match selection {
            ModelSelection::Select(model) => {
                let previous = std::mem::replace(&mut self.config.model, model.clone());
                Some(previous)
            }
            ModelSelection::Keep | ModelSelection::InvalidNumber | ModelSelection::InvalidInput => {
                None
            }
        }
    }

    /// Returns the current model.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Returns the current session statistics snapshot.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            model: self.config.model.clone(),
            message_count: self.message_count(),
            total_requests: self.request_count,
            completed_turns: self.completed_turns,
            interrupted_turns: self.interrupted_turns,
            failed_turns: self.failed_turns,
        }
    }
}
