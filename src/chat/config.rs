//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and resolves the final [`ChatConfig`]
//! from those arguments and the environment.

use std::env;
use std::fmt;

use arrrg_derive::CommandLine;

use crate::error::{Error, Result};
use crate::types::DEFAULT_MODEL;

/// Environment variable holding the API credential.
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Environment variable naming the model to start with.
pub const DEFAULT_MODEL_ENV: &str = "DEFAULT_MODEL";

/// Sampling temperature sent with every request.
const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Command-line arguments for the termchat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Model to use for chat.
    #[arrrg(optional, "Model to use (default: $DEFAULT_MODEL or deepseek/deepseek-r1:free)", "MODEL")]
    pub model: Option<String>,

    /// System prompt to set context for the conversation.
    #[arrrg(optional, "System prompt for the conversation", "PROMPT")]
    pub system: Option<String>,

    /// Alternate OpenAI-compatible endpoint.
    #[arrrg(optional, "API base URL (default: https://openrouter.ai/api/v1/)", "URL")]
    pub base_url: Option<String>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,

    /// Hide reasoning tokens.
    #[arrrg(flag, "Do not display model reasoning")]
    pub no_reasoning: bool,

    /// Log requests and stream chunks to stderr.
    #[arrrg(flag, "Log API traffic to stderr as JSON lines")]
    pub debug: bool,
}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing command-line arguments
/// and environment variables with appropriate defaults.
#[derive(Clone)]
pub struct ChatConfig {
    /// The API credential.
    pub api_key: String,

    /// The model to start the session with.
    pub model: String,

    /// Optional system prompt sent ahead of the conversation.
    pub system_prompt: Option<String>,

    /// Endpoint override; `None` uses OpenRouter.
    pub base_url: Option<String>,

    /// Sampling temperature.
    pub temperature: Option<f32>,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,

    /// Whether reasoning fragments are displayed.
    pub show_reasoning: bool,

    /// Whether API traffic is logged to stderr.
    pub debug: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Model: deepseek/deepseek-r1:free
    /// - Temperature: 0.7
    /// - Color: enabled
    /// - Reasoning: shown
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            system_prompt: None,
            base_url: None,
            temperature: Some(DEFAULT_TEMPERATURE),
            use_color: true,
            show_reasoning: true,
            debug: false,
        }
    }

    /// Resolves the configuration from `args` and the process environment.
    pub fn from_env(args: ChatArgs) -> Result<Self> {
        Self::from_lookup(args, |name| env::var(name).ok())
    }

    /// Resolves the configuration from `args` and an environment lookup function.
    ///
    /// The credential is required.  The model comes from `--model`, then `DEFAULT_MODEL`, then the
    /// built-in default.  Empty values count as unset.
    pub fn from_lookup<F>(args: ChatArgs, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let Some(api_key) = non_empty(lookup(API_KEY_ENV)) else {
            return Err(Error::configuration(format!(
                "{API_KEY_ENV} not found in environment variables; set it to your OpenRouter API key"
            )));
        };

        let model = non_empty(args.model)
            .or_else(|| non_empty(lookup(DEFAULT_MODEL_ENV)))
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Ok(ChatConfig {
            model,
            system_prompt: non_empty(args.system),
            base_url: non_empty(args.base_url),
            use_color: !args.no_color,
            show_reasoning: !args.no_reasoning,
            debug: args.debug,
            ..ChatConfig::new(api_key)
        })
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Hides reasoning fragments.
    pub fn without_reasoning(mut self) -> Self {
        self.show_reasoning = false;
        self
    }
}

impl fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("system_prompt", &self.system_prompt)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("use_color", &self.use_color)
            .field("show_reasoning", &self.show_reasoning)
            .field("debug", &self.debug)
            .finish()
    }
}
