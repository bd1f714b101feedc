//! Slash command parsing for the chat application.
//!
//! This module handles parsing of special commands that start with `/`, allowing users to
//! control the chat session without sending messages to the API, plus the `/model` menu.

use crate::types::is_model_id;

/// A parsed chat command.
///
/// These commands control the chat session and are not sent to the API.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// Clear the conversation history.
    Clear,

    /// Change the model.
    /// `None` asks interactively; `Some` holds a menu number or a model id.
    Model(Option<String>),

    /// Display help information.
    Help,

    /// Display session statistics.
    Stats,

    /// Exit the chat application.
    Quit,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input starts with `/`, or `None` if it should be treated as
/// a regular message.
///
/// # Examples
///
/// ```
/// # use termchat::chat::{ChatCommand, parse_command};
/// assert_eq!(parse_command("/quit"), Some(ChatCommand::Quit));
/// assert_eq!(parse_command("/model 3"), Some(ChatCommand::Model(Some("3".to_string()))));
/// assert!(parse_command("Hello!").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();
    let rest = input.strip_prefix('/')?;

    let mut parts = rest.splitn(2, char::is_whitespace);
    let command = parts.next().unwrap_or_default().to_lowercase();
    let argument = parts.next().map(str::trim).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "clear" => ChatCommand::Clear,
        "model" => ChatCommand::Model(argument.map(str::to_string)),
        "help" | "?" => ChatCommand::Help,
        "stats" | "status" => ChatCommand::Stats,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        _ => ChatCommand::Invalid(format!(
            "Unknown command: {input}\nType /help for available commands"
        )),
    };

    Some(result)
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Commands:
  /help              Show this help message
  /model             Choose a model from the list
  /model <n|id>      Switch to model number n, or to any vendor/model id
  /clear             Clear conversation history
  /stats             Show session statistics
  /quit              Exit the application

Tips:
  Press Ctrl+C to interrupt a response
  Conversation history is kept until cleared
  Press Ctrl+C or Ctrl+D at the prompt to exit
  /clear and /quit ask for confirmation"#
}

/// Interprets an answer to a `[y/N]` question; only an explicit yes counts.
pub fn parse_confirmation(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}

/// The outcome of answering the model menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSelection {
    /// Empty answer; keep the current model.
    Keep,

    /// Switch to this model.
    Select(String),

    /// A number outside the menu.
    InvalidNumber,

    /// Neither a number nor a model id.
    InvalidInput,
}

/// Interprets an answer to the model menu.
///
/// Numbers are 1-based indices into `models`.  Anything shaped like `vendor/name` is accepted as
/// a custom model id.
pub fn parse_model_selection(input: &str, models: &[&str]) -> ModelSelection {
    let input = input.trim();
    if input.is_empty() {
        return ModelSelection::Keep;
    }
    if input.chars().all(|c| c.is_ascii_digit()) {
        return match input.parse::<usize>() {
            Ok(n) if (1..=models.len()).contains(&n) => {
                ModelSelection::Select(models[n - 1].to_string())
            }
            _ => ModelSelection::InvalidNumber,
        };
    }
    if is_model_id(input) {
        return ModelSelection::Select(input.to_string());
    }
    ModelSelection::InvalidInput
}

/// Renders the numbered model menu, marking `current` with an arrow.
pub fn format_model_menu(models: &[&str], current: &str) -> String {
    let mut menu = String::from("Available Models:\n");
    for (i, model) in models.iter().enumerate() {
        let marker = if *model == current { "→" } else { " " };
        menu.push_str(&format!("{marker} {}. {model}\n", i + 1));
    }
    menu.push_str(&format!("\nCurrent: {current}"));
    menu
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODELS: &[&str] = &["openai/gpt-4o", "anthropic/claude-3-haiku", "deepseek/deepseek-r1:free"];

    #[test]
    fn parse_quit_commands() {
        assert_eq!(parse_command("/quit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/exit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/q"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("  /QUIT  "), Some(ChatCommand::Quit));
    }

    #[test]
    fn parse_clear() {
        assert_eq!(parse_command("/clear"), Some(ChatCommand::Clear));
        assert_eq!(parse_command("/CLEAR"), Some(ChatCommand::Clear));
    }

    #[test]
    fn parse_model() {
        assert_eq!(parse_command("/model"), Some(ChatCommand::Model(None)));
        assert_eq!(
            parse_command("/model   openai/gpt-4o  "),
            Some(ChatCommand::Model(Some("openai/gpt-4o".to_string())))
        );
        assert_eq!(
            parse_command("/model 2"),
            Some(ChatCommand::Model(Some("2".to_string())))
        );
    }

    #[test]
    fn parse_help_and_stats() {
        assert_eq!(parse_command("/help"), Some(ChatCommand::Help));
        assert_eq!(parse_command("/?"), Some(ChatCommand::Help));
        assert_eq!(parse_command("/stats"), Some(ChatCommand::Stats));
        assert_eq!(parse_command("/status"), Some(ChatCommand::Stats));
    }

    #[test]
    fn unknown_command() {
        assert!(matches!(
            parse_command("/frobnicate now"),
            Some(ChatCommand::Invalid(msg)) if msg.contains("/frobnicate now") && msg.contains("/help")
        ));
        assert!(matches!(parse_command("/"), Some(ChatCommand::Invalid(_))));
    }

    #[test]
    fn non_commands() {
        assert_eq!(parse_command("Hello there!"), None);
        assert_eq!(parse_command("what is 1/2?"), None);
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("  "), None);
    }

    #[test]
    fn help_text_lists_commands() {
        let help = help_text();
        for command in ["/help", "/model", "/clear", "/quit", "/stats"] {
            assert!(help.contains(command), "{command}");
        }
    }

    #[test]
    fn confirmation_defaults_to_no() {
        assert!(parse_confirmation("y"));
        assert!(parse_confirmation(" YES "));
        assert!(!parse_confirmation(""));
        assert!(!parse_confirmation("n"));
        assert!(!parse_confirmation("sure"));
    }

    #[test]
    fn model_selection_by_number() {
        assert_eq!(
            parse_model_selection("1", MODELS),
            ModelSelection::Select("openai/gpt-4o".to_string())
        );
        assert_eq!(
            parse_model_selection(" 3 ", MODELS),
            ModelSelection::Select("deepseek/deepseek-r1:free".to_string())
        );
        assert_eq!(parse_model_selection("0", MODELS), ModelSelection::InvalidNumber);
        assert_eq!(parse_model_selection("4", MODELS), ModelSelection::InvalidNumber);
        assert_eq!(
            parse_model_selection("99999999999999999999999", MODELS),
            ModelSelection::InvalidNumber
        );
    }

    #[test]
    fn model_selection_other_inputs() {
        assert_eq!(parse_model_selection("", MODELS), ModelSelection::Keep);
        assert_eq!(parse_model_selection("   ", MODELS), ModelSelection::Keep);
        assert_eq!(
            parse_model_selection("mistralai/mixtral-8x7b", MODELS),
            ModelSelection::Select("mistralai/mixtral-8x7b".to_string())
        );
        assert_eq!(parse_model_selection("gpt", MODELS), ModelSelection::InvalidInput);
        assert_eq!(parse_model_selection("-1", MODELS), ModelSelection::InvalidInput);
    }

    #[test]
    fn menu_marks_current_model() {
        let menu = format_model_menu(MODELS, "anthropic/claude-3-haiku");
        assert!(menu.contains("  1. openai/gpt-4o\n"));
        assert!(menu.contains("→ 2. anthropic/claude-3-haiku\n"));
        assert!(menu.ends_with("Current: anthropic/claude-3-haiku"));
    }
}
