//! Interactive chat application for conversing with models hosted on OpenRouter.
//!
//! This binary provides a streaming REPL interface for chatting with any model available through
//! an OpenRouter-compatible chat completions API.
//!
//! # Usage
//!
//! ```bash
//! # Basic usage; the key is read from the environment
//! OPENROUTER_API_KEY=sk-or-... termchat
//!
//! # Specify a model
//! termchat --model openai/gpt-4o
//!
//! # Set a system prompt
//! termchat --system "You are a helpful coding assistant"
//!
//! # Disable colors (useful for piping output)
//! termchat --no-color
//! ```
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/help` - Show available commands
//! - `/model [n|id]` - Change the model
//! - `/clear` - Clear conversation history (asks first)
//! - `/stats` - Show session statistics
//! - `/quit` - Exit the application (asks first)

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use termchat::chat::{
    ChatArgs, ChatCommand, ChatConfig, ChatSession, Interrupt, ModelSelection, PlainTextRenderer,
    Renderer, format_model_menu, help_text, parse_command, parse_confirmation,
    parse_model_selection,
};
use termchat::{KNOWN_MODELS, short_name};

/// Main entry point for the termchat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("termchat [OPTIONS]");
    let config = match ChatConfig::from_env(args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    };
    let use_color = config.use_color;

    let mut session = match ChatSession::new(config) {
        Ok(session) => session,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    };
    let mut renderer = PlainTextRenderer::with_color(use_color);
    let mut rl = DefaultEditor::new()?;

    // Ctrl+C during a response stops the stream.  Outside a response the signal ends the program;
    // at an interactive prompt rustyline sees Ctrl+C first and reports it as an error instead.
    let interrupt = Interrupt::new();
    let handler_interrupt = interrupt.clone();
    ctrlc::set_handler(move || {
        if handler_interrupt.is_armed() {
            handler_interrupt.trigger();
        } else {
            println!("\nGoodbye!");
            std::process::exit(0);
        }
    })?;

    println!("Terminal Chat (model: {})", session.model());
    println!("Type /help for commands, /quit to exit\n");

    loop {
        // Reset interrupt flag before each input
        interrupt.reset();

        let readline = rl.readline("You: ");

        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                // Check for slash commands
                if let Some(cmd) = parse_command(line) {
                    match cmd {
                        ChatCommand::Quit => {
                            if confirm(&mut rl, "Are you sure you want to quit?") {
                                println!("Goodbye!");
                                break;
                            }
                        }
                        ChatCommand::Clear => {
                            if session.message_count() == 0 {
                                renderer.print_info("Conversation is already empty.");
                            } else if confirm(&mut rl, "Clear conversation history?") {
                                session.clear();
                                renderer.print_info("Conversation cleared.");
                            }
                        }
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {}", line);
                            }
                        }
                        ChatCommand::Model(Some(choice)) => {
                            let selection = parse_model_selection(&choice, KNOWN_MODELS);
                            apply_model_selection(&mut session, &mut renderer, selection);
                        }
                        ChatCommand::Model(None) => {
                            renderer.print_info(&format_model_menu(KNOWN_MODELS, session.model()));
                            let selection =
                                match rl.readline("Select model number (Enter to keep current): ") {
                                    Ok(answer) => parse_model_selection(&answer, KNOWN_MODELS),
                                    Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                                        ModelSelection::Keep
                                    }
                                    Err(err) => {
                                        renderer.print_error(&format!("Input error: {}", err));
                                        ModelSelection::Keep
                                    }
                                };
                            apply_model_selection(&mut session, &mut renderer, selection);
                        }
                        ChatCommand::Stats => {
                            print_stats(&session);
                        }
                        ChatCommand::Invalid(message) => {
                            renderer.print_error(&message);
                        }
                    }
                    continue;
                }

                // Regular message - send to API
                interrupt.reset();
                if let Err(e) = session
                    .send_streaming(line, &mut renderer, &interrupt)
                    .await
                {
                    renderer.print_error(&e.to_string());
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                // Ctrl+C or Ctrl+D at the prompt - exit
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    Ok(())
}

/// Asks a `[y/N]` question; Ctrl+C, Ctrl+D and read errors count as no.
fn confirm(rl: &mut DefaultEditor, question: &str) -> bool {
    match rl.readline(&format!("{question} [y/N]: ")) {
        Ok(answer) => parse_confirmation(&answer),
        Err(_) => false,
    }
}

fn apply_model_selection(
    session: &mut ChatSession,
    renderer: &mut PlainTextRenderer,
    selection: ModelSelection,
) {
    match &selection {
        ModelSelection::Select(_) => {
            if let Some(previous) = session.apply_model_selection(&selection) {
                renderer.print_info(&format!(
                    "Model changed from {} to {}",
                    short_name(&previous),
                    short_name(session.model())
                ));
            }
        }
        ModelSelection::Keep => renderer.print_info("Keeping current model"),
        ModelSelection::InvalidNumber => renderer.print_error("Invalid model number"),
        ModelSelection::InvalidInput => {
            renderer.print_error("Invalid input - keeping current model")
        }
    }
}

fn print_stats(session: &ChatSession) {
    let stats = session.stats();
    println!("    Session Statistics:");
    println!("      Model: {}", stats.model);
    println!("      Messages: {}", stats.message_count);
    println!(
        "      Turns: {} completed, {} interrupted, {} failed ({} requests)",
        stats.completed_turns, stats.interrupted_turns, stats.failed_turns, stats.total_requests
    );
    match session.config().system_prompt.as_deref() {
        Some(prompt) => println!("      System prompt: {}", prompt),
        None => println!("      System prompt: (none)"),
    }
}
