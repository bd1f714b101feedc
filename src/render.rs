//! Output rendering for the chat application.
//!
//! This module provides a trait-based rendering abstraction that allows for different output
//! styles.  The default implementation uses ANSI escape codes to set reasoning apart from the
//! answer and to color headers and errors.

use std::io::{self, Stdout, Write};

/// ANSI escape code for bold text (used for headers).
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code for dim text (used for reasoning).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code for italic text (used for reasoning).
const ANSI_ITALIC: &str = "\x1b[3m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for green text (used for the response header).
const ANSI_GREEN: &str = "\x1b[32m";

/// ANSI escape code for yellow text (used for interruptions).
const ANSI_YELLOW: &str = "\x1b[33m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// Trait for rendering chat output.
///
/// This abstraction allows for different rendering strategies:
/// - Plain text with ANSI styling
/// - Plain text without styling (for piping/redirecting)
/// - Capturing output in tests
pub trait Renderer: Send {
    /// Called before the first fragment of a response.
    fn start_response(&mut self, model: &str);

    /// Print a chunk of regular response text.
    ///
    /// This is called incrementally as fragments are streamed from the API.
    fn print_text(&mut self, text: &str);

    /// Print a chunk of reasoning text.
    ///
    /// Reasoning is displayed differently (dim/italic) to distinguish it from the answer.
    fn print_reasoning(&mut self, text: &str);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);

    /// Called when a response is complete.
    ///
    /// Used to ensure proper newlines and cleanup after streaming.
    fn finish_response(&mut self);

    /// Called when the stream is interrupted by the user.
    fn print_interrupted(&mut self);
}

/// Plain text renderer with optional ANSI styling.
pub struct PlainTextRenderer {
    stdout: Stdout,
    use_color: bool,
    in_reasoning: bool,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            stdout: io::stdout(),
            use_color,
            in_reasoning: false,
        }
    }

    /// Flushes stdout to ensure immediate display of streamed content.
    fn flush(&mut self) {
        let _ = self.stdout.flush();
    }

    fn end_reasoning(&mut self) {
        if self.in_reasoning {
            if self.use_color {
                print!("{ANSI_RESET}");
            }
            print!("\n\n");
            self.in_reasoning = false;
        }
    }

    fn style(&self, codes: &str, text: &str) -> String {
        if self.use_color {
            format!("{codes}{text}{ANSI_RESET}")
        } else {
            text.to_string()
        }
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PlainTextRenderer {
    fn start_response(&mut self, model: &str) {
        self.in_reasoning = false;
        let header = self.style(&format!("{ANSI_BOLD}{ANSI_GREEN}"), &format!("AI ({model})"));
        println!("\n{header}:");
        self.flush();
    }

    fn print_text(&mut self, text: &str) {
        self.end_reasoning();
        print!("{text}");
        self.flush();
    }

    fn print_reasoning(&mut self, text: &str) {
        if !self.in_reasoning {
            if self.use_color {
                print!("{ANSI_DIM}{ANSI_ITALIC}");
            } else {
                print!("[thinking] ");
            }
            self.in_reasoning = true;
        }
        print!("{text}");
        self.flush();
    }

    fn print_error(&mut self, error: &str) {
        self.end_reasoning();
        let message = self.style(ANSI_RED, &format!("Error: {error}"));
        eprintln!("\n{message}");
    }

    fn print_info(&mut self, info: &str) {
        self.end_reasoning();
        println!("{info}");
        self.flush();
    }

    fn finish_response(&mut self) {
        self.end_reasoning();
        println!();
        self.flush();
    }

    fn print_interrupted(&mut self) {
        self.end_reasoning();
        let message = self.style(ANSI_YELLOW, "[interrupted]");
        println!("\n{message}");
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renderer_default_has_color() {
        let renderer = PlainTextRenderer::new();
        assert!(renderer.use_color);
    }

    #[test]
    fn renderer_without_color() {
        let renderer = PlainTextRenderer::with_color(false);
        assert!(!renderer.use_color);
        assert_eq!(renderer.style(ANSI_RED, "plain"), "plain");
    }

    #[test]
    fn styled_text_is_reset() {
        let renderer = PlainTextRenderer::with_color(true);
        assert_eq!(
            renderer.style(ANSI_YELLOW, "warn"),
            format!("{ANSI_YELLOW}warn{ANSI_RESET}")
        );
    }
}
