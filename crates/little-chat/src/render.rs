//! Terminal rendering of a conversation.

use std::fmt::Write as _;

use little_chat_core::{Message, Role, Transcript};
use owo_colors::{OwoColorize, Style};

/// Title printed when the CLI starts.
pub const TITLE: &str = "AI Chatbot";

/// Placeholder shown where the user types.
pub const PROMPT_HINT: &str = "Type your message...";

/// Shown after the last message while a reply is pending.
pub const THINKING: &str = "Thinking…";

/// Left bar that marks every line of a message.
pub const BAR_CHAR: &str = "▎";

/// Formats a message for the terminal.
///
/// User and assistant messages are told apart by color and icon. Every
/// line of a multi-line message gets its own bar.
pub fn format_message(message: &Message) -> String {
    let (bar, text) = match message.role() {
        Role::User => (Style::new().bright_green(), Style::new().green()),
        Role::Assistant => {
            (Style::new().bright_cyan(), Style::new().bright_white())
        }
    };
    let mut out = String::new();
    for (i, line) in message.content().split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let icon = if i == 0 { role_icon(message.role()) } else { "  " };
        write!(out, "{}{icon} {}", BAR_CHAR.style(bar), line.style(text)).ok();
    }
    out
}

#[inline]
fn role_icon(role: Role) -> &'static str {
    match role {
        Role::User => "🧑",
        Role::Assistant => "🤖",
    }
}

/// Keeps track of which transcript entries have been printed.
///
/// The transcript only grows, so remembering how many entries were printed
/// is enough to find the new ones in a later snapshot.
#[derive(Debug, Default)]
pub struct TranscriptPrinter {
    printed: usize,
}

impl TranscriptPrinter {
    /// Creates a printer that hasn't printed anything.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of entries printed so far.
    #[inline]
    pub fn printed(&self) -> usize {
        self.printed
    }

    /// Returns the entries not printed yet and marks them as printed.
    pub fn take_new<'a>(&mut self, transcript: &'a Transcript) -> &'a [Message] {
        let messages = transcript.messages();
        let start = self.printed.min(messages.len());
        self.printed = messages.len();
        &messages[start..]
    }

    /// Formats the entries not printed yet and marks them as printed.
    pub fn render_new(&mut self, transcript: &Transcript) -> Vec<String> {
        self.take_new(transcript)
            .iter()
            .map(format_message)
            .collect()
    }
}
