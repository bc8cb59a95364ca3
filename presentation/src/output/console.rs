//! Console rendering for the chat client.
//!
//! [`ConsoleChat`] implements [`ChatObserver`] and prints streamed deltas
//! as they arrive (the typing effect). [`ConsoleFormatter`] renders a
//! whole transcript, used when a saved session is replayed.

use colored::Colorize;
use cvchat_application::ports::chat_observer::ChatObserver;
use cvchat_domain::{Message, Role};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Prints chat turns to the terminal as they happen.
pub struct ConsoleChat {
    decorations: bool,
    streamed: AtomicBool,
    spinner: Mutex<Option<ProgressBar>>,
}

impl ConsoleChat {
    pub fn new() -> Self {
        Self {
            decorations: true,
            streamed: AtomicBool::new(false),
            spinner: Mutex::new(None),
        }
    }

    /// Disable the spinner and colored prefixes (quiet mode).
    pub fn with_decorations(mut self, decorations: bool) -> Self {
        self.decorations = decorations;
        self
    }

    /// Show a spinner until the first output of the turn arrives. Used for
    /// non-streaming sends, where nothing prints until the full answer.
    pub fn start_thinking(&self) {
        if !self.decorations {
            return;
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        pb.set_message("thinking...");
        pb.enable_steady_tick(Duration::from_millis(100));
        *self.spinner.lock().unwrap() = Some(pb);
    }

    fn stop_thinking(&self) {
        if let Some(pb) = self.spinner.lock().unwrap().take() {
            pb.finish_and_clear();
        }
    }

    fn prefix(&self) -> String {
        if self.decorations {
            format!("{} ", "cv>".yellow().bold())
        } else {
            String::new()
        }
    }
}

impl Default for ConsoleChat {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatObserver for ConsoleChat {
    fn on_assistant_delta(&self, chunk: &str) {
        self.stop_thinking();
        if !self.streamed.swap(true, Ordering::SeqCst) {
            print!("{}", self.prefix());
        }
        print!("{}", chunk);
        let _ = std::io::stdout().flush();
    }

    fn on_assistant_message(&self, content: &str) {
        self.stop_thinking();
        if self.streamed.swap(false, Ordering::SeqCst) {
            // Deltas already painted the answer; just close the line.
            println!();
        } else {
            println!("{}{}", self.prefix(), content);
        }
    }

    fn on_turn_error(&self, content: &str) {
        self.stop_thinking();
        if self.streamed.swap(false, Ordering::SeqCst) {
            println!();
        }
        if self.decorations {
            println!("{}", content.red());
        } else {
            println!("{}", content);
        }
    }
}

/// Formats a transcript for console display.
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Render the whole transcript, one prefixed line block per message.
    pub fn format_transcript(messages: &[Message]) -> String {
        let mut output = String::new();
        for message in messages {
            let prefix = match message.role {
                Role::User => "you>".cyan().bold(),
                Role::Assistant => "cv>".yellow().bold(),
            };
            output.push_str(&format!("{} {}\n", prefix, message.content));
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_contains_every_message_in_order() {
        let messages = vec![
            Message::user("what stack?"),
            Message::assistant("Rust, mostly."),
        ];
        let rendered = ConsoleFormatter::format_transcript(&messages);

        let first = rendered.find("what stack?").unwrap();
        let second = rendered.find("Rust, mostly.").unwrap();
        assert!(first < second);
        assert_eq!(rendered.lines().count(), 2);
    }

    #[test]
    fn empty_transcript_renders_nothing() {
        assert!(ConsoleFormatter::format_transcript(&[]).is_empty());
    }
}
