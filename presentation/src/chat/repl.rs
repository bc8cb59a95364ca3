//! REPL (Read-Eval-Print Loop) for interactive chat

use crate::output::console::{ConsoleChat, ConsoleFormatter};
use cvchat_application::ChatTurns;
use cvchat_domain::SendOptions;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::sync::Arc;

/// Interactive chat REPL
pub struct ChatRepl {
    turns: Arc<ChatTurns>,
    options: SendOptions,
    console: ConsoleChat,
    show_progress: bool,
}

impl ChatRepl {
    /// Create a new ChatRepl
    pub fn new(turns: Arc<ChatTurns>, options: SendOptions) -> Self {
        Self {
            turns,
            options,
            console: ConsoleChat::new(),
            show_progress: true,
        }
    }

    /// Set whether to show the spinner and decorations
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self.console = ConsoleChat::new().with_decorations(show);
        self
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        // Try to load history
        let history_path = dirs::data_dir().map(|p| p.join("cvchat").join("history.txt"));

        if let Some(ref path) = history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        self.print_welcome();

        loop {
            let readline = rl.readline("you> ");

            match readline {
                Ok(line) => {
                    let line = line.trim().to_string();

                    // Skip empty lines
                    if line.is_empty() {
                        continue;
                    }

                    // Handle commands
                    if line.starts_with('/') {
                        if self.handle_command(&line) {
                            break;
                        }
                        continue;
                    }

                    // Add to history
                    let _ = rl.add_history_entry(&line);

                    self.process_line(&line).await;
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        // Save history
        if let Some(ref path) = history_path {
            let _ = rl.save_history(path);
        }

        // The conversation does not outlive a clean exit.
        self.turns.end_session();

        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│          cvchat - ask me anything           │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!("Model: {}", self.options.model);
        println!();
        println!("Commands:");
        println!("  /help            - Show this help");
        println!("  /reset           - Clear the conversation");
        println!("  /stream on|off   - Toggle streamed answers");
        println!("  /quit            - Exit chat");
        println!();

        let restored = self.turns.messages();
        if !restored.is_empty() {
            println!("(picking up your conversation from earlier)");
            print!("{}", ConsoleFormatter::format_transcript(&restored));
            println!();
        }
    }

    /// Handle slash commands. Returns true if should exit.
    fn handle_command(&mut self, cmd: &str) -> bool {
        match cmd {
            "/quit" | "/exit" | "/q" => {
                println!("Bye!");
                true
            }
            "/help" | "/h" | "/?" => {
                println!();
                println!("Commands:");
                println!("  /help, /h, /?    - Show this help");
                println!("  /reset           - Clear the conversation");
                println!("  /stream on|off   - Toggle streamed answers");
                println!("  /quit, /exit, /q - Exit chat");
                println!();
                false
            }
            "/reset" => {
                self.turns.reset();
                println!("Conversation cleared.");
                false
            }
            "/stream on" => {
                self.options.stream = true;
                println!("Streaming on.");
                false
            }
            "/stream off" => {
                self.options.stream = false;
                println!("Streaming off.");
                false
            }
            _ => {
                println!("Unknown command: {}", cmd);
                println!("Type /help for available commands");
                false
            }
        }
    }

    async fn process_line(&self, line: &str) {
        if !self.options.stream && self.show_progress {
            self.console.start_thinking();
        }
        self.turns.send(line, &self.options, &self.console).await;
    }
}
