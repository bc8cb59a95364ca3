//! Presentation layer for cvchat
//!
//! This crate contains the CLI definitions, console rendering, and the
//! interactive chat loop.

pub mod chat;
pub mod cli;
pub mod output;

// Re-export commonly used types
pub use chat::ChatRepl;
pub use cli::commands::{AskArgs, ChatArgs, Cli, Command, ServeArgs};
pub use output::console::{ConsoleChat, ConsoleFormatter};
