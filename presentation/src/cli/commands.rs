//! CLI command definitions

use clap::{Args, Parser, Subcommand};
use cvchat_domain::{Rerank, SendOptions};
use std::path::PathBuf;

/// CLI arguments for cvchat
#[derive(Parser, Debug)]
#[command(name = "cvchat")]
#[command(author, version, about = "Chat with a resume backend from your terminal")]
#[command(long_about = r#"
cvchat talks to a retrieval-augmented "chat with my resume" backend through
a small relay. Run the relay with `cvchat serve`, then chat with
`cvchat chat` (the default) or fire a single question with `cvchat ask`.

Configuration files are loaded from (in priority order):
1. BACKEND_URL / API_KEY environment variables
2. --config <path>     Explicit config file
3. ./cvchat.toml       Project-level config
4. ~/.config/cvchat/config.toml   Global config

Example:
  cvchat serve
  cvchat ask "What did you work on most recently?"
  cvchat chat --model openai/gpt-4o --no-stream
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress the spinner and decorations
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Interactive chat (the default when no subcommand is given)
    Chat(ChatArgs),
    /// Ask a single question and print the answer
    Ask(AskArgs),
    /// Run the relay that fronts the backend
    Serve(ServeArgs),
}

/// Options shared by `chat` and `ask`.
#[derive(Args, Debug, Default, Clone)]
pub struct ChatArgs {
    /// Relay origin to talk to
    #[arg(long, value_name = "URL")]
    pub relay_url: Option<String>,

    /// Wait for the whole answer instead of streaming it
    #[arg(long)]
    pub no_stream: bool,

    /// Model identifier forwarded to the backend
    #[arg(long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Number of retrieved context chunks
    #[arg(long, value_name = "N")]
    pub k: Option<u32>,

    /// Sampling temperature
    #[arg(long, value_name = "T")]
    pub temperature: Option<f32>,

    /// Expand the question with a hypothetical answer before retrieval
    #[arg(long)]
    pub use_hyde: bool,

    /// Reranking mode: none, cheap, or llm
    #[arg(long, value_name = "MODE")]
    pub rerank: Option<Rerank>,

    /// Candidates kept after reranking
    #[arg(long, value_name = "N")]
    pub rerank_top_n: Option<u32>,

    /// Ignore any saved session and start with an empty transcript
    #[arg(long)]
    pub fresh: bool,
}

impl ChatArgs {
    /// Layer these flags over `base` (usually the configured defaults).
    pub fn apply_to(&self, base: SendOptions) -> SendOptions {
        let mut options = base;
        if self.no_stream {
            options.stream = false;
        }
        if let Some(model) = &self.model {
            options.model = model.clone();
        }
        if let Some(k) = self.k {
            options.k = k;
        }
        if let Some(temperature) = self.temperature {
            options.temperature = temperature;
        }
        if self.use_hyde {
            options.use_hyde = true;
        }
        if let Some(rerank) = self.rerank {
            options.rerank = rerank;
        }
        if let Some(n) = self.rerank_top_n {
            options.rerank_top_n = Some(n);
        }
        options
    }
}

#[derive(Args, Debug)]
pub struct AskArgs {
    /// The question to ask
    pub question: String,

    #[command(flatten)]
    pub chat: ChatArgs,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Listen address, e.g. 127.0.0.1:8787
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// Upstream backend origin (overrides config and BACKEND_URL)
    #[arg(long, value_name = "URL")]
    pub backend_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn no_subcommand_means_interactive_chat() {
        let cli = Cli::parse_from(["cvchat"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn ask_takes_a_question_and_overrides() {
        let cli = Cli::parse_from([
            "cvchat",
            "ask",
            "what stack?",
            "--model",
            "openai/gpt-4o",
            "--no-stream",
            "--rerank",
            "cheap",
        ]);
        let Some(Command::Ask(args)) = cli.command else {
            panic!("expected ask");
        };
        assert_eq!(args.question, "what stack?");

        let options = args.chat.apply_to(SendOptions::default());
        assert!(!options.stream);
        assert_eq!(options.model, "openai/gpt-4o");
        assert_eq!(options.rerank, Rerank::Cheap);
        // Untouched knobs keep their defaults.
        assert_eq!(options.k, 5);
    }

    #[test]
    fn serve_accepts_bind_and_backend_overrides() {
        let cli = Cli::parse_from([
            "cvchat",
            "serve",
            "--bind",
            "0.0.0.0:9000",
            "--backend-url",
            "http://backend:8000",
        ]);
        let Some(Command::Serve(args)) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.bind.as_deref(), Some("0.0.0.0:9000"));
        assert_eq!(args.backend_url.as_deref(), Some("http://backend:8000"));
    }

    #[test]
    fn verbosity_is_global() {
        let cli = Cli::parse_from(["cvchat", "chat", "-vv"]);
        assert_eq!(cli.verbose, 2);
    }
}
