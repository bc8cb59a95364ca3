//! CLI entrypoint for cvchat
//!
//! This is the main binary that wires together all layers using
//! dependency injection: the reqwest gateway and file session store into
//! the chat use case for `chat`/`ask`, or the relay state into the axum
//! server for `serve`.

use anyhow::{Context, Result};
use clap::Parser;
use cvchat_application::ports::session_store::{NoSessionStore, SessionStore};
use cvchat_application::ChatTurns;
use cvchat_domain::SendOptions;
use cvchat_infrastructure::{
    ConfigLoader, FileConfig, FileSessionStore, HttpChatGateway, JsonlConversationLogger,
    RelayState, serve,
};
use cvchat_presentation::{AskArgs, ChatArgs, ChatRepl, Cli, Command, ConsoleChat, ServeArgs};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).map_err(|e| anyhow::anyhow!(e.to_string()))?
    };

    match cli.command {
        Some(Command::Serve(args)) => run_serve(args, config).await,
        Some(Command::Ask(args)) => run_ask(args, config, cli.quiet).await,
        Some(Command::Chat(args)) => run_chat(args, config, cli.quiet).await,
        None => run_chat(ChatArgs::default(), config, cli.quiet).await,
    }
}

async fn run_serve(args: ServeArgs, config: FileConfig) -> Result<()> {
    let bind = args.bind.unwrap_or(config.relay.bind);
    let addr: SocketAddr = bind
        .parse()
        .with_context(|| format!("invalid listen address: {}", bind))?;

    let backend_url = args.backend_url.or(config.relay.backend_url);
    let state = RelayState::new(backend_url, config.relay.api_key);

    serve(addr, state).await.context("relay server failed")
}

async fn run_chat(args: ChatArgs, config: FileConfig, quiet: bool) -> Result<()> {
    let (turns, options) = build_turns(&args, &config, true);

    let mut repl = ChatRepl::new(turns, options).with_progress(!quiet);
    repl.run().await?;
    Ok(())
}

async fn run_ask(args: AskArgs, config: FileConfig, quiet: bool) -> Result<()> {
    // Single questions never touch the saved session.
    let (turns, options) = build_turns(&args.chat, &config, false);

    let console = ConsoleChat::new().with_decorations(!quiet);
    if !options.stream && !quiet {
        console.start_thinking();
    }
    turns.send(&args.question, &options, &console).await;
    Ok(())
}

/// Wire gateway, session store, and logger into the chat use case.
fn build_turns(
    args: &ChatArgs,
    config: &FileConfig,
    with_session: bool,
) -> (Arc<ChatTurns>, SendOptions) {
    let relay_url = args
        .relay_url
        .clone()
        .unwrap_or_else(|| config.chat.relay_url.clone());
    info!("using relay at {}", relay_url);

    let gateway = Arc::new(HttpChatGateway::new(relay_url));

    let store: Arc<dyn SessionStore> = if with_session && config.session.persist {
        let file_store = match &config.session.file {
            Some(path) => Some(FileSessionStore::new(path)),
            None => FileSessionStore::open_default(),
        };
        match file_store {
            Some(store) => {
                if args.fresh {
                    store.clear();
                }
                Arc::new(store)
            }
            None => Arc::new(NoSessionStore),
        }
    } else {
        Arc::new(NoSessionStore)
    };

    let mut turns = ChatTurns::new(gateway, store);

    if let Some(path) = &config.log.conversation_file
        && let Some(logger) = JsonlConversationLogger::open(path)
    {
        turns = turns.with_logger(Arc::new(logger));
    }

    let options = args.apply_to(config.chat.send_options());
    (Arc::new(turns), options)
}
