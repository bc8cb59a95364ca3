//! Infrastructure layer for cvchat
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer — the reqwest-backed chat gateway, the axum relay
//! that fronts the backend, file-based session persistence, configuration
//! loading, and conversation logging.

pub mod config;
pub mod http;
pub mod logging;
pub mod relay;
pub mod session;

// Re-export commonly used types
pub use config::{ConfigLoader, FileChatConfig, FileConfig, FileRelayConfig, FileSessionConfig};
pub use http::HttpChatGateway;
pub use logging::JsonlConversationLogger;
pub use relay::{RelayState, build_router, serve};
pub use session::FileSessionStore;
