//! Application layer for cvchat
//!
//! This crate contains the chat use case and the port definitions it
//! depends on. It depends only on the domain layer.

pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{
    chat_gateway::{ChatGateway, GatewayError, StreamHandle},
    chat_observer::{ChatObserver, NoChatObserver},
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    session_store::{NoSessionStore, SessionStore},
};
pub use use_cases::chat_turns::ChatTurns;
