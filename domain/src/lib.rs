//! Domain layer for cvchat
//!
//! This crate contains the conversation entities and value objects shared
//! by every other layer. It has no dependencies on infrastructure or
//! presentation concerns.
//!
//! # Core Concepts
//!
//! ## Transcript
//!
//! A conversation is an ordered sequence of [`Message`]s. The sequence is
//! append-only, with one exception: while a streamed answer is in flight,
//! the assistant message for the current turn is rewritten in place as
//! chunks arrive.
//!
//! ## Session
//!
//! A [`SessionRecord`] is the transcript plus the time it was saved.
//! Records older than [`SESSION_TTL_MS`] are treated as absent.

pub mod chat;
pub mod session;

// Re-export commonly used types
pub use chat::{
    entities::{Message, Role},
    options::{Rerank, SendOptions},
    payload::{ChatAnswer, ChatRequest},
};
pub use session::{
    record::{SESSION_TTL_MS, SessionRecord},
    stream::StreamEvent,
};
