//! Chat observer port
//!
//! Callback interface the presentation layer implements to render a turn
//! as it happens: the echoed question, streamed deltas, the settled
//! answer, and inline errors.

/// Callbacks fired by [`ChatTurns`](crate::use_cases::chat_turns::ChatTurns)
/// while a send is in progress.
///
/// All methods have no-op defaults so implementations only pick up the
/// events they render.
pub trait ChatObserver: Send + Sync {
    /// The user's message was appended to the transcript.
    fn on_user_message(&self, _content: &str) {}

    /// A streamed chunk arrived and was folded into the pending answer.
    fn on_assistant_delta(&self, _chunk: &str) {}

    /// The assistant message for this turn reached its final content.
    fn on_assistant_message(&self, _content: &str) {}

    /// The turn failed; `content` is the `⚠️`-prefixed transcript entry.
    fn on_turn_error(&self, _content: &str) {}
}

/// No-op observer for tests and quiet mode.
pub struct NoChatObserver;

impl ChatObserver for NoChatObserver {}
