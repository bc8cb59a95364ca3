//! Session store port
//!
//! Persistence of the transcript across runs, with a TTL. The API is
//! deliberately infallible: a corrupt or expired record reads as absent,
//! and a store with no usable backing location degrades to a no-op.

use cvchat_domain::{Message, SessionRecord};

/// Key-value persistence of the conversation with time-based expiry.
///
/// Implementations live in the infrastructure layer. Callers always pass
/// the full transcript to `save` — every write is a total overwrite.
pub trait SessionStore: Send + Sync {
    /// Read the stored record. Missing, malformed, or expired records
    /// return `None`; malformed and expired ones are deleted on the way.
    fn load(&self) -> Option<SessionRecord>;

    /// Overwrite the stored record with `messages` and the current time.
    fn save(&self, messages: &[Message]);

    /// Delete the stored record unconditionally.
    fn clear(&self);
}

/// No-op store for tests and for running without persistence.
pub struct NoSessionStore;

impl SessionStore for NoSessionStore {
    fn load(&self) -> Option<SessionRecord> {
        None
    }

    fn save(&self, _messages: &[Message]) {}

    fn clear(&self) {}
}
