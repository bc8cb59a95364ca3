//! Persisted session record with time-based expiry.

use crate::chat::entities::Message;
use serde::{Deserialize, Serialize};

/// How long a saved session stays valid: 20 minutes, in milliseconds.
pub const SESSION_TTL_MS: i64 = 20 * 60 * 1000;

/// A saved transcript plus the epoch-millis timestamp it was written at.
///
/// The record is overwritten wholesale on every transcript change; readers
/// treat a record older than [`SESSION_TTL_MS`] as absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub messages: Vec<Message>,
    /// Save time, epoch milliseconds.
    pub ts: i64,
}

impl SessionRecord {
    pub fn new(messages: Vec<Message>, ts: i64) -> Self {
        Self { messages, ts }
    }

    /// True once the record has outlived [`SESSION_TTL_MS`] at `now_ms`.
    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms - self.ts > SESSION_TTL_MS
    }
}
