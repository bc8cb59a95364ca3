//! File-backed [`SessionStore`].
//!
//! One JSON file holds the whole record (`{messages, ts}`). Reads treat a
//! missing, malformed, or expired file as "no session" and delete the bad
//! file on the way; writes overwrite the file wholesale. All operations
//! swallow I/O errors — losing a session is acceptable, breaking a chat
//! turn is not.

use cvchat_application::ports::session_store::SessionStore;
use cvchat_domain::{Message, SessionRecord};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Session store writing to a single JSON file.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the platform cache location, or `None` when the platform
    /// exposes no cache directory (callers fall back to no persistence).
    pub fn open_default() -> Option<Self> {
        let path = dirs::cache_dir()?.join("cvchat").join("session.json");
        Some(Self::new(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn now_ms() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    fn remove(&self) {
        if let Err(error) = fs::remove_file(&self.path)
            && error.kind() != std::io::ErrorKind::NotFound
        {
            warn!("could not remove session file {}: {}", self.path.display(), error);
        }
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Option<SessionRecord> {
        let raw = fs::read_to_string(&self.path).ok()?;

        let record: SessionRecord = match serde_json::from_str(&raw) {
            Ok(record) => record,
            Err(error) => {
                debug!("discarding malformed session file: {}", error);
                self.remove();
                return None;
            }
        };

        if record.is_expired(Self::now_ms()) {
            debug!("discarding expired session file");
            self.remove();
            return None;
        }

        Some(record)
    }

    fn save(&self, messages: &[Message]) {
        let record = SessionRecord::new(messages.to_vec(), Self::now_ms());
        let Ok(json) = serde_json::to_string(&record) else {
            return;
        };

        if let Some(parent) = self.path.parent()
            && let Err(error) = fs::create_dir_all(parent)
        {
            warn!("could not create session directory {}: {}", parent.display(), error);
            return;
        }

        if let Err(error) = fs::write(&self.path, json) {
            warn!("could not write session file {}: {}", self.path.display(), error);
        }
    }

    fn clear(&self) {
        self.remove();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cvchat_domain::SESSION_TTL_MS;

    fn store_in(dir: &tempfile::TempDir) -> FileSessionStore {
        FileSessionStore::new(dir.path().join("session.json"))
    }

    #[test]
    fn load_on_missing_file_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store_in(&dir).load().is_none());
    }

    #[test]
    fn save_then_load_roundtrips_messages() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let messages = vec![Message::user("q"), Message::assistant("a")];

        store.save(&messages);
        let record = store.load().unwrap();
        assert_eq!(record.messages, messages);
    }

    #[test]
    fn save_overwrites_the_previous_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.save(&[Message::user("old")]);
        store.save(&[Message::user("new"), Message::assistant("reply")]);

        let record = store.load().unwrap();
        assert_eq!(record.messages.len(), 2);
        assert_eq!(record.messages[0].content, "new");
    }

    #[test]
    fn expired_record_reads_as_absent_and_is_purged() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let stale = SessionRecord::new(
            vec![Message::user("old")],
            chrono::Utc::now().timestamp_millis() - SESSION_TTL_MS - 1_000,
        );
        fs::write(store.path(), serde_json::to_string(&stale).unwrap()).unwrap();

        assert!(store.load().is_none());
        assert!(!store.path().exists());
        // Expiry is idempotent: the second read also finds nothing.
        assert!(store.load().is_none());
    }

    #[test]
    fn corrupt_record_reads_as_absent_and_is_purged() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        fs::write(store.path(), "{not json").unwrap();
        assert!(store.load().is_none());
        assert!(!store.path().exists());
    }

    #[test]
    fn clear_removes_the_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.save(&[Message::user("q")]);
        store.clear();
        assert!(store.load().is_none());

        // Clearing an already-empty store is fine.
        store.clear();
    }

    #[test]
    fn save_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("nested").join("session.json"));

        store.save(&[Message::user("q")]);
        assert!(store.load().is_some());
    }
}
