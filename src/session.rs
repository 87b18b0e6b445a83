//! Per-user session store
//!
//! Sessions hold the append-only conversation history for one patient,
//! keyed by name. The store lives for the process lifetime; nothing is
//! evicted or persisted.
//!
//! # Concurrency contract
//!
//! The map sits behind an `RwLock` so the store can be shared with the HTTP
//! adapter. Each turn snapshots the history before the remote call and
//! appends after it, so two concurrent turns for the same name can interleave
//! their appends. That race exists in the original system as well and is
//! deliberately left in place rather than serialized per key.

use crate::error::{HekimError, Result};
use crate::providers::Message;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;

/// One patient's accumulated conversation state
#[derive(Debug, Clone)]
pub struct Session {
    /// Patient identifier (the name entered in the form or prompt)
    pub user_id: String,
    /// Whether the intro instruction has been synthesized
    pub intro_added: bool,
    /// Ordered conversation history, oldest first
    pub messages: Vec<Message>,
    /// When the session was created
    pub created_at: DateTime<Utc>,
}

impl Session {
    fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            intro_added: false,
            messages: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

/// In-memory mapping from patient name to session
///
/// # Examples
///
/// ```
/// use hekim::session::SessionStore;
/// use hekim::providers::Message;
///
/// let store = SessionStore::new();
/// store.ensure_intro("Ahmet", "intro text");
/// store.append("Ahmet", Message::user("Başım ağrıyor")).unwrap();
/// assert_eq!(store.len("Ahmet"), 2);
/// ```
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a clone of a session, creating it empty if absent
    ///
    /// New sessions start with no messages and no intro.
    pub fn get_or_create(&self, user_id: &str) -> Session {
        let mut sessions = self.sessions.write().expect("session lock poisoned");
        sessions
            .entry(user_id.to_string())
            .or_insert_with(|| {
                tracing::info!("Creating session for {}", user_id);
                Session::new(user_id)
            })
            .clone()
    }

    /// Append one message to a session
    ///
    /// The session is created if it does not exist. The only validation is
    /// that the text is non-empty; messages are never edited or removed.
    ///
    /// # Errors
    ///
    /// Returns a session error if the message content is empty
    pub fn append(&self, user_id: &str, message: Message) -> Result<()> {
        if message.content.is_empty() {
            return Err(
                HekimError::Session(format!("Empty message for session {}", user_id)).into(),
            );
        }

        let mut sessions = self.sessions.write().expect("session lock poisoned");
        sessions
            .entry(user_id.to_string())
            .or_insert_with(|| Session::new(user_id))
            .messages
            .push(message);
        Ok(())
    }

    /// Append a completed turn (user message plus assistant reply)
    ///
    /// Both messages are appended under one write lock so a successful turn
    /// always grows the history by exactly two.
    ///
    /// # Errors
    ///
    /// Returns a session error if either message is empty; nothing is
    /// appended in that case
    pub fn append_turn(&self, user_id: &str, user: Message, assistant: Message) -> Result<()> {
        if user.content.is_empty() || assistant.content.is_empty() {
            return Err(
                HekimError::Session(format!("Empty message for session {}", user_id)).into(),
            );
        }

        let mut sessions = self.sessions.write().expect("session lock poisoned");
        let session = sessions
            .entry(user_id.to_string())
            .or_insert_with(|| Session::new(user_id));
        session.messages.push(user);
        session.messages.push(assistant);
        Ok(())
    }

    /// Insert the intro instruction if the session has no messages yet
    ///
    /// The intro is stored as a user-role message. Idempotent after the
    /// first call.
    pub fn ensure_intro(&self, user_id: &str, intro: &str) {
        let mut sessions = self.sessions.write().expect("session lock poisoned");
        let session = sessions
            .entry(user_id.to_string())
            .or_insert_with(|| Session::new(user_id));
        if !session.intro_added && session.messages.is_empty() {
            tracing::debug!("Synthesizing intro for {}", user_id);
            session.messages.push(Message::user(intro));
            session.intro_added = true;
        }
    }

    /// Snapshot a session's history, oldest first
    ///
    /// Returns an empty list for unknown sessions.
    pub fn history(&self, user_id: &str) -> Vec<Message> {
        let sessions = self.sessions.read().expect("session lock poisoned");
        sessions
            .get(user_id)
            .map(|s| s.messages.clone())
            .unwrap_or_default()
    }

    /// Number of messages in a session (0 for unknown sessions)
    pub fn len(&self, user_id: &str) -> usize {
        let sessions = self.sessions.read().expect("session lock poisoned");
        sessions.get(user_id).map(|s| s.messages.len()).unwrap_or(0)
    }

    /// True if no sessions exist
    pub fn is_empty(&self) -> bool {
        self.sessions.read().expect("session lock poisoned").is_empty()
    }

    /// Discard all sessions
    ///
    /// The next turn for any user re-triggers intro synthesis.
    pub fn reset_all(&self) {
        let mut sessions = self.sessions.write().expect("session lock poisoned");
        let count = sessions.len();
        sessions.clear();
        tracing::info!("Cleared {} session(s)", count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_create_starts_empty() {
        let store = SessionStore::new();
        let session = store.get_or_create("ahmet");
        assert_eq!(session.user_id, "ahmet");
        assert!(!session.intro_added);
        assert!(session.messages.is_empty());
    }

    #[test]
    fn test_get_or_create_is_idempotent() {
        let store = SessionStore::new();
        store.append("ahmet", Message::user("hi")).unwrap();
        let session = store.get_or_create("ahmet");
        assert_eq!(session.messages.len(), 1);
    }

    #[test]
    fn test_append_rejects_empty_text() {
        let store = SessionStore::new();
        assert!(store.append("ahmet", Message::user("")).is_err());
        assert_eq!(store.len("ahmet"), 0);
    }

    #[test]
    fn test_ensure_intro_once() {
        let store = SessionStore::new();
        store.ensure_intro("ahmet", "intro text");
        store.ensure_intro("ahmet", "different intro");

        let history = store.history("ahmet");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].role, "user");
        assert_eq!(history[0].content, "intro text");
        assert!(store.get_or_create("ahmet").intro_added);
    }

    #[test]
    fn test_ensure_intro_skipped_when_history_exists() {
        let store = SessionStore::new();
        store.append("ahmet", Message::user("hello")).unwrap();
        store.ensure_intro("ahmet", "intro text");
        assert_eq!(store.len("ahmet"), 1);
        assert!(!store.get_or_create("ahmet").intro_added);
    }

    #[test]
    fn test_intro_flag_gates_resynthesis() {
        let store = SessionStore::new();
        store.ensure_intro("ahmet", "intro text");
        assert!(store.get_or_create("ahmet").intro_added);

        // Flag survives the turn and keeps later calls from re-inserting
        store
            .append_turn("ahmet", Message::user("soru"), Message::assistant("cevap"))
            .unwrap();
        store.ensure_intro("ahmet", "late intro");
        let history = store.history("ahmet");
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].content, "intro text");
    }

    #[test]
    fn test_append_turn_grows_by_two() {
        let store = SessionStore::new();
        store.ensure_intro("ahmet", "intro");
        store
            .append_turn("ahmet", Message::user("soru"), Message::assistant("cevap"))
            .unwrap();
        assert_eq!(store.len("ahmet"), 3);

        let history = store.history("ahmet");
        assert_eq!(history[1].role, "user");
        assert_eq!(history[2].role, "assistant");
    }

    #[test]
    fn test_append_turn_rejects_empty_reply() {
        let store = SessionStore::new();
        store.ensure_intro("ahmet", "intro");
        let result = store.append_turn("ahmet", Message::user("soru"), Message::assistant(""));
        assert!(result.is_err());
        // Nothing partial was appended
        assert_eq!(store.len("ahmet"), 1);
    }

    #[test]
    fn test_alternating_after_intro() {
        let store = SessionStore::new();
        store.ensure_intro("ahmet", "intro");
        for i in 0..3 {
            store
                .append_turn(
                    "ahmet",
                    Message::user(format!("soru {}", i)),
                    Message::assistant(format!("cevap {}", i)),
                )
                .unwrap();
        }

        let history = store.history("ahmet");
        assert_eq!(history.len(), 7);
        for (idx, message) in history.iter().enumerate().skip(1) {
            let expected = if idx % 2 == 1 { "user" } else { "assistant" };
            assert_eq!(message.role, expected);
        }
    }

    #[test]
    fn test_history_unknown_session_is_empty() {
        let store = SessionStore::new();
        assert!(store.history("nobody").is_empty());
        assert_eq!(store.len("nobody"), 0);
    }

    #[test]
    fn test_sessions_are_isolated() {
        let store = SessionStore::new();
        store.ensure_intro("ahmet", "intro a");
        store.ensure_intro("ayse", "intro b");
        store
            .append_turn("ahmet", Message::user("q"), Message::assistant("a"))
            .unwrap();

        assert_eq!(store.len("ahmet"), 3);
        assert_eq!(store.len("ayse"), 1);
        assert_eq!(store.history("ayse")[0].content, "intro b");
    }

    #[test]
    fn test_reset_all_clears_everything() {
        let store = SessionStore::new();
        store.ensure_intro("ahmet", "intro");
        store.ensure_intro("ayse", "intro");
        store.reset_all();

        assert!(store.is_empty());
        assert_eq!(store.len("ahmet"), 0);

        // Next intro re-synthesizes from scratch
        store.ensure_intro("ahmet", "fresh intro");
        assert_eq!(store.history("ahmet")[0].content, "fresh intro");
    }
}
