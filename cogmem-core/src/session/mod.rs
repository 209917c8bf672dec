//! Per-session transcript state.
//!
//! ## Lifecycle
//!
//! ```text
//! absent
//!   │  first message
//!   ▼
//! active ──► messages appended on every event
//!   │  idle / end
//!   ▼
//! flushed (removed + retired, never revived under the same id)
//! ```
//!
//! The store is an explicit value owned by whoever drives the hooks. Nothing
//! here is process-global and nothing is persisted: a restart drops any
//! unflushed transcript.

pub mod transcript;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Speaker of a transcript message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
            Role::System => write!(f, "system"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" | "human" => Ok(Role::User),
            "assistant" | "ai" | "model" => Ok(Role::Assistant),
            "system" => Ok(Role::System),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// One message of a session transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMessage {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Accumulated transcript of one session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub messages: Vec<SessionMessage>,
    pub start_time: DateTime<Utc>,
}

impl SessionState {
    fn new(start_time: DateTime<Utc>) -> Self {
        Self {
            messages: Vec::new(),
            start_time,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn user_message_count(&self) -> usize {
        self.messages.iter().filter(|m| m.role == Role::User).count()
    }
}

/// Session id → transcript map, with retirement of flushed ids.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<String, SessionState>,
    retired: HashSet<String>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message now. See [`SessionStore::record_at`].
    pub fn record(&mut self, session_id: &str, role: Role, content: &str) -> bool {
        self.record_at(session_id, role, content, Utc::now())
    }

    /// Append a message, creating the session on its first message.
    ///
    /// Returns false when nothing was recorded: blank content, or a session
    /// that has already been flushed.
    pub fn record_at(
        &mut self,
        session_id: &str,
        role: Role,
        content: &str,
        timestamp: DateTime<Utc>,
    ) -> bool {
        if content.trim().is_empty() {
            return false;
        }
        if self.retired.contains(session_id) {
            debug!("Ignoring message for flushed session {}", session_id);
            return false;
        }

        self.sessions
            .entry(session_id.to_string())
            .or_insert_with(|| SessionState::new(timestamp))
            .messages
            .push(SessionMessage {
                role,
                content: content.to_string(),
                timestamp,
            });
        true
    }

    pub fn get(&self, session_id: &str) -> Option<&SessionState> {
        self.sessions.get(session_id)
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.contains_key(session_id)
    }

    pub fn is_retired(&self, session_id: &str) -> bool {
        self.retired.contains(session_id)
    }

    /// Take the session out of the store and retire its id.
    pub fn remove(&mut self, session_id: &str) -> Option<SessionState> {
        self.retired.insert(session_id.to_string());
        self.sessions.remove(session_id)
    }

    /// Ids of sessions that still hold state
    pub fn active_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.sessions.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_message_creates_session() {
        let mut store = SessionStore::new();
        assert!(!store.contains("s1"));

        assert!(store.record("s1", Role::User, "hello"));
        assert!(store.record("s1", Role::Assistant, "hi"));

        let state = store.get("s1").unwrap();
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[0].content, "hello");
        assert_eq!(state.messages[1].role, Role::Assistant);
        assert_eq!(state.start_time, state.messages[0].timestamp);
        assert_eq!(state.user_message_count(), 1);
    }

    #[test]
    fn test_blank_messages_are_ignored() {
        let mut store = SessionStore::new();
        assert!(!store.record("s1", Role::User, "   "));
        assert!(!store.contains("s1"));
    }

    #[test]
    fn test_sessions_are_isolated() {
        let mut store = SessionStore::new();
        store.record("a", Role::User, "one");
        store.record("b", Role::User, "two");
        store.record("a", Role::User, "three");

        assert_eq!(store.get("a").unwrap().messages.len(), 2);
        assert_eq!(store.get("b").unwrap().messages.len(), 1);
        assert_eq!(store.active_ids(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_removed_session_is_never_revived() {
        let mut store = SessionStore::new();
        store.record("s1", Role::User, "hello");

        let state = store.remove("s1").unwrap();
        assert_eq!(state.messages.len(), 1);
        assert!(store.is_retired("s1"));
        assert!(store.is_empty());

        assert!(!store.record("s1", Role::User, "again"));
        assert!(store.get("s1").is_none());

        // A new id starts fresh
        assert!(store.record("s2", Role::User, "again"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove_unknown_session_still_retires() {
        let mut store = SessionStore::new();
        assert!(store.remove("ghost").is_none());
        assert!(store.is_retired("ghost"));
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("User".parse::<Role>(), Ok(Role::User));
        assert_eq!("assistant".parse::<Role>(), Ok(Role::Assistant));
        assert_eq!("human".parse::<Role>(), Ok(Role::User));
        assert!("tool".parse::<Role>().is_err());
    }
}
