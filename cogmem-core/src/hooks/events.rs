//! Events for the long-lived, stateful adapter.
//!
//! One JSON object per line on input, one [`HookOutput`] per line on output.
//! Unlike the stateless hooks, the [`SessionStore`] lives for the whole
//! process, so transcripts accumulate from `message` events.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use super::{HookOutput, HookRunner};
use crate::session::{Role, SessionStore};

/// Event delivered by the host.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum PluginEvent {
    #[serde(rename = "session.created")]
    SessionCreated {
        #[serde(alias = "sessionId")]
        session_id: String,
    },

    #[serde(rename = "message")]
    Message {
        #[serde(alias = "sessionId")]
        session_id: String,
        role: Role,
        #[serde(default)]
        content: String,
    },

    #[serde(rename = "session.idle")]
    SessionIdle {
        #[serde(alias = "sessionId")]
        session_id: String,
    },

    #[serde(rename = "session.deleted")]
    SessionDeleted {
        #[serde(alias = "sessionId")]
        session_id: String,
    },
}

impl PluginEvent {
    pub fn session_id(&self) -> &str {
        match self {
            PluginEvent::SessionCreated { session_id }
            | PluginEvent::Message { session_id, .. }
            | PluginEvent::SessionIdle { session_id }
            | PluginEvent::SessionDeleted { session_id } => session_id,
        }
    }
}

impl HookRunner {
    /// Dispatch one event against a process-wide store.
    pub async fn handle_event(
        &self,
        store: &mut SessionStore,
        event: PluginEvent,
        now: DateTime<Utc>,
    ) -> HookOutput {
        match event {
            PluginEvent::SessionCreated { session_id } => {
                self.session_start(Some(&session_id)).await
            }
            PluginEvent::Message {
                session_id,
                role: Role::User,
                content,
            } => self.before_turn(store, &session_id, &content).await,
            PluginEvent::Message {
                session_id,
                role,
                content,
            } => {
                store.record_at(&session_id, role, &content, now);
                HookOutput::default()
            }
            PluginEvent::SessionIdle { session_id } | PluginEvent::SessionDeleted { session_id } => {
                debug!("Flushing session {}", session_id);
                self.session_end(store, &session_id, now).await
            }
        }
    }
}
