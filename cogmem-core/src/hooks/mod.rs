//! Lifecycle hook handlers.
//!
//! Three entry points driven by the host:
//!
//! - **session start**: check the service, inject bootstrap memories
//! - **before turn**: flag "remember this" prompts, inject memories related
//!   to the prompt
//! - **session end / idle**: upload the transcript as a dated session record
//!   and cognify it temporally
//!
//! Memory is a best-effort enhancement. Every failure is logged and turned
//! into a status message; no handler returns an error to the host.

mod events;
mod io;

pub use events::PluginEvent;
pub use io::{HookEvent, HookInput, HookOutput, HookSpecificOutput};

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::client::MemoryService;
use crate::config::{Config, InjectionFrequency};
use crate::context::{self, BOOTSTRAP_QUERY, TRIGGER_INSTRUCTIONS};
use crate::session::transcript::{read_transcript, render_session_record, session_tags};
use crate::session::{Role, SessionMessage, SessionStore};
use crate::triggers::TriggerMatcher;
use crate::types::{CognifyOptions, SearchRequest};

/// Hook entry point selected by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    SessionStart,
    BeforeTurn,
    SessionEnd,
}

/// Runs hooks against a memory service.
pub struct HookRunner {
    service: Arc<dyn MemoryService>,
    config: Arc<Config>,
    triggers: TriggerMatcher,
}

impl HookRunner {
    pub fn new(service: Arc<dyn MemoryService>, config: Arc<Config>) -> Self {
        let triggers = TriggerMatcher::from_patterns(&config.keyword_patterns);
        Self {
            service,
            config,
            triggers,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Session start: health check, then bootstrap memories.
    pub async fn session_start(&self, session_id: Option<&str>) -> HookOutput {
        if !self.service.health_check().await {
            warn!("Memory service unreachable at {}", self.config.service_url);
            return HookOutput::message(format!(
                "⚠️ Cognee memory unavailable at {}; continuing without memories",
                self.config.service_url
            ));
        }

        match self.search_context(BOOTSTRAP_QUERY, session_id).await {
            Some((block, count)) => HookOutput::context(
                HookEvent::SessionStart,
                block,
                Some(format!("🧠 Loaded {} memories from Cognee", count)),
            ),
            None => HookOutput::message("🧠 Cognee memory connected"),
        }
    }

    /// Before a user turn: trigger detection and prompt-based injection.
    ///
    /// The prompt is recorded in `store`. The search runs on every turn or
    /// only for the first user message, per `injection.frequency`.
    pub async fn before_turn(
        &self,
        store: &mut SessionStore,
        session_id: &str,
        prompt: &str,
    ) -> HookOutput {
        let first_message = !store.is_retired(session_id)
            && store
                .get(session_id)
                .is_none_or(|s| s.user_message_count() == 0);
        store.record(session_id, Role::User, prompt);

        let mut sections: Vec<String> = Vec::new();
        if self.triggers.matches(prompt) {
            debug!("Memory trigger matched in session {}", session_id);
            sections.push(TRIGGER_INSTRUCTIONS.to_string());
        }

        let inject = match self.config.injection.frequency {
            InjectionFrequency::EveryTurn => true,
            InjectionFrequency::FirstMessage => first_message,
        };

        let mut injected = 0;
        if inject && !prompt.trim().is_empty() {
            if let Some((block, count)) = self.search_context(prompt, Some(session_id)).await {
                sections.push(block);
                injected = count;
            }
        }

        if sections.is_empty() {
            return HookOutput::default();
        }

        let message = (injected > 0).then(|| format!("🧠 Injected {} memories", injected));
        HookOutput::context(HookEvent::UserPromptSubmit, sections.join("\n\n"), message)
    }

    /// Session end or idle: upload the transcript and cognify it.
    ///
    /// The session is removed from `store` whatever the outcome; a failed
    /// save is not retried.
    pub async fn session_end(
        &self,
        store: &mut SessionStore,
        session_id: &str,
        now: DateTime<Utc>,
    ) -> HookOutput {
        let Some(state) = store.remove(session_id) else {
            debug!("No transcript held for session {}", session_id);
            return HookOutput::default();
        };
        if state.is_empty() {
            return HookOutput::default();
        }

        let document = render_session_record(session_id, &state, &self.config.transcript, now);
        let tags = session_tags(now.date_naive());
        let dataset = &self.config.dataset_name;

        let saved = async {
            self.service.add_memory(&document, dataset, &tags).await?;
            self.service.cognify(dataset, CognifyOptions::temporal()).await
        }
        .await;

        match saved {
            Ok(()) => {
                info!(
                    "Saved session {} ({} messages) to dataset {}",
                    session_id,
                    state.messages.len(),
                    dataset
                );
                HookOutput::message(format!(
                    "💾 Session saved to Cognee memory ({} messages)",
                    state.messages.len()
                ))
            }
            Err(e) if e.is_unavailable() => {
                warn!("Session {} not saved: {}", session_id, e);
                HookOutput::message("⚠️ Session not saved: Cognee memory unavailable")
            }
            Err(e) => {
                warn!("Session {} not saved: {}", session_id, e);
                HookOutput::message(format!("⚠️ Session not saved: {}", e))
            }
        }
    }

    /// Flush every session still held in `store`.
    pub async fn flush_all(
        &self,
        store: &mut SessionStore,
        now: DateTime<Utc>,
    ) -> Vec<(String, HookOutput)> {
        let mut outputs = Vec::new();
        for id in store.active_ids() {
            let output = self.session_end(store, &id, now).await;
            outputs.push((id, output));
        }
        outputs
    }

    /// Run one hook for a short-lived host process.
    ///
    /// Each call starts from an empty store; the host transcript file, when
    /// given, supplies the messages that came before this event.
    pub async fn handle_stateless(&self, kind: HookKind, input: &HookInput) -> HookOutput {
        let session_id = input.session_id();
        match kind {
            HookKind::SessionStart => {
                debug!("Session start ({:?})", input.source);
                self.session_start(Some(session_id)).await
            }
            HookKind::BeforeTurn => {
                let prompt = input.prompt.as_deref().unwrap_or_default();
                let mut store = SessionStore::new();
                seed_store(&mut store, session_id, load_transcript(input), Some(prompt));
                self.before_turn(&mut store, session_id, prompt).await
            }
            HookKind::SessionEnd => {
                debug!("Session end ({:?})", input.reason);
                let mut store = SessionStore::new();
                seed_store(&mut store, session_id, load_transcript(input), None);
                self.session_end(&mut store, session_id, Utc::now()).await
            }
        }
    }

    /// Search and render; any failure means "no memories this turn".
    async fn search_context(&self, query: &str, session_id: Option<&str>) -> Option<(String, usize)> {
        let injection = &self.config.injection;
        let mut request = SearchRequest::new(query, injection.search_type, injection.top_k)
            .with_timeout(self.config.search_timeout());
        if let Some(id) = session_id {
            request = request.with_session(id);
        }

        let results = match self.service.search_memories(&request).await {
            Ok(results) => results,
            Err(e) => {
                warn!("Memory search skipped: {}", e);
                return None;
            }
        };

        let max = self.config.max_memories;
        let threshold = self.config.similarity_threshold;
        context::render_memories(&results, max, threshold)
            .map(|block| (block, context::count_rendered(&results, max, threshold)))
    }
}

fn load_transcript(input: &HookInput) -> Vec<SessionMessage> {
    let Some(path) = input.transcript_path.as_deref() else {
        return Vec::new();
    };
    match read_transcript(path) {
        Ok(messages) => messages,
        Err(e) => {
            debug!("Transcript {} unreadable: {}", path.display(), e);
            Vec::new()
        }
    }
}

/// Fill a fresh store with earlier messages of the session.
///
/// When `current_prompt` is given and the host already appended it to the
/// transcript, that trailing entry is dropped so it is not counted twice.
fn seed_store(
    store: &mut SessionStore,
    session_id: &str,
    mut messages: Vec<SessionMessage>,
    current_prompt: Option<&str>,
) {
    if let (Some(prompt), Some(last)) = (current_prompt, messages.last()) {
        if last.role == Role::User && last.content.trim() == prompt.trim() {
            messages.pop();
        }
    }
    for m in messages {
        store.record_at(session_id, m.role, &m.content, m.timestamp);
    }
}
