//! Host-facing hook input and output documents.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Event object read from the host on stdin.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HookInput {
    #[serde(default)]
    pub session_id: Option<String>,
    /// Why the session started (startup, resume, clear, ...)
    #[serde(default)]
    pub source: Option<String>,
    /// Why the session ended (exit, logout, clear, ...)
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub transcript_path: Option<PathBuf>,
    #[serde(default)]
    pub hook_event_name: Option<String>,
    #[serde(default)]
    pub cwd: Option<String>,
}

impl HookInput {
    /// Session id, or a placeholder when the host omitted it
    pub fn session_id(&self) -> &str {
        self.session_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or("default")
    }
}

/// Lifecycle event a hook answers for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HookEvent {
    SessionStart,
    UserPromptSubmit,
}

/// Context injected into the assistant for this event
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HookSpecificOutput {
    pub hook_event_name: HookEvent,
    pub additional_context: String,
}

/// Response object written to stdout.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HookOutput {
    /// Status line shown to the user
    #[serde(rename = "systemMessage", skip_serializing_if = "Option::is_none")]
    pub system_message: Option<String>,
    #[serde(rename = "hookSpecificOutput", skip_serializing_if = "Option::is_none")]
    pub hook_specific_output: Option<HookSpecificOutput>,
}

impl HookOutput {
    /// Status message only
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            system_message: Some(message.into()),
            hook_specific_output: None,
        }
    }

    /// Injected context plus an optional status message
    pub fn context(event: HookEvent, context: String, message: Option<String>) -> Self {
        Self {
            system_message: message,
            hook_specific_output: Some(HookSpecificOutput {
                hook_event_name: event,
                additional_context: context,
            }),
        }
    }

    pub fn additional_context(&self) -> Option<&str> {
        self.hook_specific_output
            .as_ref()
            .map(|o| o.additional_context.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.system_message.is_none() && self.hook_specific_output.is_none()
    }
}
