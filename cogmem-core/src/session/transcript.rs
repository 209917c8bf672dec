//! Host transcript parsing and session record rendering.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use std::path::Path;
use tracing::debug;

use super::{Role, SessionMessage, SessionState};
use crate::config::TranscriptConfig;
use crate::context::truncate;
use crate::error::Result;

/// Read a JSON Lines transcript written by the host.
pub fn read_transcript(path: &Path) -> Result<Vec<SessionMessage>> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_transcript(&content))
}

/// Parse a JSON Lines transcript.
///
/// Each line is either a host entry (`{"type": "user", "message": {"role",
/// "content"}, "timestamp"}`) or a flat `{"role", "content"}` object.
/// Content may be a string or a list of blocks, of which only `text` blocks
/// are kept. Lines that carry no user or assistant text are skipped.
pub fn parse_transcript(content: &str) -> Vec<SessionMessage> {
    let mut skipped = 0usize;
    let messages: Vec<SessionMessage> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let parsed = serde_json::from_str::<Value>(line)
                .ok()
                .and_then(|entry| parse_entry(&entry));
            if parsed.is_none() {
                skipped += 1;
            }
            parsed
        })
        .collect();

    if skipped > 0 {
        debug!("Skipped {} transcript lines without conversational text", skipped);
    }
    messages
}

fn parse_entry(entry: &Value) -> Option<SessionMessage> {
    if entry.get("isMeta").and_then(Value::as_bool) == Some(true) {
        return None;
    }

    let message = entry.get("message").unwrap_or(entry);
    let role = message
        .get("role")
        .or_else(|| entry.get("type"))
        .and_then(Value::as_str)
        .and_then(|r| r.parse::<Role>().ok())
        .filter(|r| *r != Role::System)?;

    let text = extract_text(message.get("content")?)?;

    let timestamp = entry
        .get("timestamp")
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now);

    Some(SessionMessage {
        role,
        content: text,
        timestamp,
    })
}

fn extract_text(content: &Value) -> Option<String> {
    let text = match content {
        Value::String(s) => s.clone(),
        Value::Array(blocks) => blocks
            .iter()
            .filter(|b| b.get("type").and_then(Value::as_str) == Some("text"))
            .filter_map(|b| b.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => return None,
    };

    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Tags attached to an uploaded session record.
pub fn session_tags(date: NaiveDate) -> Vec<String> {
    vec![
        "sessions".to_string(),
        "conversations".to_string(),
        format!("session_{}", date.format("%Y-%m-%d")),
    ]
}

/// Render the dated "Session Record" document for upload.
pub fn render_session_record(
    session_id: &str,
    state: &SessionState,
    limits: &TranscriptConfig,
    now: DateTime<Utc>,
) -> String {
    let total = state.messages.len();
    let skip = limits
        .max_messages
        .map(|max| total.saturating_sub(max))
        .unwrap_or(0);
    let shown = &state.messages[skip..];

    let mut doc = String::new();
    doc.push_str(&format!("# Session Record: {}\n\n", now.format("%Y-%m-%d")));
    doc.push_str(&format!("- Session: {}\n", session_id));
    doc.push_str(&format!("- Started: {}\n", state.start_time.to_rfc3339()));
    doc.push_str(&format!("- Ended: {}\n", now.to_rfc3339()));
    if skip > 0 {
        doc.push_str(&format!("- Messages: {} (last {} shown)\n", total, shown.len()));
    } else {
        doc.push_str(&format!("- Messages: {}\n", total));
    }
    doc.push_str("\n## Conversation\n");

    for message in shown {
        let content = match limits.max_chars_per_message {
            Some(max) => truncate(&message.content, max),
            None => message.content.clone(),
        };
        doc.push_str(&format!(
            "\n[{}] {} ({})\n",
            message.role,
            content,
            message.timestamp.format("%H:%M:%S")
        ));
    }

    doc
}
