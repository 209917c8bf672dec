//! Rendering of memories and instructions into assistant context.

use crate::types::SearchResult;

/// Fixed query used to prime a new session
pub const BOOTSTRAP_QUERY: &str = "recent user preferences decisions learnings";

/// Injected when a prompt asks the assistant to remember something.
pub const TRIGGER_INSTRUCTIONS: &str = "<memory_trigger>
The user's message contains something worth remembering across sessions.
Call the `cognee` tool with action \"add\" and store a concise, self-contained
statement of the fact, preference or decision (include tags if they help, e.g.
\"preferences, tooling\"). Do this in addition to answering the message.
</memory_trigger>";

/// Longest single memory rendered into context
const MAX_MEMORY_CHARS: usize = 1500;

/// Truncate to `max` characters, marking the cut with "...".
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max).collect();
    out.push_str("...");
    out
}

/// Render results into a `<remembered_context>` block.
///
/// Results below `threshold` (when the service reports a score) are
/// skipped and at most `max` entries are kept. Returns `None` when nothing
/// is left to inject.
pub fn render_memories(results: &[SearchResult], max: usize, threshold: f64) -> Option<String> {
    let kept: Vec<&SearchResult> = results
        .iter()
        .filter(|r| r.score().is_none_or(|s| s >= threshold))
        .filter(|r| !r.content.trim().is_empty())
        .take(max)
        .collect();

    if kept.is_empty() {
        return None;
    }

    let body = kept
        .iter()
        .enumerate()
        .map(|(i, r)| format!("[{}] {}", i + 1, truncate(r.content.trim(), MAX_MEMORY_CHARS)))
        .collect::<Vec<_>>()
        .join("\n---\n");

    Some(format!(
        "<remembered_context>\nRelevant memories from previous sessions:\n\n{}\n</remembered_context>",
        body
    ))
}

/// Number of entries `render_memories` would keep.
pub fn count_rendered(results: &[SearchResult], max: usize, threshold: f64) -> usize {
    results
        .iter()
        .filter(|r| r.score().is_none_or(|s| s >= threshold))
        .filter(|r| !r.content.trim().is_empty())
        .take(max)
        .count()
}
