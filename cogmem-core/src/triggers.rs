//! Detection of "remember this" style prompts.
//!
//! Keyword patterns are only matched against prose: fenced code blocks and
//! inline code spans are removed first, so pasted code that happens to
//! contain `remember` does not fire the trigger.

use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;
use tracing::warn;

/// Fenced block; an unclosed fence runs to the end of the text
static FENCED_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```.*?(?:```|\z)").expect("valid fenced code regex")
});

/// Inline span delimited by one or more backticks, e.g. `x` or ``x``
static INLINE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`+[^`\n]+?`+").expect("valid inline code regex"));

/// Remove fenced and inline code spans.
pub fn strip_code(text: &str) -> String {
    let without_fences = FENCED_CODE.replace_all(text, " ");
    INLINE_CODE.replace_all(&without_fences, " ").into_owned()
}

/// Compiled keyword patterns.
#[derive(Debug, Clone)]
pub struct TriggerMatcher {
    patterns: Vec<Regex>,
}

impl TriggerMatcher {
    /// Compile case-insensitive patterns. Invalid ones are skipped.
    pub fn from_patterns(patterns: &[String]) -> Self {
        let patterns = patterns
            .iter()
            .filter_map(|p| match RegexBuilder::new(p).case_insensitive(true).build() {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!("Skipping invalid keyword pattern {:?}: {}", p, e);
                    None
                }
            })
            .collect();
        Self { patterns }
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// True if any pattern matches the text outside code spans.
    pub fn matches(&self, text: &str) -> bool {
        if self.patterns.is_empty() {
            return false;
        }
        let prose = strip_code(text);
        self.patterns.iter().any(|re| re.is_match(&prose))
    }
}
