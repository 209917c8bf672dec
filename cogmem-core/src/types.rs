//! Shared types for cogmem-core.
//!
//! These types are used by the memory client, the hook handlers and the
//! tool handler.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Free-form metadata attached to a search result.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

// ─────────────────────────────────────────────────────────────────────────────
// Search Types
// ─────────────────────────────────────────────────────────────────────────────

/// Strategy the memory service uses to answer a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SearchType {
    /// Graph reasoning over the knowledge graph
    #[default]
    GraphCompletion,
    RagCompletion,
    /// Raw chunk retrieval
    Chunks,
    Summaries,
    Insights,
    /// Time-aware retrieval over temporally cognified data
    Temporal,
    GraphCompletionCot,
    GraphCompletionContextExtension,
    Code,
    Cypher,
    NaturalLanguage,
    FeelingLucky,
    ChunksLexical,
}

impl SearchType {
    pub const ALL: [SearchType; 13] = [
        SearchType::GraphCompletion,
        SearchType::RagCompletion,
        SearchType::Chunks,
        SearchType::Summaries,
        SearchType::Insights,
        SearchType::Temporal,
        SearchType::GraphCompletionCot,
        SearchType::GraphCompletionContextExtension,
        SearchType::Code,
        SearchType::Cypher,
        SearchType::NaturalLanguage,
        SearchType::FeelingLucky,
        SearchType::ChunksLexical,
    ];

    /// Wire name of the search type
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchType::GraphCompletion => "GRAPH_COMPLETION",
            SearchType::RagCompletion => "RAG_COMPLETION",
            SearchType::Chunks => "CHUNKS",
            SearchType::Summaries => "SUMMARIES",
            SearchType::Insights => "INSIGHTS",
            SearchType::Temporal => "TEMPORAL",
            SearchType::GraphCompletionCot => "GRAPH_COMPLETION_COT",
            SearchType::GraphCompletionContextExtension => "GRAPH_COMPLETION_CONTEXT_EXTENSION",
            SearchType::Code => "CODE",
            SearchType::Cypher => "CYPHER",
            SearchType::NaturalLanguage => "NATURAL_LANGUAGE",
            SearchType::FeelingLucky => "FEELING_LUCKY",
            SearchType::ChunksLexical => "CHUNKS_LEXICAL",
        }
    }
}

impl std::fmt::Display for SearchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SearchType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        SearchType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| format!("Invalid search type: {}", s))
    }
}

/// One normalized search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl SearchResult {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: None,
        }
    }

    /// Relevance score reported by the service, when present
    pub fn score(&self) -> Option<f64> {
        self.metadata
            .as_ref()
            .and_then(|m| m.get("score"))
            .and_then(|v| v.as_f64())
    }
}

/// Parameters for a single search call.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: String,
    pub search_type: SearchType,
    pub top_k: u32,
    pub session_id: Option<String>,
    /// Client-side deadline, independent of any server timeout
    pub timeout: Duration,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, search_type: SearchType, top_k: u32) -> Self {
        Self {
            query: query.into(),
            search_type,
            top_k,
            session_id: None,
            timeout: Duration::from_millis(crate::config::DEFAULT_SEARCH_TIMEOUT_MS),
        }
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Dataset / Cognify Types
// ─────────────────────────────────────────────────────────────────────────────

/// Dataset descriptor returned by the service. Read-only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, alias = "ownerId", skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
}

/// Options for a cognify request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CognifyOptions {
    /// Send the configured ontology file along with the request
    pub use_custom_ontology: bool,
    /// Build a temporal graph
    pub temporal: bool,
}

impl CognifyOptions {
    pub fn temporal() -> Self {
        Self {
            temporal: true,
            ..Default::default()
        }
    }
}

/// Wire body for `POST /api/v1/cognify`.
#[derive(Debug, Clone, Serialize)]
pub struct CognifyBody {
    pub datasets: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temporal_cognify: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph_model_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph_model_name: Option<String>,
}

/// Wire body for `POST /api/v1/search`.
#[derive(Debug, Clone, Serialize)]
pub struct SearchBody<'a> {
    pub query: &'a str,
    pub search_type: SearchType,
    pub top_k: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<&'a str>,
}
