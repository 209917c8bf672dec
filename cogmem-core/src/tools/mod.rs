//! Assistant-invokable memory actions.
//!
//! [`ToolHandler::handle`] always returns a JSON envelope. Failures come back
//! as `{"success": false, "error": ...}` rather than as an `Err`, so the
//! assistant can read them.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::client::MemoryService;
use crate::config::Config;
use crate::context::truncate;
use crate::error::{Error, Result};
use crate::types::{CognifyOptions, SearchRequest, SearchType};

/// Valid values of `action`
pub const ACTIONS: [&str; 5] = ["help", "search", "timeline", "add", "list"];

const SEARCH_TOP_K: u32 = 10;
const TIMELINE_TOP_K: u32 = 15;
const PREVIEW_CHARS: usize = 100;
const DEFAULT_TAG: &str = "user_memories";

/// Tags as given by the caller: `"a, b"` or `["a", "b"]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Tags {
    List(Vec<String>),
    Csv(String),
}

impl Tags {
    /// Trimmed, non-empty tags in order, without duplicates.
    pub fn parse(&self) -> Vec<String> {
        let raw: Vec<&str> = match self {
            Tags::List(items) => items.iter().map(String::as_str).collect(),
            Tags::Csv(s) => s.split(',').collect(),
        };
        let mut tags: Vec<String> = Vec::new();
        for tag in raw.into_iter().map(str::trim).filter(|t| !t.is_empty()) {
            if !tags.iter().any(|t| t == tag) {
                tags.push(tag.to_string());
            }
        }
        tags
    }
}

/// One tool call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolRequest {
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
}

impl ToolRequest {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            ..Default::default()
        }
    }
}

/// Runs tool actions against a memory service.
pub struct ToolHandler {
    service: Arc<dyn MemoryService>,
    config: Arc<Config>,
}

impl ToolHandler {
    pub fn new(service: Arc<dyn MemoryService>, config: Arc<Config>) -> Self {
        Self { service, config }
    }

    /// Run one action. Never fails; errors are folded into the envelope.
    pub async fn handle(&self, request: ToolRequest) -> Value {
        let action = request.action.trim().to_lowercase();
        debug!("Tool action: {}", action);

        let result = match action.as_str() {
            "help" => Ok(help()),
            "search" => self.search(&request).await,
            "timeline" => self.timeline(&request).await,
            "add" => self.add(&request).await,
            "list" => self.list().await,
            _ => {
                return json!({
                    "success": false,
                    "error": format!("Unknown action: {:?}", request.action),
                    "hint": format!("Valid actions: {}", ACTIONS.join(", ")),
                });
            }
        };

        result.unwrap_or_else(|e| self.failure(&e))
    }

    async fn search(&self, request: &ToolRequest) -> Result<Value> {
        let query = required(request.query.as_deref(), "query")?;
        let search_type = match request.search_type.as_deref() {
            Some(s) => s.parse::<SearchType>().map_err(Error::InvalidInput)?,
            None => SearchType::GraphCompletion,
        };
        let top_k = match request.top_k {
            Some(0) => return Err(Error::invalid_input("topK must be positive")),
            Some(k) => k,
            None => SEARCH_TOP_K,
        };
        self.run_search(query, search_type, top_k).await
    }

    async fn timeline(&self, request: &ToolRequest) -> Result<Value> {
        let query = required(request.query.as_deref(), "query")?;
        self.run_search(query, SearchType::Temporal, TIMELINE_TOP_K).await
    }

    async fn run_search(&self, query: &str, search_type: SearchType, top_k: u32) -> Result<Value> {
        let request = SearchRequest::new(query, search_type, top_k)
            .with_timeout(self.config.search_timeout());
        let results = self.service.search_memories(&request).await?;

        if results.is_empty() {
            return Ok(json!({
                "success": true,
                "query": query,
                "searchType": search_type,
                "count": 0,
                "results": [],
                "message": "No memories found",
            }));
        }

        Ok(json!({
            "success": true,
            "query": query,
            "searchType": search_type,
            "count": results.len(),
            "results": results,
        }))
    }

    async fn add(&self, request: &ToolRequest) -> Result<Value> {
        let content = required(request.content.as_deref(), "content")?;
        let mut tags = request.tags.as_ref().map(Tags::parse).unwrap_or_default();
        if tags.is_empty() {
            tags.push(DEFAULT_TAG.to_string());
        }

        let dataset = &self.config.dataset_name;
        self.service.add_memory(content, dataset, &tags).await?;

        let options = CognifyOptions {
            use_custom_ontology: self.config.ontology.file.is_some(),
            ..Default::default()
        };
        self.service.cognify(dataset, options).await?;

        Ok(json!({
            "success": true,
            "message": "Memory stored",
            "dataset": dataset,
            "tags": tags,
            "preview": truncate(content, PREVIEW_CHARS),
        }))
    }

    async fn list(&self) -> Result<Value> {
        let datasets = self.service.list_datasets().await?;
        if datasets.is_empty() {
            return Ok(json!({
                "success": true,
                "count": 0,
                "datasets": [],
                "message": "No datasets found",
            }));
        }
        Ok(json!({
            "success": true,
            "count": datasets.len(),
            "datasets": datasets,
        }))
    }

    fn failure(&self, error: &Error) -> Value {
        warn!("Tool action failed: {}", error);
        let mut out = json!({"success": false, "error": error.to_string()});
        if error.is_unavailable() {
            out["hint"] = json!(format!(
                "Is the Cognee service running at {}? Set serviceUrl in the config file or COGNEE_URL.",
                self.config.service_url
            ));
        }
        out
    }
}

fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(Error::invalid_input(format!("{} is required", field))),
    }
}

/// Static usage guide.
pub fn help() -> Value {
    json!({
        "success": true,
        "tool": "cognee",
        "description": "Long-term memory shared across coding sessions, backed by a Cognee knowledge graph.",
        "actions": {
            "help": {
                "description": "Show this guide",
            },
            "search": {
                "description": "Search memories",
                "params": {
                    "query": "required",
                    "searchType": format!("optional, default GRAPH_COMPLETION; one of {}",
                        SearchType::ALL.iter().map(|t| t.as_str()).collect::<Vec<_>>().join(", ")),
                    "topK": "optional, default 10",
                },
            },
            "timeline": {
                "description": "Search memories in time order (TEMPORAL, top 15)",
                "params": {"query": "required"},
            },
            "add": {
                "description": "Store a memory and rebuild the graph",
                "params": {
                    "content": "required",
                    "tags": "optional, comma-separated, default user_memories",
                },
            },
            "list": {
                "description": "List datasets",
            },
        },
        "examples": [
            {"action": "search", "query": "preferred test runner"},
            {"action": "timeline", "query": "database migration decisions"},
            {"action": "add", "content": "User prefers pnpm over npm", "tags": "preferences, tooling"},
            {"action": "list"},
        ],
    })
}
