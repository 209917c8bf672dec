//! Normalization of search responses.
//!
//! The search endpoint answers with one of several shapes depending on the
//! search type and service version:
//!
//! - a bare JSON array of results
//! - an object wrapping the array: `{"results": [...]}`
//! - a single string (completion-style search types)
//!
//! Array items are strings, `{content|text, ...}` objects, or per-dataset
//! envelopes `{search_result, dataset_id, dataset_name}`. Everything is
//! flattened into an ordered list of [`SearchResult`]. Nested wrappers are
//! unwrapped one level deep; anything deeper is kept as JSON text.

use serde::Deserialize;
use serde_json::Value;

use crate::types::{Metadata, SearchResult};

/// Top-level shape of a search response.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SearchPayload {
    Items(Vec<Value>),
    Wrapped { results: Vec<Value> },
    Text(String),
    Other(Value),
}

impl SearchPayload {
    /// Flatten the payload into ordered results.
    pub fn into_results(self) -> Vec<SearchResult> {
        match self {
            SearchPayload::Items(items) | SearchPayload::Wrapped { results: items } => {
                items.into_iter().flat_map(|v| normalize_item(v, 1)).collect()
            }
            SearchPayload::Text(text) => text_result(text, None).into_iter().collect(),
            SearchPayload::Other(value) => normalize_item(value, 1),
        }
    }
}

/// Decode and flatten a raw JSON response.
pub fn normalize(value: Value) -> Vec<SearchResult> {
    match serde_json::from_value::<SearchPayload>(value) {
        Ok(payload) => payload.into_results(),
        // Every JSON value fits `Other`, so this only guards against serde changes
        Err(_) => Vec::new(),
    }
}

fn text_result(text: String, metadata: Option<Metadata>) -> Option<SearchResult> {
    if text.trim().is_empty() {
        return None;
    }
    Some(SearchResult {
        content: text,
        metadata,
    })
}

fn normalize_item(value: Value, depth: u8) -> Vec<SearchResult> {
    match value {
        Value::Null => Vec::new(),
        Value::String(s) => text_result(s, None).into_iter().collect(),
        Value::Bool(_) | Value::Number(_) => vec![SearchResult::text(value.to_string())],
        Value::Array(items) if depth > 0 => items
            .into_iter()
            .flat_map(|v| normalize_item(v, depth - 1))
            .collect(),
        Value::Array(_) => vec![SearchResult::text(value.to_string())],
        Value::Object(map) => normalize_object(map, depth),
    }
}

fn normalize_object(mut map: Metadata, depth: u8) -> Vec<SearchResult> {
    if depth > 0 {
        if let Some(Value::Array(_)) = map.get("results") {
            if let Some(Value::Array(items)) = map.remove("results") {
                return items
                    .into_iter()
                    .flat_map(|v| normalize_item(v, depth - 1))
                    .collect();
            }
        }

        if let Some(inner) = map.remove("search_result") {
            // Remaining envelope fields describe the dataset the hits came from
            let inherited = map;
            let hits = match inner {
                Value::Array(items) => items
                    .into_iter()
                    .flat_map(|v| normalize_item(v, depth - 1))
                    .collect::<Vec<_>>(),
                other => normalize_item(other, depth - 1),
            };
            return hits
                .into_iter()
                .map(|r| with_inherited(r, &inherited))
                .collect();
        }
    }

    let content = map.remove("content").or_else(|| map.remove("text"));
    match content {
        Some(content) => {
            let content = match content {
                Value::String(s) => s,
                other => other.to_string(),
            };

            if let Some(Value::Object(nested)) = map.remove("metadata") {
                for (k, v) in nested {
                    map.entry(k).or_insert(v);
                }
            }

            let metadata = if map.is_empty() { None } else { Some(map) };
            text_result(content, metadata).into_iter().collect()
        }
        None => vec![SearchResult::text(Value::Object(map).to_string())],
    }
}

fn with_inherited(mut result: SearchResult, inherited: &Metadata) -> SearchResult {
    if inherited.is_empty() {
        return result;
    }
    let metadata = result.metadata.get_or_insert_with(Metadata::new);
    for (k, v) in inherited {
        metadata.entry(k.clone()).or_insert_with(|| v.clone());
    }
    result
}
