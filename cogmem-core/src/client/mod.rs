//! HTTP client for the Cognee memory service.
//!
//! Wraps the four REST operations the integration needs (add, cognify,
//! search, list datasets) plus a health check, and normalizes every failure
//! into [`Error::ServiceUnavailable`] or [`Error::Service`].
//!
//! # Usage
//!
//! ```rust,no_run
//! use cogmem_core::client::{MemoryClient, MemoryService};
//! use cogmem_core::types::{SearchRequest, SearchType};
//! use cogmem_core::Config;
//!
//! #[tokio::main]
//! async fn main() -> cogmem_core::Result<()> {
//!     let client = MemoryClient::new(&Config::load()?)?;
//!     let request = SearchRequest::new("coding preferences", SearchType::GraphCompletion, 5);
//!     let _results = client.search_memories(&request).await?;
//!     Ok(())
//! }
//! ```

pub mod normalize;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::{Config, OntologyConfig, RetryPolicy};
use crate::error::{Error, Result};
use crate::types::{CognifyBody, CognifyOptions, Dataset, SearchBody, SearchRequest, SearchResult};

const HEALTH_PATH: &str = "/health";
const ADD_PATH: &str = "/api/v1/add";
const COGNIFY_PATH: &str = "/api/v1/cognify";
const SEARCH_PATH: &str = "/api/v1/search";
const DATASETS_PATH: &str = "/api/v1/datasets";

/// Operations the hooks and tools need from the memory service.
#[async_trait]
pub trait MemoryService: Send + Sync {
    /// Bounded-time availability check. Never fails.
    async fn health_check(&self) -> bool;

    /// Upload content to a dataset, labelled with node sets.
    async fn add_memory(&self, content: &str, dataset: &str, tags: &[String]) -> Result<()>;

    /// Start server-side graph construction. Returns once accepted.
    async fn cognify(&self, dataset: &str, options: CognifyOptions) -> Result<()>;

    /// Search with a client-side deadline.
    async fn search_memories(&self, request: &SearchRequest) -> Result<Vec<SearchResult>>;

    /// List datasets visible to the caller.
    async fn list_datasets(&self) -> Result<Vec<Dataset>>;
}

/// reqwest-backed [`MemoryService`].
#[derive(Clone)]
pub struct MemoryClient {
    /// Base URL without trailing slash
    base_url: String,
    /// Bearer token for authentication
    token: Option<String>,
    health_timeout: Duration,
    retry: RetryPolicy,
    ontology: OntologyConfig,
    /// HTTP client
    client: reqwest::Client,
}

impl MemoryClient {
    /// Create a new client from config.
    pub fn new(config: &Config) -> Result<Self> {
        // No global timeout: add and cognify wait as long as the host allows,
        // search and health set their own per-request deadlines.
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.base_url().to_string(),
            token: config.api_token.clone(),
            health_timeout: config.health_timeout(),
            retry: config.retry,
            ontology: config.ontology.clone(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ─────────────────────────────────────────────────────────────────────────
    // HTTP Helpers
    // ─────────────────────────────────────────────────────────────────────────

    /// Build request with auth headers.
    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!("Memory request: {} {}", method, url);

        let mut req = self.client.request(method, &url);
        if let Some(ref token) = self.token {
            req = req.bearer_auth(token);
        }
        req
    }

    /// Send once and turn non-2xx into [`Error::Service`].
    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        match self.retry {
            RetryPolicy::Never => {}
        }

        let resp = req.send().await?;
        let status = resp.status();
        if status.is_success() {
            Ok(resp)
        } else {
            let body = resp.text().await.unwrap_or_default();
            Err(Error::service(status.as_u16(), body))
        }
    }

    fn cognify_body(&self, dataset: &str, options: CognifyOptions) -> CognifyBody {
        let mut body = CognifyBody {
            datasets: vec![dataset.to_string()],
            temporal_cognify: options.temporal.then_some(true),
            graph_model_file: None,
            graph_model_name: None,
        };

        if options.use_custom_ontology {
            match &self.ontology.file {
                Some(file) => {
                    body.graph_model_file = Some(file.display().to_string());
                    body.graph_model_name = Some(self.ontology.model_name.clone());
                }
                None => warn!("Custom ontology requested but no ontology file is configured"),
            }
        }

        body
    }
}

#[async_trait]
impl MemoryService for MemoryClient {
    async fn health_check(&self) -> bool {
        let response = self
            .request(reqwest::Method::GET, HEALTH_PATH)
            .timeout(self.health_timeout)
            .send()
            .await;

        match response {
            Ok(r) => r.status().is_success(),
            Err(e) => {
                debug!("Health check failed: {}", e);
                false
            }
        }
    }

    async fn add_memory(&self, content: &str, dataset: &str, tags: &[String]) -> Result<()> {
        if content.trim().is_empty() {
            return Err(Error::invalid_input("content must not be empty"));
        }

        let part = Part::bytes(content.as_bytes().to_vec())
            .file_name("memory.txt")
            .mime_str("text/plain")?;

        let mut form = Form::new()
            .part("data", part)
            .text("datasetName", dataset.to_string());
        for tag in tags {
            form = form.text("node_set", tag.clone());
        }

        self.send(self.request(reqwest::Method::POST, ADD_PATH).multipart(form))
            .await?;

        debug!("Added {} bytes to dataset {} (tags: {:?})", content.len(), dataset, tags);
        Ok(())
    }

    async fn cognify(&self, dataset: &str, options: CognifyOptions) -> Result<()> {
        let body = self.cognify_body(dataset, options);
        self.send(self.request(reqwest::Method::POST, COGNIFY_PATH).json(&body))
            .await?;

        debug!("Cognify accepted for dataset {}", dataset);
        Ok(())
    }

    async fn search_memories(&self, request: &SearchRequest) -> Result<Vec<SearchResult>> {
        if request.query.trim().is_empty() {
            return Err(Error::invalid_input("query must not be empty"));
        }

        let body = SearchBody {
            query: &request.query,
            search_type: request.search_type,
            top_k: request.top_k,
            session_id: request.session_id.as_deref(),
        };

        let req = self
            .request(reqwest::Method::POST, SEARCH_PATH)
            .json(&body)
            .timeout(request.timeout);

        let text = self.send(req).await?.text().await?;

        // Completion search types may answer with plain text
        let value = serde_json::from_str(&text).unwrap_or(Value::String(text));
        let results = normalize::normalize(value);

        debug!(
            "Search ({}) returned {} results",
            request.search_type,
            results.len()
        );
        Ok(results)
    }

    async fn list_datasets(&self) -> Result<Vec<Dataset>> {
        let text = self
            .send(self.request(reqwest::Method::GET, DATASETS_PATH))
            .await?
            .text()
            .await?;
        let value = serde_json::from_str(&text).unwrap_or(Value::Null);

        let datasets = match value {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
            other => {
                debug!("Datasets endpoint returned a non-array payload: {}", other);
                Vec::new()
            }
        };

        Ok(datasets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::spawn_server as spawn;
    use crate::types::SearchType;
    use axum::{
        body::Bytes,
        extract::State,
        http::{HeaderMap, StatusCode},
        routing::{get, post},
        Json, Router,
    };
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use std::time::Instant;

    /// Requests seen by the test server: (path, content-type, authorization, body)
    #[derive(Clone, Default)]
    struct Recorder {
        seen: Arc<Mutex<Vec<(String, String, String, String)>>>,
    }

    impl Recorder {
        fn push(&self, path: &str, headers: &HeaderMap, body: &[u8]) {
            let header = |name: &str| {
                headers
                    .get(name)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string()
            };
            self.seen.lock().unwrap().push((
                path.to_string(),
                header("content-type"),
                header("authorization"),
                String::from_utf8_lossy(body).to_string(),
            ));
        }

        fn take(&self) -> Vec<(String, String, String, String)> {
            std::mem::take(&mut *self.seen.lock().unwrap())
        }
    }

    fn client_for(url: &str) -> MemoryClient {
        let config = Config {
            service_url: url.to_string(),
            api_token: Some("tok".into()),
            ..Config::default()
        };
        MemoryClient::new(&config).unwrap()
    }

    fn recording_router(recorder: Recorder) -> Router {
        async fn record(
            State(rec): State<Recorder>,
            uri: axum::http::Uri,
            headers: HeaderMap,
            body: Bytes,
        ) -> StatusCode {
            rec.push(uri.path(), &headers, &body);
            StatusCode::OK
        }

        Router::new()
            .route("/api/v1/add", post(record))
            .route("/api/v1/cognify", post(record))
            .with_state(recorder)
    }

    async fn unused_url() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_health_check() {
        let url = spawn(Router::new().route("/health", get(|| async { "ok" }))).await;
        assert!(client_for(&url).health_check().await);

        let url = spawn(Router::new().route(
            "/health",
            get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
        ))
        .await;
        assert!(!client_for(&url).health_check().await);

        assert!(!client_for(&unused_url().await).health_check().await);
    }

    #[tokio::test]
    async fn test_add_memory_sends_multipart_with_node_sets() {
        let recorder = Recorder::default();
        let url = spawn(recording_router(recorder.clone())).await;
        let client = client_for(&url);

        client
            .add_memory("prefers tabs", "team", &["a".into(), "b".into()])
            .await
            .unwrap();

        let seen = recorder.take();
        assert_eq!(seen.len(), 1);
        let (path, content_type, auth, body) = &seen[0];
        assert_eq!(path, "/api/v1/add");
        assert!(content_type.starts_with("multipart/form-data"));
        assert_eq!(auth, "Bearer tok");
        assert!(body.contains(r#"name="data"; filename="memory.txt""#));
        assert!(body.contains("prefers tabs"));
        assert!(body.contains(r#"name="datasetName""#));
        assert!(body.contains("team"));
        assert_eq!(body.matches(r#"name="node_set""#).count(), 2);
    }

    #[tokio::test]
    async fn test_add_memory_rejects_empty_content() {
        let recorder = Recorder::default();
        let url = spawn(recording_router(recorder.clone())).await;

        let err = client_for(&url).add_memory("  ", "team", &[]).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(recorder.take().is_empty());
    }

    #[tokio::test]
    async fn test_cognify_body() {
        let recorder = Recorder::default();
        let url = spawn(recording_router(recorder.clone())).await;

        client_for(&url)
            .cognify("team", CognifyOptions::temporal())
            .await
            .unwrap();
        client_for(&url)
            .cognify("team", CognifyOptions::default())
            .await
            .unwrap();

        let seen = recorder.take();
        let first: Value = serde_json::from_str(&seen[0].3).unwrap();
        assert_eq!(first, json!({"datasets": ["team"], "temporal_cognify": true}));
        let second: Value = serde_json::from_str(&seen[1].3).unwrap();
        assert_eq!(second, json!({"datasets": ["team"]}));
    }

    #[test]
    fn test_cognify_body_with_ontology() {
        let config = Config {
            ontology: OntologyConfig {
                file: Some("/etc/cognee/memory_ontology.py".into()),
                model_name: "MemoryItem".into(),
            },
            ..Config::default()
        };
        let client = MemoryClient::new(&config).unwrap();
        let body = client.cognify_body(
            "team",
            CognifyOptions {
                use_custom_ontology: true,
                temporal: false,
            },
        );

        assert_eq!(body.graph_model_file.as_deref(), Some("/etc/cognee/memory_ontology.py"));
        assert_eq!(body.graph_model_name.as_deref(), Some("MemoryItem"));
        assert_eq!(body.temporal_cognify, None);

        // Requested without a configured file: plain cognify
        let client = MemoryClient::new(&Config::default()).unwrap();
        let body = client.cognify_body(
            "team",
            CognifyOptions {
                use_custom_ontology: true,
                temporal: false,
            },
        );
        assert!(body.graph_model_file.is_none());
    }

    #[tokio::test]
    async fn test_non_success_is_service_error() {
        let url = spawn(Router::new().route(
            "/api/v1/cognify",
            post(|| async { (StatusCode::CONFLICT, "already running") }),
        ))
        .await;

        let err = client_for(&url)
            .cognify("team", CognifyOptions::default())
            .await
            .unwrap_err();
        match err {
            Error::Service { status, body } => {
                assert_eq!(status, 409);
                assert_eq!(body, "already running");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_connection_refused_is_unavailable() {
        let client = client_for(&unused_url().await);

        let err = client.add_memory("x", "team", &[]).await.unwrap_err();
        assert!(err.is_unavailable());

        let err = client
            .search_memories(&SearchRequest::new("x", SearchType::Chunks, 3))
            .await
            .unwrap_err();
        assert!(err.is_unavailable());
    }

    #[tokio::test]
    async fn test_search_sends_body_and_normalizes() {
        async fn search(Json(body): Json<Value>) -> Json<Value> {
            assert_eq!(body["query"], "editor");
            assert_eq!(body["search_type"], "CHUNKS");
            assert_eq!(body["top_k"], 4);
            assert_eq!(body["session_id"], "s1");
            Json(json!({"results": ["uses helix", {"content": "likes vim", "score": 0.8}]}))
        }
        let url = spawn(Router::new().route("/api/v1/search", post(search))).await;

        let request = SearchRequest::new("editor", SearchType::Chunks, 4).with_session("s1");
        let results = client_for(&url).search_memories(&request).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].content, "uses helix");
        assert_eq!(results[1].content, "likes vim");
        assert_eq!(results[1].score(), Some(0.8));
    }

    #[tokio::test]
    async fn test_search_plain_text_response() {
        let url = spawn(Router::new().route(
            "/api/v1/search",
            post(|| async { "The user prefers small commits." }),
        ))
        .await;

        let request = SearchRequest::new("commits", SearchType::GraphCompletion, 5);
        let results = client_for(&url).search_memories(&request).await.unwrap();
        assert_eq!(results, vec![SearchResult::text("The user prefers small commits.")]);
    }

    #[tokio::test]
    async fn test_search_timeout_is_unavailable() {
        let url = spawn(Router::new().route(
            "/api/v1/search",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Json(json!([]))
            }),
        ))
        .await;

        let request = SearchRequest::new("slow", SearchType::GraphCompletion, 5)
            .with_timeout(Duration::from_millis(200));

        let started = Instant::now();
        let err = client_for(&url).search_memories(&request).await.unwrap_err();

        assert!(err.is_unavailable(), "expected unavailable, got {:?}", err);
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_search_rejects_empty_query() {
        let client = client_for(&unused_url().await);
        let err = client
            .search_memories(&SearchRequest::new("", SearchType::Chunks, 3))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_list_datasets() {
        let url = spawn(Router::new().route(
            "/api/v1/datasets",
            get(|| async {
                Json(json!([
                    {"id": "1", "name": "main", "created_at": "2025-05-01T00:00:00Z"},
                    {"id": "2", "name": "sessions", "owner_id": "u1"}
                ]))
            }),
        ))
        .await;

        let datasets = client_for(&url).list_datasets().await.unwrap();
        assert_eq!(datasets.len(), 2);
        assert_eq!(datasets[0].name, "main");
        assert_eq!(datasets[1].owner_id.as_deref(), Some("u1"));
    }

    #[tokio::test]
    async fn test_list_datasets_non_array_is_empty() {
        let url = spawn(Router::new().route(
            "/api/v1/datasets",
            get(|| async { Json(json!({"detail": "nothing here"})) }),
        ))
        .await;

        let datasets = client_for(&url).list_datasets().await.unwrap();
        assert!(datasets.is_empty());
    }

    #[tokio::test]
    async fn test_list_datasets_non_json_is_empty() {
        let url = spawn(Router::new().route(
            "/api/v1/datasets",
            get(|| async { "<html>ok</html>" }),
        ))
        .await;

        let datasets = client_for(&url).list_datasets().await.unwrap();
        assert!(datasets.is_empty());
    }
}
