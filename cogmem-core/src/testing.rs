//! Test doubles shared by the hook and tool tests.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::client::MemoryService;
use crate::error::{Error, Result};
use crate::types::{CognifyOptions, Dataset, SearchRequest, SearchResult, SearchType};

/// A call observed by [`FakeMemoryService`]
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Health,
    Add {
        content: String,
        dataset: String,
        tags: Vec<String>,
    },
    Cognify {
        dataset: String,
        options: CognifyOptions,
    },
    Search {
        query: String,
        search_type: SearchType,
        top_k: u32,
        session_id: Option<String>,
    },
    ListDatasets,
}

/// How a failing fake fails
#[derive(Debug, Clone, Copy)]
pub enum Failure {
    Unavailable,
    Status(u16),
}

impl Failure {
    fn to_error(self) -> Error {
        match self {
            Failure::Unavailable => Error::service_unavailable("connection refused"),
            Failure::Status(status) => Error::service(status, "boom"),
        }
    }
}

#[derive(Debug, Default)]
struct FakeState {
    unhealthy: bool,
    failure: Option<Failure>,
    results: Vec<SearchResult>,
    datasets: Vec<Dataset>,
    calls: Vec<Call>,
}

/// In-process [`MemoryService`] that records every call.
#[derive(Debug, Default)]
pub struct FakeMemoryService {
    state: Mutex<FakeState>,
}

impl FakeMemoryService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Healthy service answering every search with `results`
    pub fn with_results(results: Vec<SearchResult>) -> Self {
        let fake = Self::new();
        fake.state.lock().unwrap().results = results;
        fake
    }

    /// Health fails and every operation is unavailable
    pub fn unreachable() -> Self {
        let fake = Self::new();
        {
            let mut state = fake.state.lock().unwrap();
            state.unhealthy = true;
            state.failure = Some(Failure::Unavailable);
        }
        fake
    }

    /// Health passes but every operation fails
    pub fn failing(failure: Failure) -> Self {
        let fake = Self::new();
        fake.state.lock().unwrap().failure = Some(failure);
        fake
    }

    pub fn set_datasets(&self, datasets: Vec<Dataset>) {
        self.state.lock().unwrap().datasets = datasets;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Calls other than health checks
    pub fn remote_calls(&self) -> Vec<Call> {
        self.calls().into_iter().filter(|c| *c != Call::Health).collect()
    }

    fn record(&self, call: Call) -> Option<Failure> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        state.failure
    }
}

#[async_trait]
impl MemoryService for FakeMemoryService {
    async fn health_check(&self) -> bool {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Health);
        !state.unhealthy
    }

    async fn add_memory(&self, content: &str, dataset: &str, tags: &[String]) -> Result<()> {
        if content.trim().is_empty() {
            return Err(Error::invalid_input("content must not be empty"));
        }
        let call = Call::Add {
            content: content.to_string(),
            dataset: dataset.to_string(),
            tags: tags.to_vec(),
        };
        match self.record(call) {
            Some(f) => Err(f.to_error()),
            None => Ok(()),
        }
    }

    async fn cognify(&self, dataset: &str, options: CognifyOptions) -> Result<()> {
        let call = Call::Cognify {
            dataset: dataset.to_string(),
            options,
        };
        match self.record(call) {
            Some(f) => Err(f.to_error()),
            None => Ok(()),
        }
    }

    async fn search_memories(&self, request: &SearchRequest) -> Result<Vec<SearchResult>> {
        if request.query.trim().is_empty() {
            return Err(Error::invalid_input("query must not be empty"));
        }
        let call = Call::Search {
            query: request.query.clone(),
            search_type: request.search_type,
            top_k: request.top_k,
            session_id: request.session_id.clone(),
        };
        match self.record(call) {
            Some(f) => Err(f.to_error()),
            None => Ok(self.state.lock().unwrap().results.clone()),
        }
    }

    async fn list_datasets(&self) -> Result<Vec<Dataset>> {
        match self.record(Call::ListDatasets) {
            Some(f) => Err(f.to_error()),
            None => Ok(self.state.lock().unwrap().datasets.clone()),
        }
    }
}

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn spawn_server(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}
