//! MCP server exposing the memory tool over stdio.
//!
//! A single `cognee` tool takes the same arguments as the tool command and
//! always answers with a JSON envelope, failures included.

use anyhow::Result;
use cogmem_core::tools::{Tags, ToolHandler, ToolRequest};
use cogmem_core::{Config, MemoryService};
use rmcp::{
    handler::server::{router::tool::ToolRouter, tool::ToolCallContext, wrapper::Parameters},
    model::{
        CallToolRequestParam, CallToolResult, ListToolsResult, PaginatedRequestParam,
        ServerCapabilities, ServerInfo,
    },
    tool, tool_router,
    transport::stdio,
    ErrorData, RoleServer, ServerHandler, ServiceExt,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

pub async fn execute(service: Arc<dyn MemoryService>, config: Arc<Config>) -> Result<()> {
    info!("Starting MCP server on stdio ({})", config.service_url);
    let server = McpServer::new(Arc::new(ToolHandler::new(service, config)));
    let running = server.serve(stdio()).await?;
    running.waiting().await?;
    Ok(())
}

/// Memory MCP server
#[derive(Clone)]
pub struct McpServer {
    handler: Arc<ToolHandler>,
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    pub fn new(handler: Arc<ToolHandler>) -> Self {
        Self {
            handler,
            tool_router: Self::tool_router(),
        }
    }
}

/// Parameters for the cognee tool
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
struct CogneeParams {
    /// Action to run: help, search, timeline, add, list
    action: String,
    /// Search query (search, timeline)
    #[serde(skip_serializing_if = "Option::is_none")]
    query: Option<String>,
    /// Search type for search, e.g. GRAPH_COMPLETION, CHUNKS, TEMPORAL
    #[serde(rename = "searchType", skip_serializing_if = "Option::is_none")]
    search_type: Option<String>,
    /// Maximum number of results for search (default 10)
    #[serde(rename = "topK", skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    /// Memory content (add)
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    /// Tags for add, comma-separated or a list
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<serde_json::Value>,
}

impl From<CogneeParams> for ToolRequest {
    fn from(params: CogneeParams) -> Self {
        ToolRequest {
            action: params.action,
            query: params.query,
            search_type: params.search_type,
            top_k: params.top_k,
            content: params.content,
            tags: params.tags.and_then(|v| serde_json::from_value::<Tags>(v).ok()),
        }
    }
}

#[tool_router]
impl McpServer {
    /// Long-term memory across coding sessions
    #[tool(description = "Long-term memory across coding sessions. Actions: help (usage guide), search (query, searchType?, topK?), timeline (query), add (content, tags?), list (datasets). Store user preferences, decisions and learnings with add; look them up with search.")]
    async fn cognee(&self, Parameters(params): Parameters<CogneeParams>) -> String {
        let request = ToolRequest::from(params);
        debug!("cognee: action {}", request.action);
        self.handler.handle(request).await.to_string()
    }
}

impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Cognee memory - search and store long-term memories for this user.".to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, ErrorData>> + Send + '_ {
        async move {
            Ok(ListToolsResult {
                tools: self.tool_router.list_all(),
                next_cursor: None,
            })
        }
    }

    fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: rmcp::service::RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, ErrorData>> + Send + '_ {
        debug!("Calling tool: {}", request.name);
        async move {
            let tool_context = ToolCallContext::new(self, request, context);
            self.tool_router.call(tool_context).await
        }
    }
}
