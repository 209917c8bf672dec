//! Tool action command.

use anyhow::Result;
use cogmem_core::tools::{Tags, ToolHandler, ToolRequest};
use cogmem_core::{Config, MemoryService};
use std::sync::Arc;

use crate::cli::{ToolAction, ToolCommand};

pub async fn execute(
    cmd: ToolCommand,
    service: Arc<dyn MemoryService>,
    config: Arc<Config>,
) -> Result<()> {
    let handler = ToolHandler::new(service, config);
    let output = handler.handle(request(cmd.action)).await;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn request(action: ToolAction) -> ToolRequest {
    match action {
        ToolAction::Help => ToolRequest::new("help"),
        ToolAction::Search {
            query,
            search_type,
            top_k,
        } => ToolRequest {
            query: Some(query),
            search_type,
            top_k,
            ..ToolRequest::new("search")
        },
        ToolAction::Timeline { query } => ToolRequest {
            query: Some(query),
            ..ToolRequest::new("timeline")
        },
        ToolAction::Add { content, tags } => ToolRequest {
            content: Some(content),
            tags: tags.map(Tags::Csv),
            ..ToolRequest::new("add")
        },
        ToolAction::List => ToolRequest::new("list"),
    }
}
