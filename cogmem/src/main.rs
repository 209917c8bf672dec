//! cogmem - Cognee memory for coding assistants
//!
//! Hooks the assistant's session lifecycle into a Cognee knowledge-graph
//! memory: memories are injected at session start and before turns, and
//! session transcripts are saved when a session ends.

use anyhow::Result;
use clap::Parser;
use cogmem_core::{Config, MemoryClient};
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod cli;
mod commands;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Stdout carries the hook protocol; diagnostics go to stderr only.
    let level = if cli.verbose { "debug" } else { "warn" };
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) if !cli.verbose => filter,
        _ => EnvFilter::new(format!("cogmem={level},cogmem_core={level}")),
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if let Commands::Config(cmd) = cli.command {
        return commands::config::execute(cmd);
    }

    // Loading creates a missing file, so check for it first
    let config_found = Config::config_path().exists();
    let config = Arc::new(load_config());
    let client = Arc::new(MemoryClient::new(&config)?);

    match cli.command {
        Commands::Hook(cmd) => commands::hook::execute(cmd, client, config).await,
        Commands::Events => commands::events::execute(client, config).await,
        Commands::Tool(cmd) => commands::tool::execute(cmd, client, config).await,
        Commands::Mcp => commands::mcp::execute(client, config).await,
        Commands::Doctor => commands::doctor::execute(&client, &config, config_found).await,
        Commands::Config(_) => Ok(()),
    }
}

/// Load configuration, falling back to defaults so hooks never fail on a
/// broken config file.
fn load_config() -> Config {
    match Config::load() {
        Ok(config) => config,
        Err(e) => {
            warn!("Using default configuration: {}", e);
            let mut config = Config::default();
            config.apply_env_overrides(|key| std::env::var(key).ok());
            config
        }
    }
}
