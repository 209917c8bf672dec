//! CLI argument definitions using clap derive macros.
//!
//! Command structure for the memory hooks and tools.

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Cognee memory for coding assistants
///
/// Lifecycle hooks, tool actions and an MCP server backed by a Cognee
/// knowledge-graph memory service.
#[derive(Parser, Debug)]
#[command(name = "cogmem")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a lifecycle hook (reads one JSON event on stdin)
    Hook(HookCommand),

    /// Process a stream of session events (NDJSON on stdin)
    Events,

    /// Run one memory tool action and print the result
    #[command(disable_help_subcommand = true)]
    Tool(ToolCommand),

    /// Serve the memory tool over MCP (stdio)
    Mcp,

    /// Configuration file management
    Config(ConfigCommand),

    /// Run diagnostics
    Doctor,
}

// ─────────────────────────────────────────────────────────────────────────────
// Hook Commands
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct HookCommand {
    #[arg(value_enum)]
    pub kind: HookName,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum HookName {
    /// Check the service and load bootstrap memories
    SessionStart,
    /// Detect memory triggers and inject related memories
    BeforeTurn,
    /// Save the session transcript (once per session)
    #[value(alias = "idle")]
    SessionEnd,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tool Commands
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct ToolCommand {
    #[command(subcommand)]
    pub action: ToolAction,
}

#[derive(Subcommand, Debug)]
pub enum ToolAction {
    /// Show the tool guide
    Help,

    /// Search memories
    Search {
        /// Search query
        query: String,

        /// Search type (e.g. GRAPH_COMPLETION, CHUNKS, TEMPORAL)
        #[arg(short = 't', long)]
        search_type: Option<String>,

        /// Maximum number of results
        #[arg(short = 'k', long)]
        top_k: Option<u32>,
    },

    /// Search memories in time order
    Timeline {
        /// Search query
        query: String,
    },

    /// Store a memory
    Add {
        /// Memory content
        content: String,

        /// Comma-separated tags
        #[arg(short, long)]
        tags: Option<String>,
    },

    /// List datasets
    List,
}

// ─────────────────────────────────────────────────────────────────────────────
// Config Commands
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the config file path
    Path,

    /// Print the effective configuration (token redacted)
    Show,

    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
