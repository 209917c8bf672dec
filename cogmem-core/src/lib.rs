//! cogmem-core - Core library for Cognee-backed assistant memory
//!
//! This crate provides everything the `cogmem` CLI drives:
//!
//! - **client**: HTTP client for the Cognee memory service
//! - **session**: Per-session transcript state and session records
//! - **triggers**: "Remember this" keyword detection
//! - **context**: Rendering memories into assistant context
//! - **hooks**: Lifecycle hook handlers (session start, before turn, session end)
//! - **tools**: Assistant-invokable memory actions
//! - **config**: JSON configuration with environment overrides

pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod hooks;
pub mod session;
pub mod tools;
pub mod triggers;
pub mod types;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use client::{MemoryClient, MemoryService};
pub use config::Config;
pub use error::{Error, Result};
