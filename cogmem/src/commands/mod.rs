//! Command implementations for the cogmem CLI.
//!
//! Each submodule implements the logic for a command group.

pub mod config;
pub mod doctor;
pub mod events;
pub mod hook;
pub mod mcp;
pub mod tool;
