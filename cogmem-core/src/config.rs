//! Configuration management for cognee-memory.
//!
//! Configuration is loaded from multiple sources with precedence:
//! 1. Environment variables (COGNEE_URL, COGNEE_API_TOKEN, COGNEE_DATASET)
//! 2. Config file (<config dir>/cognee-memory/config.json)
//! 3. Default values
//!
//! The file is created with defaults the first time it is loaded.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::types::SearchType;

/// Client-side search deadline used when nothing else is configured
pub const DEFAULT_SEARCH_TIMEOUT_MS: u64 = 2500;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Base URL of the Cognee memory service
    #[serde(default = "default_service_url")]
    pub service_url: String,

    /// Bearer token for the service
    #[serde(default)]
    pub api_token: Option<String>,

    /// Dataset that memories and session records are written to
    #[serde(default = "default_dataset_name")]
    pub dataset_name: String,

    /// Results with a reported score below this are not injected
    #[serde(default)]
    pub similarity_threshold: f64,

    /// Maximum number of memories rendered into context
    #[serde(default = "default_max_memories")]
    pub max_memories: usize,

    /// Case-insensitive regexes that mark a prompt as "worth remembering"
    #[serde(default = "default_keyword_patterns")]
    pub keyword_patterns: Vec<String>,

    #[serde(default)]
    pub injection: InjectionConfig,

    #[serde(default)]
    pub transcript: TranscriptConfig,

    #[serde(default)]
    pub ontology: OntologyConfig,

    #[serde(default)]
    pub retry: RetryPolicy,

    /// Deadline for the health check
    #[serde(default = "default_health_timeout_ms")]
    pub health_timeout_ms: u64,
}

/// How memories are searched and injected before a turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InjectionConfig {
    #[serde(default)]
    pub search_type: SearchType,

    #[serde(default = "default_top_k")]
    pub top_k: u32,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default)]
    pub frequency: InjectionFrequency,
}

/// When the pre-turn search runs for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InjectionFrequency {
    /// Only for the first user message of a session
    #[default]
    FirstMessage,
    /// For every user message
    EveryTurn,
}

/// Limits applied when rendering a session record. `None` means unlimited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptConfig {
    #[serde(default = "default_max_messages")]
    pub max_messages: Option<usize>,

    #[serde(default = "default_max_chars")]
    pub max_chars_per_message: Option<usize>,
}

/// Custom graph model sent with cognify when requested
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OntologyConfig {
    #[serde(default)]
    pub file: Option<PathBuf>,

    #[serde(default = "default_ontology_model")]
    pub model_name: String,
}

/// Retry behaviour for remote calls.
///
/// Every call either succeeds, fails fast, or times out once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryPolicy {
    #[default]
    Never,
}

// Default value functions
fn default_service_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_dataset_name() -> String {
    "coding_assistant_memory".to_string()
}

fn default_max_memories() -> usize {
    5
}

fn default_keyword_patterns() -> Vec<String> {
    [
        r"\bremember\b",
        r"\bdon'?t forget\b",
        r"\bkeep in mind\b",
        r"\bnote (?:that|this)\b",
        r"\bfor future reference\b",
        r"\bfrom now on\b",
        r"\bi prefer\b",
        r"\balways use\b",
        r"\bnever use\b",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_top_k() -> u32 {
    5
}

fn default_timeout_ms() -> u64 {
    DEFAULT_SEARCH_TIMEOUT_MS
}

fn default_max_messages() -> Option<usize> {
    Some(10)
}

fn default_max_chars() -> Option<usize> {
    Some(500)
}

fn default_ontology_model() -> String {
    "MemoryItem".to_string()
}

fn default_health_timeout_ms() -> u64 {
    3000
}

impl Default for InjectionConfig {
    fn default() -> Self {
        Self {
            search_type: SearchType::default(),
            top_k: default_top_k(),
            timeout_ms: default_timeout_ms(),
            frequency: InjectionFrequency::default(),
        }
    }
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            max_messages: default_max_messages(),
            max_chars_per_message: default_max_chars(),
        }
    }
}

impl Default for OntologyConfig {
    fn default() -> Self {
        Self {
            file: None,
            model_name: default_ontology_model(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_url: default_service_url(),
            api_token: None,
            dataset_name: default_dataset_name(),
            similarity_threshold: 0.0,
            max_memories: default_max_memories(),
            keyword_patterns: default_keyword_patterns(),
            injection: InjectionConfig::default(),
            transcript: TranscriptConfig::default(),
            ontology: OntologyConfig::default(),
            retry: RetryPolicy::default(),
            health_timeout_ms: default_health_timeout_ms(),
        }
    }
}

impl Config {
    /// Load configuration from the default path and the environment.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path())?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from a file, creating it with defaults if absent.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config = serde_json::from_str(&content)
                .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
            debug!("Loaded config from {}", path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            info!("Created default config at {}", path.display());
            Ok(config)
        }
    }

    /// Save configuration to the default path.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to a file.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Get the config file path.
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("COGMEM_CONFIG") {
            PathBuf::from(path)
        } else {
            dirs::config_dir()
                .or_else(dirs::home_dir)
                .unwrap_or_else(|| PathBuf::from("."))
                .join("cognee-memory")
                .join("config.json")
        }
    }

    /// Apply environment overrides using the given lookup.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("COGNEE_URL").filter(|v| !v.trim().is_empty()) {
            self.service_url = url;
        }
        if let Some(token) = lookup("COGNEE_API_TOKEN").filter(|v| !v.trim().is_empty()) {
            self.api_token = Some(token);
        }
        if let Some(dataset) = lookup("COGNEE_DATASET").filter(|v| !v.trim().is_empty()) {
            self.dataset_name = dataset;
        }
    }

    /// Service URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.service_url.trim_end_matches('/')
    }

    pub fn search_timeout(&self) -> Duration {
        Duration::from_millis(self.injection.timeout_ms)
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_millis(self.health_timeout_ms)
    }
}
