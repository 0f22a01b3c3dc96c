//! Configuration and data directory management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Default number of knowledge passages handed to RAG-backed chains.
pub const DEFAULT_RAG_TOP_K: usize = 4;
/// Default number of web results handed to search-backed chains.
pub const DEFAULT_SEARCH_RESULTS: usize = 5;

/// Paths to all Arogya data directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// Knowledge store directory (`data/knowledge/`).
    pub knowledge: PathBuf,
    /// Files queued for ingestion (`data/uploads/`).
    pub uploads: PathBuf,
    /// LLM configuration (`data/llm-config.json`).
    pub llm_config_file: PathBuf,
}

impl DataPaths {
    /// Create data paths from a root directory. Creates directories if needed.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        let paths = Self {
            knowledge: root.join("knowledge"),
            uploads: root.join("uploads"),
            llm_config_file: root.join("llm-config.json"),
            root,
        };
        paths.ensure_dirs()?;
        Ok(paths)
    }

    fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.knowledge)?;
        std::fs::create_dir_all(&self.uploads)?;
        Ok(())
    }
}

/// Web search backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchProvider {
    /// Google Custom Search, falling back to DuckDuckGo when it returns nothing.
    Google,
    /// DuckDuckGo instant answers only.
    DuckDuckGo,
}

impl SearchProvider {
    fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "duckduckgo" | "ddg" => Self::DuckDuckGo,
            _ => Self::Google,
        }
    }
}

/// Credentials and knobs for the external tools (search, YouTube).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    pub search_provider: SearchProvider,
    #[serde(skip_serializing)]
    pub google_search_api_key: Option<String>,
    pub google_search_engine_id: Option<String>,
    pub max_search_results: usize,
    #[serde(skip_serializing)]
    pub youtube_api_key: Option<String>,
    /// Channels yoga videos are restricted to. Empty means any channel.
    pub yoga_channel_ids: Vec<String>,
}

impl ToolsConfig {
    /// Read tool settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read tool settings through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let yoga_channel_ids = non_empty("YOUTUBE_YOGA_CHANNELS")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            search_provider: non_empty("SEARCH_PROVIDER")
                .map(|p| SearchProvider::parse(&p))
                .unwrap_or(SearchProvider::Google),
            google_search_api_key: non_empty("GOOGLE_SEARCH_API_KEY"),
            google_search_engine_id: non_empty("GOOGLE_SEARCH_ENGINE_ID"),
            max_search_results: non_empty("SEARCH_MAX_RESULTS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SEARCH_RESULTS),
            youtube_api_key: non_empty("YOUTUBE_API_KEY"),
            yoga_channel_ids,
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

/// Top-level Arogya configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArogyaConfig {
    /// HTTP server port.
    pub port: u16,
    /// Data directory paths.
    pub data_paths: DataPaths,
    /// Passages retrieved per RAG query.
    pub rag_top_k: usize,
    pub tools: ToolsConfig,
}

impl ArogyaConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let port = parse_env("PORT", 8000u16);
        let rag_top_k = parse_env("RAG_TOP_K", DEFAULT_RAG_TOP_K).max(1);

        let data_paths = DataPaths::new(data_dir)?;

        Ok(Self {
            port,
            data_paths,
            rag_top_k,
            tools: ToolsConfig::from_env(),
        })
    }
}

/// Parse an env var, warning and falling back to `default` when it is malformed.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid {}={:?}", key, raw);
            default
        }),
        Err(_) => default,
    }
}
