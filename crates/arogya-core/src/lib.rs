//! Arogya Core: configuration, data directories, shared error type.

pub mod config;
pub mod error;

pub use config::{
    ArogyaConfig, DataPaths, SearchProvider, ToolsConfig, DEFAULT_RAG_TOP_K, DEFAULT_SEARCH_RESULTS,
};
pub use error::{Error, Result};
