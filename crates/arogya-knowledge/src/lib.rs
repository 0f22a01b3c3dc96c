//! Arogya Knowledge: the passage store behind the RAG chains.
//!
//! Reference texts (ayurvedic remedies, yoga sequences, pranayama notes) are
//! chunked into passages and indexed with SQLite FTS5. Chains reach the store
//! through the [`Retriever`] trait.

pub mod chunking;
pub mod ingest;
pub mod schema;
pub mod store;
pub mod types;

pub use ingest::{content_hash, IngestReport, Ingester};
pub use store::KnowledgeStore;
pub use types::*;

use arogya_core::Result;

/// Passage lookup used by RAG-backed chains.
pub trait Retriever: Send + Sync {
    /// Return up to `top_k` passages relevant to `query`, best first.
    fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<Passage>>;
}

impl Retriever for KnowledgeStore {
    fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<Passage>> {
        self.search(query, top_k)
    }
}
