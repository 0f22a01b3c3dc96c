//! Document ingestion: file → text → passages → store.

use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::chunking::{chunk_document, passage_size_for, RecursiveChunker};
use crate::store::KnowledgeStore;
use crate::types::AddDocumentOptions;
use arogya_core::{Error, Result};

const TEXT_EXTENSIONS: &[&str] = &["txt", "md", "markdown"];

/// Outcome of ingesting a directory.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub ingested: Vec<i64>,
    pub duplicates: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Handles document ingestion into the knowledge store.
pub struct Ingester<'a> {
    store: &'a KnowledgeStore,
}

impl<'a> Ingester<'a> {
    pub fn new(store: &'a KnowledgeStore) -> Self {
        Self { store }
    }

    /// Ingest raw text. Fails with `DuplicateContent` if the same text exists.
    pub fn ingest_text(
        &self,
        title: &str,
        source: Option<&str>,
        text: &str,
        file_extension: Option<&str>,
    ) -> Result<i64> {
        if text.trim().is_empty() {
            return Err(Error::Ingest(format!("document '{}' is empty", title)));
        }

        let hash = content_hash(text);
        if self.store.find_document_by_hash(&hash)?.is_some() {
            return Err(Error::DuplicateContent(hash));
        }

        let chunker = RecursiveChunker::new(passage_size_for(file_extension));
        let passages = chunk_document(text, &chunker);
        let doc_id = self.store.add_document_with_passages(
            title,
            text,
            AddDocumentOptions {
                source: source.map(String::from),
                content_hash: Some(hash),
                ..Default::default()
            },
            &passages,
        )?;

        info!(
            "Ingested document {} ({}) with {} passages",
            doc_id,
            title,
            passages.len()
        );
        Ok(doc_id)
    }

    /// Ingest a single `.txt` / `.md` file. Title is the first heading or the file stem.
    pub fn ingest_file(&self, path: &Path) -> Result<i64> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());
        if !ext.as_deref().is_some_and(|e| TEXT_EXTENSIONS.contains(&e)) {
            return Err(Error::Ingest(format!(
                "unsupported file type: {}",
                path.display()
            )));
        }

        let text = std::fs::read_to_string(path)?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown");
        let title = document_title(&text).unwrap_or_else(|| {
            path.file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or(filename)
                .replace(['_', '-'], " ")
        });

        self.ingest_text(&title, Some(filename), &text, ext.as_deref())
    }

    /// Ingest every supported file directly under `dir` (sorted by name).
    pub fn ingest_dir(&self, dir: &Path) -> Result<IngestReport> {
        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .collect();
        paths.sort();

        let mut report = IngestReport::default();
        for path in paths {
            match self.ingest_file(&path) {
                Ok(id) => report.ingested.push(id),
                Err(Error::DuplicateContent(_)) => {
                    debug!("Duplicate content, skipping: {}", path.display());
                    report.duplicates += 1;
                }
                Err(Error::Ingest(msg)) => {
                    debug!("Skipping {}: {}", path.display(), msg);
                    report.skipped += 1;
                }
                Err(e) => {
                    warn!("Failed to ingest {}: {}", path.display(), e);
                    report.failed += 1;
                }
            }
        }
        Ok(report)
    }
}

/// First markdown heading in the text, if any.
fn document_title(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|l| l.starts_with('#'))
        .map(|l| l.trim_start_matches('#').trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Compute SHA-256 content hash.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}
