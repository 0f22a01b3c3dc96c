//! SQLite-backed knowledge store with FTS5 BM25 passage search.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::chunking::TextPassage;
use crate::schema::{FTS_SCHEMA_SQL, FTS_TRIGGERS_SQL, SCHEMA_SQL};
use crate::types::*;
use arogya_core::{Error, Result};

const DB_FILE: &str = "knowledge.db";

/// Passage store for the RAG chains.
pub struct KnowledgeStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

fn db_err(e: rusqlite::Error) -> Error {
    Error::Database(e.to_string())
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

impl KnowledgeStore {
    /// Open or create the store. The file will be `db_dir/knowledge.db`.
    pub fn open(db_dir: impl AsRef<Path>) -> Result<Self> {
        let db_dir = db_dir.as_ref();
        std::fs::create_dir_all(db_dir)?;
        let db_path = db_dir.join(DB_FILE);

        let conn = Connection::open(&db_path).map_err(db_err)?;
        Self::init(&conn)?;

        let store = Self {
            conn: Mutex::new(conn),
            db_path,
        };

        let stats = store.stats()?;
        info!(
            "KnowledgeStore initialized: {} documents, {} passages, path={}",
            stats.total_documents,
            stats.total_passages,
            store.db_path.display()
        );
        Ok(store)
    }

    /// In-memory store, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        Self::init(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path: PathBuf::from(":memory:"),
        })
    }

    fn init(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA foreign_keys = ON;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(db_err)?;
        let full_schema = format!("{}\n{}\n{}", SCHEMA_SQL, FTS_SCHEMA_SQL, FTS_TRIGGERS_SQL);
        conn.execute_batch(&full_schema)
            .map_err(|e| Error::Database(format!("Schema init failed: {}", e)))
    }

    // ---------------------------------------------------------------
    // Documents
    // ---------------------------------------------------------------

    /// Insert a document. Returns the new document ID.
    pub fn add_document(&self, title: &str, text: &str, opts: AddDocumentOptions) -> Result<i64> {
        let conn = self.conn.lock();
        insert_document(&conn, title, text, &opts)
    }

    /// Insert a document together with its passages. Either all rows are
    /// written or none are.
    pub fn add_document_with_passages(
        &self,
        title: &str,
        text: &str,
        opts: AddDocumentOptions,
        passages: &[TextPassage],
    ) -> Result<i64> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction().map_err(db_err)?;
        let doc_id = insert_document(&tx, title, text, &opts)?;
        for p in passages {
            insert_passage(
                &tx,
                doc_id,
                &p.text,
                p.heading.as_deref(),
                p.index,
                Some((p.char_start, p.char_end)),
            )?;
        }
        tx.commit().map_err(db_err)?;
        Ok(doc_id)
    }

    /// Find a document by content hash.
    pub fn find_document_by_hash(&self, content_hash: &str) -> Result<Option<Document>> {
        let conn = self.conn.lock();
        let row = conn
            .prepare_cached("SELECT * FROM documents WHERE content_hash = ?1")
            .map_err(db_err)?
            .query_row(params![content_hash], Self::row_to_document)
            .optional()
            .map_err(db_err)?;
        Ok(row)
    }

    /// Get a document by ID.
    pub fn get_document(&self, doc_id: i64) -> Result<Option<Document>> {
        let conn = self.conn.lock();
        let row = conn
            .prepare_cached("SELECT * FROM documents WHERE id = ?1")
            .map_err(db_err)?
            .query_row(params![doc_id], Self::row_to_document)
            .optional()
            .map_err(db_err)?;
        Ok(row)
    }

    /// List the most recent documents with passage counts and a short preview.
    pub fn list_documents(&self, limit: usize) -> Result<Vec<DocumentSummary>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(
                "SELECT d.id, d.title, d.source, d.text, d.created_at, \
                        (SELECT COUNT(*) FROM passages p WHERE p.doc_id = d.id) AS passages \
                 FROM documents d ORDER BY d.id DESC LIMIT ?1",
            )
            .map_err(db_err)?;
        let rows = stmt
            .query_map(params![limit as i64], |row| {
                let text: String = row.get("text")?;
                Ok(DocumentSummary {
                    id: row.get("id")?,
                    title: row.get("title")?,
                    source: row.get("source")?,
                    passages: row.get("passages")?,
                    preview: truncate_chars(&text, 200),
                    created_at: row.get("created_at")?,
                })
            })
            .map_err(db_err)?;
        let docs = rows.collect::<rusqlite::Result<Vec<_>>>().map_err(db_err)?;
        Ok(docs)
    }

    /// Delete a document and its passages. Returns false if it did not exist.
    pub fn delete_document(&self, doc_id: i64) -> Result<bool> {
        let conn = self.conn.lock();
        let count = conn
            .execute("DELETE FROM documents WHERE id = ?1", params![doc_id])
            .map_err(db_err)?;
        if count > 0 {
            debug!("Deleted document {}", doc_id);
        }
        Ok(count > 0)
    }

    // ---------------------------------------------------------------
    // Passages
    // ---------------------------------------------------------------

    /// Count passages, optionally for one document.
    pub fn count_passages(&self, doc_id: Option<i64>) -> Result<i64> {
        let conn = self.conn.lock();
        match doc_id {
            Some(id) => conn.query_row(
                "SELECT COUNT(*) FROM passages WHERE doc_id = ?1",
                params![id],
                |row| row.get(0),
            ),
            None => conn.query_row("SELECT COUNT(*) FROM passages", [], |row| row.get(0)),
        }
        .map_err(db_err)
    }

    // ---------------------------------------------------------------
    // BM25 Search (FTS5)
    // ---------------------------------------------------------------

    /// Full-text search using FTS5 BM25 ranking, best match first.
    pub fn search(&self, query: &str, top_k: usize) -> Result<Vec<Passage>> {
        let fts_query = Self::sanitize_fts_query(query);
        if fts_query.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let conn = self.conn.lock();
        let sql = "SELECT p.id, p.doc_id, p.text, p.heading, d.title, d.source, \
                          passages_fts.rank AS bm25_score \
                   FROM passages_fts \
                   JOIN passages p ON p.id = passages_fts.rowid \
                   JOIN documents d ON d.id = p.doc_id \
                   WHERE passages_fts MATCH ?1 \
                   ORDER BY passages_fts.rank \
                   LIMIT ?2";

        let mut stmt = conn.prepare_cached(sql).map_err(db_err)?;
        let rows = stmt
            .query_map(params![fts_query, top_k as i64], |row| {
                let bm25_score: f64 = row.get("bm25_score")?;
                Ok(Passage {
                    passage_id: row.get("id")?,
                    doc_id: row.get("doc_id")?,
                    title: row.get("title")?,
                    heading: row.get("heading")?,
                    text: row.get("text")?,
                    score: -bm25_score, // FTS5 rank is negative; negate for positive
                    source: row.get("source")?,
                })
            })
            .map_err(db_err)?;

        let hits = rows.collect::<rusqlite::Result<Vec<_>>>().map_err(db_err)?;
        debug!("FTS query {:?} matched {} passages", fts_query, hits.len());
        Ok(hits)
    }

    /// Sanitize a user query for FTS5 MATCH syntax.
    /// Keeps word characters, quotes each term and joins with OR.
    fn sanitize_fts_query(query: &str) -> String {
        let tokens: Vec<String> = query
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| t.chars().count() > 1)
            .map(|t| format!("\"{}\"", t.to_lowercase()))
            .collect();
        tokens.join(" OR ")
    }

    // ---------------------------------------------------------------
    // Stats
    // ---------------------------------------------------------------

    /// Get store statistics.
    pub fn stats(&self) -> Result<StoreStats> {
        let total_passages = self.count_passages(None)?;
        let total_documents: i64 = self
            .conn
            .lock()
            .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))
            .map_err(db_err)?;

        let db_size = std::fs::metadata(&self.db_path)
            .map(|m| m.len())
            .unwrap_or(0);

        Ok(StoreStats {
            total_documents,
            total_passages,
            db_path: self.db_path.to_string_lossy().to_string(),
            db_size_mb: db_size as f64 / (1024.0 * 1024.0),
        })
    }

    fn row_to_document(row: &rusqlite::Row<'_>) -> rusqlite::Result<Document> {
        Ok(Document {
            id: row.get("id")?,
            title: row.get("title")?,
            source: row.get("source")?,
            text: row.get("text")?,
            metadata: row
                .get::<_, Option<String>>("metadata_json")?
                .and_then(|s| serde_json::from_str(&s).ok()),
            content_hash: row.get("content_hash")?,
            created_at: row.get("created_at")?,
        })
    }
}

fn insert_document(
    conn: &Connection,
    title: &str,
    text: &str,
    opts: &AddDocumentOptions,
) -> Result<i64> {
    let created_at = opts.created_at.unwrap_or_else(now_millis);
    let meta_json = opts
        .metadata
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    let id = conn
        .prepare_cached(
            "INSERT INTO documents (title, source, text, metadata_json, content_hash, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .map_err(db_err)?
        .insert(params![title, opts.source, text, meta_json, opts.content_hash, created_at])
        .map_err(|e| {
            if e.to_string().contains("UNIQUE constraint") {
                Error::DuplicateContent(opts.content_hash.clone().unwrap_or_default())
            } else {
                db_err(e)
            }
        })?;
    Ok(id)
}

fn insert_passage(
    conn: &Connection,
    doc_id: i64,
    text: &str,
    heading: Option<&str>,
    passage_index: usize,
    char_range: Option<(usize, usize)>,
) -> Result<i64> {
    let id = conn
        .prepare_cached(
            "INSERT INTO passages (doc_id, text, heading, passage_index, char_start, char_end) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .map_err(db_err)?
        .insert(params![
            doc_id,
            text,
            heading,
            passage_index as i64,
            char_range.map(|(s, _)| s as i64),
            char_range.map(|(_, e)| e as i64),
        ])
        .map_err(db_err)?;
    Ok(id)
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> (KnowledgeStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = KnowledgeStore::open(dir.path()).unwrap();
        (store, dir)
    }

    fn seed(store: &KnowledgeStore, title: &str, passages: &[&str]) -> i64 {
        let body = passages.join("\n\n");
        let passages: Vec<_> = passages
            .iter()
            .enumerate()
            .map(|(i, p)| passage(p, i))
            .collect();
        store
            .add_document_with_passages(title, &body, AddDocumentOptions::default(), &passages)
            .unwrap()
    }

    #[test]
    fn test_add_and_get_document() {
        let (store, _dir) = test_store();
        let doc_id = store
            .add_document(
                "Dinacharya",
                "Wake before sunrise.",
                AddDocumentOptions {
                    source: Some("ayush-handbook.md".into()),
                    metadata: Some(serde_json::json!({"category": "ayurveda"})),
                    ..Default::default()
                },
            )
            .unwrap();

        let doc = store.get_document(doc_id).unwrap().unwrap();
        assert_eq!(doc.title, "Dinacharya");
        assert_eq!(doc.source.as_deref(), Some("ayush-handbook.md"));
        assert_eq!(doc.metadata.unwrap()["category"], "ayurveda");
        assert!(store.get_document(doc_id + 100).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_hash_rejected() {
        let (store, _dir) = test_store();
        let opts = AddDocumentOptions {
            content_hash: Some("same".into()),
            ..Default::default()
        };
        store.add_document("One", "text", opts.clone()).unwrap();
        let err = store.add_document("Two", "text", opts).unwrap_err();
        assert!(matches!(err, Error::DuplicateContent(h) if h == "same"));
        assert!(store.find_document_by_hash("same").unwrap().is_some());
    }

    #[test]
    fn test_search_ranks_matching_passages() {
        let (store, _dir) = test_store();
        seed(
            &store,
            "Yoga for the back",
            &[
                "Bhujangasana (cobra pose) strengthens the spine and eases lower back pain.",
                "Shavasana is a resting pose practiced at the end of a session.",
            ],
        );
        seed(
            &store,
            "Digestion",
            &["Triphala is traditionally taken at night to support digestion."],
        );

        let hits = store.search("yoga for back pain", 5).unwrap();
        assert!(!hits.is_empty());
        assert!(hits[0].text.contains("Bhujangasana"));
        assert_eq!(hits[0].title, "Yoga for the back");
        assert!(hits[0].score > 0.0);

        let hits = store.search("triphala digestion", 1).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Digestion");
    }

    #[test]
    fn test_search_handles_fts_syntax() {
        let (store, _dir) = test_store();
        seed(&store, "Pranayama", &["Anulom vilom is alternate nostril breathing."]);

        assert!(store.search("\"breathing\" AND (NOT", 5).is_ok());
        assert!(store.search("   ", 5).unwrap().is_empty());
        assert!(store.search("breathing", 0).unwrap().is_empty());
    }

    #[test]
    fn test_delete_cascades_to_passages() {
        let (store, _dir) = test_store();
        let doc_id = seed(&store, "Stress", &["Bhramari pranayama calms the mind."]);
        assert_eq!(store.count_passages(Some(doc_id)).unwrap(), 1);

        assert!(store.delete_document(doc_id).unwrap());
        assert!(!store.delete_document(doc_id).unwrap());
        assert_eq!(store.count_passages(None).unwrap(), 0);
        assert!(store.search("bhramari", 5).unwrap().is_empty());
    }

    #[test]
    fn test_list_documents_and_stats() {
        let (store, _dir) = test_store();
        seed(&store, "First", &["alpha passage"]);
        seed(&store, "Second", &["beta passage", "gamma passage"]);

        let docs = store.list_documents(10).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].title, "Second");
        assert_eq!(docs[0].passages, 2);

        let stats = store.stats().unwrap();
        assert_eq!(stats.total_documents, 2);
        assert_eq!(stats.total_passages, 3);
        assert!(stats.db_path.ends_with(DB_FILE));
    }

    fn passage(text: &str, index: usize) -> TextPassage {
        TextPassage {
            text: text.to_string(),
            heading: None,
            index,
            char_start: 0,
            char_end: text.len(),
        }
    }

    #[test]
    fn test_document_with_passages_is_all_or_nothing() {
        let store = KnowledgeStore::open_in_memory().unwrap();
        store
            .conn
            .lock()
            .execute_batch(
                "CREATE TEMP TRIGGER reject_second BEFORE INSERT ON passages \
                 WHEN NEW.passage_index = 1 BEGIN SELECT RAISE(ABORT, 'disk full'); END;",
            )
            .unwrap();

        let opts = || AddDocumentOptions {
            content_hash: Some("h-neem".into()),
            ..Default::default()
        };
        let passages = [passage("Neem paste for skin.", 0), passage("Neem twigs for teeth.", 1)];

        let err = store
            .add_document_with_passages("Neem", "Neem text", opts(), &passages)
            .unwrap_err();
        assert!(matches!(err, Error::Database(_)));
        assert!(store.find_document_by_hash("h-neem").unwrap().is_none());
        assert_eq!(store.count_passages(None).unwrap(), 0);

        store.conn.lock().execute_batch("DROP TRIGGER reject_second;").unwrap();
        let id = store
            .add_document_with_passages("Neem", "Neem text", opts(), &passages)
            .unwrap();
        assert_eq!(store.count_passages(Some(id)).unwrap(), 2);
        assert_eq!(store.search("teeth", 3).unwrap()[0].doc_id, id);
    }

    #[test]
    fn test_in_memory_store() {
        let store = KnowledgeStore::open_in_memory().unwrap();
        seed(&store, "Memory", &["ashwagandha for sleep"]);
        assert_eq!(store.search("ashwagandha", 3).unwrap().len(), 1);
    }
}
