//! One-shot commands for working with the assistant from a terminal.

use std::path::{Path, PathBuf};

use anyhow::Context;

use arogya_chains::YogaChain;
use arogya_core::ArogyaConfig;
use arogya_knowledge::{Ingester, KnowledgeStore};
use arogya_tools::{VideoSearch, YouTubeClient};

use crate::state::AppState;

/// Videos listed by the `videos` command.
const VIDEO_RESULTS: usize = 2;
const PREVIEW_CHARS: usize = 200;

/// Data directory from `AROGYA_DATA_DIR`, `../data` next to the binary, or `data`.
pub fn resolve_data_dir() -> PathBuf {
    std::env::var("AROGYA_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let exe_dir = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()));
            if let Some(dir) = exe_dir {
                let parent_data = dir.join("../data");
                if parent_data.exists() {
                    return parent_data;
                }
            }
            PathBuf::from("data")
        })
}

pub fn open_store(config: &ArogyaConfig) -> anyhow::Result<KnowledgeStore> {
    KnowledgeStore::open(&config.data_paths.knowledge)
        .map_err(|e| anyhow::anyhow!("Failed to open knowledge store: {}", e))
}

/// Build the full application state for commands that run chains.
pub fn build_state(data_dir: &Path) -> anyhow::Result<AppState> {
    let config = ArogyaConfig::from_env(data_dir)?;
    let store = open_store(&config)?;
    Ok(AppState::new(config, store))
}

/// `arogya ask <text>`: run the workflow once and print the JSON response.
pub async fn ask(data_dir: &Path, text: &str) -> anyhow::Result<()> {
    let state = build_state(data_dir)?;
    let response = state.workflow.run(text, text).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

/// `arogya ingest <path>`: add a file or every text file in a directory.
pub fn ingest(data_dir: &Path, path: &Path) -> anyhow::Result<()> {
    let config = ArogyaConfig::from_env(data_dir)?;
    let store = open_store(&config)?;
    let ingester = Ingester::new(&store);

    if path.is_dir() {
        let report = ingester
            .ingest_dir(path)
            .with_context(|| format!("ingesting {}", path.display()))?;
        println!(
            "Ingested {} documents ({} duplicates, {} skipped, {} failed)",
            report.ingested.len(),
            report.duplicates,
            report.skipped,
            report.failed
        );
    } else {
        let id = ingester
            .ingest_file(path)
            .with_context(|| format!("ingesting {}", path.display()))?;
        println!("Ingested document {} from {}", id, path.display());
    }
    Ok(())
}

/// `arogya inspect [limit]`: print store stats and sample documents.
pub fn inspect(data_dir: &Path, limit: usize) -> anyhow::Result<()> {
    let config = ArogyaConfig::from_env(data_dir)?;
    let store = open_store(&config)?;
    let stats = store.stats()?;

    println!("Knowledge store: {}", stats.db_path);
    println!(
        "{} documents, {} passages, {:.2} MB",
        stats.total_documents, stats.total_passages, stats.db_size_mb
    );

    for (i, doc) in store.list_documents(limit)?.iter().enumerate() {
        println!();
        println!("--- Document {} ---", i + 1);
        println!("Id: {}  Title: {}", doc.id, doc.title);
        if let Some(source) = &doc.source {
            println!("Source: {}", source);
        }
        println!("Passages: {}", doc.passages);
        println!("Preview: {}", preview(&doc.preview, PREVIEW_CHARS));
    }
    Ok(())
}

/// `arogya videos <query>`: YouTube search restricted to the yoga channels.
pub async fn videos(data_dir: &Path, query: &str) -> anyhow::Result<()> {
    let config = ArogyaConfig::from_env(data_dir)?;
    let client = YouTubeClient::new(config.tools.youtube_api_key.clone());
    let results = client
        .search_videos(query, &config.tools.yoga_channel_ids, VIDEO_RESULTS)
        .await?;

    if results.is_empty() {
        println!("No videos found.");
        return Ok(());
    }
    for (i, v) in results.iter().enumerate() {
        println!("{}. {}", i + 1, v.title);
        println!("   Channel: {}", v.channel_title);
        println!("   URL: {}", v.url);
        println!("   Thumbnail: {}", v.thumbnail);
    }
    Ok(())
}

/// `arogya yoga <query>`: run the yoga chain alone.
pub async fn yoga(data_dir: &Path, query: &str) -> anyhow::Result<()> {
    let state = build_state(data_dir)?;
    let chain = YogaChain::new(
        state.llm.clone(),
        state.store.clone(),
        std::sync::Arc::new(YouTubeClient::new(state.config.tools.youtube_api_key.clone())),
        state.config.tools.yoga_channel_ids.clone(),
        state.config.rag_top_k,
    );
    let rec = chain.run(query).await?;

    println!("{}", rec.text);
    match &rec.video {
        Some(v) => {
            println!();
            println!("Video: {}", v.title);
            println!("Channel: {}", v.channel_title);
            println!("URL: {}", v.url);
        }
        None => println!("\nNo video found."),
    }
    Ok(())
}

fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
