//! Direct knowledge-store search, for inspecting what the RAG chains see.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use super::{bad_request, error_response, ApiError};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/knowledge/search", post(search))
        .route("/knowledge/stats", get(stats))
}

#[derive(Deserialize)]
struct SearchRequest {
    query: String,
    top_k: Option<usize>,
}

async fn search(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if req.query.trim().is_empty() {
        return Err(bad_request("query must not be empty"));
    }
    let top_k = req.top_k.unwrap_or(state.config.rag_top_k).max(1);
    let results = state.store.search(&req.query, top_k).map_err(error_response)?;
    Ok(Json(serde_json::json!({
        "query": req.query,
        "results": results,
        "total": results.len(),
    })))
}

async fn stats(State(state): State<Arc<AppState>>) -> Result<Json<serde_json::Value>, ApiError> {
    let stats = state.store.stats().map_err(error_response)?;
    Ok(Json(serde_json::to_value(stats).map_err(|e| error_response(e.into()))?))
}
