//! Liveness and status.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(get_health))
}

/// GET /api/health: service status, model and knowledge counts.
async fn get_health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let (documents, passages) = match state.store.stats() {
        Ok(stats) => (stats.total_documents, stats.total_passages),
        Err(e) => {
            tracing::warn!("Knowledge stats unavailable: {}", e);
            (0, 0)
        }
    };
    let llm_configured = state.llm_config.read().resolve_provider().is_some();

    Json(serde_json::json!({
        "status": "ok",
        "service": "arogya",
        "version": env!("CARGO_PKG_VERSION"),
        "llm": state.llm.describe(),
        "llmConfigured": llm_configured,
        "knowledge": {
            "documents": documents,
            "passages": passages,
        },
    }))
}
