//! HTTP route handlers.

pub mod config;
pub mod documents;
pub mod health;
pub mod knowledge;
pub mod query;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use arogya_core::Error;

use crate::state::AppState;

/// Build the main Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(health::routes())
        .merge(query::routes())
        .merge(config::routes())
        .merge(documents::routes())
        .merge(knowledge::routes())
}

pub(crate) type ApiError = (StatusCode, Json<serde_json::Value>);

/// Map a domain error onto an HTTP status and `{ "error": ... }` body.
pub(crate) fn error_response(err: Error) -> ApiError {
    let status = match &err {
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::DuplicateContent(_) => StatusCode::CONFLICT,
        Error::Ingest(_) => StatusCode::BAD_REQUEST,
        Error::Llm(_) | Error::Search(_) | Error::Parse(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!("{}", err);
    }
    (status, Json(serde_json::json!({ "error": err.to_string() })))
}

pub(crate) fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": message.into() })),
    )
}
