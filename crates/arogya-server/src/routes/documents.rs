//! Knowledge documents: list, add, upload, inspect, delete.

use std::path::Path as FsPath;
use std::sync::Arc;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use arogya_core::Error;
use arogya_knowledge::Ingester;

use super::{bad_request, error_response, ApiError};
use crate::state::AppState;

const DEFAULT_LIST_LIMIT: usize = 50;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/documents", get(list_documents).post(add_document))
        .route("/documents/upload", post(upload_documents))
        .route("/documents/{id}", get(get_document).delete(delete_document))
}

#[derive(Deserialize)]
struct ListQuery {
    limit: Option<usize>,
}

async fn list_documents(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let limit = params.limit.unwrap_or(DEFAULT_LIST_LIMIT).max(1);
    let documents = state.store.list_documents(limit).map_err(error_response)?;
    let stats = state.store.stats().map_err(error_response)?;
    Ok(Json(serde_json::json!({
        "documents": documents,
        "total": stats.total_documents,
    })))
}

#[derive(Deserialize)]
struct AddDocumentRequest {
    title: String,
    text: String,
    source: Option<String>,
}

/// POST /api/documents: ingest raw text.
async fn add_document(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddDocumentRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let title = req.title.trim();
    if title.is_empty() {
        return Err(bad_request("title must not be empty"));
    }

    let ingester = Ingester::new(&state.store);
    let id = ingester
        .ingest_text(title, req.source.as_deref(), &req.text, None)
        .map_err(error_response)?;
    let passages = state.store.count_passages(Some(id)).map_err(error_response)?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "id": id, "passages": passages })),
    ))
}

/// POST /api/documents/upload: multipart `.txt` / `.md` upload.
async fn upload_documents(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut uploaded = Vec::new();
    let mut errors = Vec::new();

    while let Ok(Some(field)) = multipart.next_field().await {
        let Some(filename) = field.file_name().map(sanitize_filename) else {
            continue;
        };
        let bytes = match field.bytes().await {
            Ok(b) => b,
            Err(e) => {
                errors.push(serde_json::json!({ "filename": filename, "error": e.to_string() }));
                continue;
            }
        };

        let path = state.config.data_paths.uploads.join(&filename);
        if let Err(e) = std::fs::write(&path, &bytes) {
            errors.push(serde_json::json!({ "filename": filename, "error": e.to_string() }));
            continue;
        }

        match Ingester::new(&state.store).ingest_file(&path) {
            Ok(id) => uploaded.push(serde_json::json!({ "filename": filename, "id": id })),
            Err(e) => {
                let _ = std::fs::remove_file(&path);
                errors.push(serde_json::json!({ "filename": filename, "error": e.to_string() }));
            }
        }
    }

    let status = if uploaded.is_empty() && !errors.is_empty() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::OK
    };
    (
        status,
        Json(serde_json::json!({ "uploaded": uploaded, "errors": errors })),
    )
}

async fn get_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let doc = state
        .store
        .get_document(id)
        .map_err(error_response)?
        .ok_or_else(|| error_response(Error::NotFound(format!("document {}", id))))?;
    let passages = state.store.count_passages(Some(id)).map_err(error_response)?;
    Ok(Json(serde_json::json!({ "document": doc, "passages": passages })))
}

async fn delete_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    match state.store.delete_document(id) {
        Ok(true) => Ok(Json(serde_json::json!({ "deleted": true, "id": id }))),
        Ok(false) => Err(error_response(Error::NotFound(format!("document {}", id)))),
        Err(e) => Err(error_response(e)),
    }
}

/// Strip directory components from a client-supplied filename.
fn sanitize_filename(name: &str) -> String {
    let cleaned = name.replace(['/', '\\'], "").replace("..", "");
    FsPath::new(&cleaned)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .unwrap_or("unnamed")
        .to_string()
}
