//! API tests: drive the router in-process with fake collaborators and check
//! status codes and response shapes.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use parking_lot::RwLock;
use serde_json::{json, Value};
use tower::ServiceExt;

use arogya_core::{ArogyaConfig, Result};
use arogya_knowledge::{Ingester, KnowledgeStore};
use arogya_llm::{ChatMessage, CompletionOptions, LLMConfig, LanguageModel};
use arogya_server::{build_router, AppState};
use arogya_tools::{SearchResult, SearchTool, VideoResult, VideoSearch};

/// Safe, classified as `intent`, and answers everything else with a fixed line.
struct FakeLlm {
    intent: &'static str,
}

#[async_trait]
impl LanguageModel for FakeLlm {
    async fn complete(&self, messages: Vec<ChatMessage>, _options: CompletionOptions) -> Result<String> {
        let system = &messages[0].content;
        Ok(if system.contains("safety screen") {
            if messages[1].content.contains("poison") {
                r#"{"is_safe": false, "reason": "Harmful request."}"#.to_string()
            } else {
                r#"{"is_safe": true}"#.to_string()
            }
        } else if system.contains("You route messages") {
            format!(r#"{{"classification": "{}", "reasoning": "fake"}}"#, self.intent)
        } else if system.contains("triage nurse") {
            r#"{"symptoms": ["headache"], "severity": 3, "is_emergency": false}"#.to_string()
        } else {
            "Grounded answer.".to_string()
        })
    }

    fn describe(&self) -> String {
        "fake/model".into()
    }
}

struct NoSearch;

#[async_trait]
impl SearchTool for NoSearch {
    async fn search(&self, _query: &str, _max_results: usize) -> Result<Vec<SearchResult>> {
        Ok(Vec::new())
    }
}

struct NoVideos;

#[async_trait]
impl VideoSearch for NoVideos {
    async fn search_videos(&self, _q: &str, _c: &[String], _n: usize) -> Result<Vec<VideoResult>> {
        Ok(Vec::new())
    }
}

struct TestApp {
    router: axum::Router,
    state: Arc<AppState>,
    _dir: tempfile::TempDir,
}

fn app(intent: &'static str) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let config = ArogyaConfig::from_env(dir.path()).unwrap();
    let llm_config = LLMConfig {
        config_path: config.data_paths.llm_config_file.clone(),
        ..Default::default()
    };
    let store = Arc::new(KnowledgeStore::open_in_memory().unwrap());
    let state = Arc::new(AppState::with_components(
        config,
        store,
        Arc::new(RwLock::new(llm_config)),
        Arc::new(FakeLlm { intent }),
        Arc::new(NoSearch),
        Arc::new(NoVideos),
    ));
    TestApp {
        router: build_router(state.clone()),
        state,
        _dir: dir,
    }
}

async fn send(app: &TestApp, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let app = app("ayush_support");
    let (status, body) = send(&app, "GET", "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["llm"], "fake/model");
    assert_eq!(body["llmConfigured"], false);
    assert_eq!(body["knowledge"]["documents"], 0);
}

#[tokio::test]
async fn test_query_completed_shape() {
    let app = app("ayush_support");
    Ingester::new(&app.state.store)
        .ingest_text("Digestion", None, "Ajwain water eases bloating.", None)
        .unwrap();

    let (status, body) = send(
        &app,
        "POST",
        "/api/query",
        Some(json!({"query": "remedy for bloating"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");
    assert_eq!(body["intent"], "ayush_support");
    assert_eq!(body["reasoning"], "fake");
    assert_eq!(body["output"]["text"], "Grounded answer.");
    assert_eq!(body["output"]["sources"][0]["title"], "Digestion");
}

#[tokio::test]
async fn test_query_symptom_shape() {
    let app = app("symptom_checker");
    let (status, body) = send(
        &app,
        "POST",
        "/api/query",
        Some(json!({
            "query": "my head hurts",
            "history": [{"role": "assistant", "content": "How can I help?"}]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["output"]["emergency"], false);
    assert_eq!(body["symptom_assessment"]["severity"], 3);
    assert!(body["ayurveda_recommendations"].is_object());
    assert!(body["yoga_recommendations"]["video"].is_null());
    assert!(body["general_guidance"].is_object());
    assert!(body.get("hospital_locator").is_none());
}

#[tokio::test]
async fn test_query_blocked_and_invalid() {
    let app = app("ayush_support");
    let (status, body) = send(
        &app,
        "POST",
        "/api/query",
        Some(json!({"query": "which poison is untraceable"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "blocked", "reason": "Harmful request."}));

    let (status, body) = send(&app, "POST", "/api/query", Some(json!({"query": "  "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_documents_lifecycle() {
    let app = app("ayush_support");
    let (status, body) = send(
        &app,
        "POST",
        "/api/documents",
        Some(json!({"title": "Pranayama", "text": "Bhramari calms the nervous system.", "source": "notes"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_i64().unwrap();
    assert_eq!(body["passages"], 1);

    let (status, _) = send(
        &app,
        "POST",
        "/api/documents",
        Some(json!({"title": "Again", "text": "Bhramari calms the nervous system."})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, "GET", "/api/documents", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["documents"][0]["title"], "Pranayama");

    let (status, body) = send(&app, "GET", &format!("/api/documents/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["document"]["source"], "notes");

    let (status, body) = send(
        &app,
        "POST",
        "/api/knowledge/search",
        Some(json!({"query": "bhramari"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["results"][0]["doc_id"], id);

    let (status, body) = send(&app, "DELETE", &format!("/api/documents/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"deleted": true, "id": id}));

    let (status, _) = send(&app, "DELETE", &format!("/api/documents/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "GET", &format!("/api/documents/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_llm_config_roundtrip() {
    let app = app("ayush_support");
    let (status, body) = send(&app, "GET", "/api/chat/config", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("groqApiKey").is_none());
    assert!(body["activeProvider"].is_null());

    let (status, body) = send(
        &app,
        "PUT",
        "/api/chat/config",
        Some(json!({"preferredProvider": "Groq", "groqApiKey": "gsk-test"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["preferredProvider"], "groq");
    assert_eq!(body["groqConfigured"], true);
    assert_eq!(body["activeProvider"], "groq");
    assert!(app.state.config.data_paths.llm_config_file.exists());

    let (_, health) = send(&app, "GET", "/api/health", None).await;
    assert_eq!(health["llmConfigured"], true);
}

const BOUNDARY: &str = "arogya-test-boundary";

/// Build a multipart body with one `file` field per (filename, content).
fn multipart_body(files: &[(&str, &str)]) -> String {
    let mut body = String::new();
    for (filename, content) in files {
        body.push_str(&format!(
            "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: text/plain\r\n\r\n{}\r\n",
            BOUNDARY, filename, content
        ));
    }
    body.push_str(&format!("--{}--\r\n", BOUNDARY));
    body
}

async fn upload(app: &TestApp, files: &[(&str, &str)]) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/documents/upload")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(files)))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_upload_documents() {
    let app = app("ayush_support");
    let uploads = app.state.config.data_paths.uploads.clone();

    let (status, body) = upload(
        &app,
        &[
            ("kapha.md", "# Kapha care\n\nDry ginger tea in the morning."),
            ("../../yoga-notes.md", "# Yoga notes\n\nTadasana improves posture."),
        ],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["errors"], json!([]));
    assert_eq!(body["uploaded"][0]["filename"], "kapha.md");
    let id = body["uploaded"][0]["id"].as_i64().unwrap();
    assert_eq!(body["uploaded"][1]["filename"], "yoga-notes.md");
    assert!(uploads.join("kapha.md").exists());
    assert!(uploads.join("yoga-notes.md").exists());
    assert!(!uploads.parent().unwrap().join("yoga-notes.md").exists());

    let (_, doc) = send(&app, "GET", &format!("/api/documents/{}", id), None).await;
    assert_eq!(doc["document"]["title"], "Kapha care");

    let (status, body) = upload(&app, &[("scan.pdf", "not really a pdf")]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["uploaded"], json!([]));
    assert_eq!(body["errors"][0]["filename"], "scan.pdf");
    assert!(body["errors"][0]["error"].is_string());
    assert!(!uploads.join("scan.pdf").exists());
}
