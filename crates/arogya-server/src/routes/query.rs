//! The healthcare query endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;

use arogya_workflow::WorkflowResponse;

use super::{bad_request, error_response, ApiError};
use crate::state::AppState;

/// Earlier turns included in the classification text.
const HISTORY_TURNS: usize = 4;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/query", post(run_query))
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryTurn {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    /// Prior conversation, oldest first.
    #[serde(default)]
    pub history: Vec<HistoryTurn>,
}

/// POST /api/query: run the workflow on one user message.
async fn run_query(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<WorkflowResponse>, ApiError> {
    let user_input = req.query.trim();
    if user_input.is_empty() {
        return Err(bad_request("query must not be empty"));
    }

    let for_classification = classification_text(user_input, &req.history);
    let response = state
        .workflow
        .run(user_input, &for_classification)
        .await
        .map_err(error_response)?;
    Ok(Json(response))
}

/// Text the guardrail and classifier see: recent turns, then the new message.
pub fn classification_text(user_input: &str, history: &[HistoryTurn]) -> String {
    let recent: Vec<String> = history
        .iter()
        .filter(|t| !t.content.trim().is_empty())
        .rev()
        .take(HISTORY_TURNS)
        .map(|t| format!("{}: {}", t.role, t.content.trim()))
        .collect();
    if recent.is_empty() {
        return user_input.to_string();
    }

    let mut lines: Vec<String> = recent.into_iter().rev().collect();
    lines.push(format!("user: {}", user_input));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(role: &str, content: &str) -> HistoryTurn {
        HistoryTurn {
            role: role.into(),
            content: content.into(),
        }
    }

    #[test]
    fn test_classification_text_without_history() {
        assert_eq!(classification_text("fever since morning", &[]), "fever since morning");
    }

    #[test]
    fn test_classification_text_keeps_recent_turns() {
        let history = vec![
            turn("user", "first"),
            turn("assistant", "second"),
            turn("user", "  "),
            turn("user", "third"),
            turn("assistant", "fourth"),
            turn("user", "fifth"),
        ];
        assert_eq!(
            classification_text("is it serious?", &history),
            "assistant: second\nuser: third\nassistant: fourth\nuser: fifth\nuser: is it serious?"
        );
    }
}
