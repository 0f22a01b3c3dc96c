//! Workflow options and response shapes.

use serde::Serialize;

use arogya_chains::{ChainAnswer, SymptomAssessment, YogaRecommendation};
use arogya_core::{ArogyaConfig, DEFAULT_RAG_TOP_K, DEFAULT_SEARCH_RESULTS};

pub const EMERGENCY_MESSAGE: &str =
    "⚠️ URGENT: Seek immediate medical attention. Call emergency services.";
pub const RECOMMENDATIONS_MESSAGE: &str = "Based on your symptoms, here are some recommendations:";
pub const UNKNOWN_INTENT_MESSAGE: &str =
    "I couldn't understand your request. Please try rephrasing.";
/// Used when the guardrail blocks without giving a reason.
pub const DEFAULT_BLOCK_REASON: &str = "This request can't be answered by the health assistant.";

/// Knobs shared by the chains the workflow builds.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowOptions {
    /// Web results per search-backed chain.
    pub search_results: usize,
    /// Passages per RAG-backed chain.
    pub rag_top_k: usize,
    /// YouTube channels yoga videos are restricted to.
    pub yoga_channel_ids: Vec<String>,
}

impl WorkflowOptions {
    pub fn from_config(config: &ArogyaConfig) -> Self {
        Self {
            search_results: config.tools.max_search_results,
            rag_top_k: config.rag_top_k,
            yoga_channel_ids: config.tools.yoga_channel_ids.clone(),
        }
    }
}

impl Default for WorkflowOptions {
    fn default() -> Self {
        Self {
            search_results: DEFAULT_SEARCH_RESULTS,
            rag_top_k: DEFAULT_RAG_TOP_K,
            yoga_channel_ids: Vec::new(),
        }
    }
}

/// Result of one workflow run.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum WorkflowResponse {
    /// The guardrail refused the request; nothing else ran.
    Blocked { reason: String },
    Completed(CompletedResponse),
}

impl WorkflowResponse {
    pub fn is_blocked(&self) -> bool {
        matches!(self, WorkflowResponse::Blocked { .. })
    }

    pub fn completed(&self) -> Option<&CompletedResponse> {
        match self {
            WorkflowResponse::Completed(c) => Some(c),
            WorkflowResponse::Blocked { .. } => None,
        }
    }
}

/// A routed answer plus any follow-up results.
#[derive(Debug, Clone, Serialize)]
pub struct CompletedResponse {
    /// Raw classifier label.
    pub intent: String,
    pub reasoning: Option<String>,
    pub output: WorkflowOutput,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symptom_assessment: Option<SymptomAssessment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hospital_locator: Option<ChainAnswer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ayurveda_recommendations: Option<ChainAnswer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yoga_recommendations: Option<YogaRecommendation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub general_guidance: Option<ChainAnswer>,
}

impl CompletedResponse {
    pub(crate) fn new(intent: String, reasoning: Option<String>, output: WorkflowOutput) -> Self {
        Self {
            intent,
            reasoning,
            output,
            symptom_assessment: None,
            hospital_locator: None,
            ayurveda_recommendations: None,
            yoga_recommendations: None,
            general_guidance: None,
        }
    }
}

/// The primary answer of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WorkflowOutput {
    Answer(ChainAnswer),
    Triage(TriageOutcome),
    Message(String),
}

/// Headline of a symptom run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriageOutcome {
    pub emergency: bool,
    pub message: String,
}

impl TriageOutcome {
    pub fn emergency() -> Self {
        Self {
            emergency: true,
            message: EMERGENCY_MESSAGE.into(),
        }
    }

    pub fn routine() -> Self {
        Self {
            emergency: false,
            message: RECOMMENDATIONS_MESSAGE.into(),
        }
    }
}
