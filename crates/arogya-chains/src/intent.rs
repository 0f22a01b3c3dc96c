//! Routing classifier.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use arogya_core::Result;
use arogya_llm::{json::parse_json, ChatMessage, CompletionOptions, LanguageModel};

use crate::types::{Intent, IntentClassification};

const SYSTEM_PROMPT: &str = r#"You route messages for a healthcare assistant. Pick exactly one label:

- government_scheme_support: government health schemes, insurance (Ayushman Bharat, PM-JAY, state schemes), eligibility, enrolment, benefits.
- mental_wellness_support: stress, anxiety, low mood, sleep trouble, loneliness, burnout, emotional wellbeing.
- ayush_support: ayurveda, yoga, unani, siddha, homeopathy, herbal or traditional remedies.
- symptom_checker: the user describes physical symptoms they or someone else is experiencing.
- facility_locator_support: finding hospitals, clinics, pharmacies, or doctors nearby.

Respond with a single JSON object and nothing else:
{"classification": "<label>", "reasoning": "one sentence"}"#;

/// Label used when the classifier output cannot be read.
pub const UNKNOWN_LABEL: &str = "unknown";

#[derive(Deserialize)]
struct RawClassification {
    classification: Option<String>,
    reasoning: Option<String>,
}

pub struct IntentClassifierChain {
    llm: Arc<dyn LanguageModel>,
}

impl IntentClassifierChain {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self { llm }
    }

    pub async fn run(&self, query: &str) -> Result<IntentClassification> {
        let raw = self
            .llm
            .complete(
                vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(query)],
                CompletionOptions::structured(),
            )
            .await?;

        let classification = match parse_json::<RawClassification>(&raw) {
            Ok(parsed) => IntentClassification {
                classification: Intent::from_label(
                    parsed
                        .classification
                        .as_deref()
                        .filter(|l| !l.trim().is_empty())
                        .unwrap_or(UNKNOWN_LABEL),
                ),
                reasoning: parsed.reasoning,
            },
            Err(e) => {
                warn!("Intent classifier output unreadable: {}", e);
                IntentClassification {
                    classification: Intent::Other(UNKNOWN_LABEL.into()),
                    reasoning: None,
                }
            }
        };
        debug!("Classified as {}", classification.classification);
        Ok(classification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeLlm;

    async fn classify(reply: &str) -> IntentClassification {
        IntentClassifierChain::new(Arc::new(FakeLlm::replying(reply)))
            .run("any query")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_known_label() {
        let c = classify(
            "```json\n{\"classification\": \"government_scheme_support\", \"reasoning\": \"asks about PM-JAY\"}\n```",
        )
        .await;
        assert_eq!(c.classification, Intent::GovernmentScheme);
        assert_eq!(c.reasoning.as_deref(), Some("asks about PM-JAY"));
    }

    #[tokio::test]
    async fn test_unknown_label_preserved() {
        let c = classify(r#"{"classification": "billing_question"}"#).await;
        assert_eq!(c.classification, Intent::Other("billing_question".into()));
        assert!(c.reasoning.is_none());
    }

    #[tokio::test]
    async fn test_unparseable_is_unknown() {
        assert_eq!(
            classify("no idea").await.classification,
            Intent::Other(UNKNOWN_LABEL.into())
        );
        assert_eq!(
            classify(r#"{"reasoning": "unsure"}"#).await.classification,
            Intent::Other(UNKNOWN_LABEL.into())
        );
    }
}
