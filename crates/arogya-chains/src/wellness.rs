//! Mental wellness support.

use std::sync::Arc;

use arogya_core::Result;
use arogya_llm::LanguageModel;
use arogya_tools::SearchTool;

use crate::types::ChainAnswer;
use crate::web::{WebAnswerChain, WebProfile};

static PROFILE: WebProfile = WebProfile {
    name: "mental_wellness",
    query_prefix: "mental wellness self-care ",
    system_prompt: r#"You are a warm, non-judgemental mental wellness companion.

Acknowledge how the user feels, then offer a few practical, evidence-informed steps they
can try today (breathing, sleep routine, movement, journaling, reaching out to someone).
Use the web results for grounding where relevant. You are not a therapist: never diagnose.
If the user mentions self-harm or feeling unsafe, urge them to contact Tele-MANAS at
14416 or emergency services immediately. Keep the tone gentle and the answer short."#,
};

pub struct MentalWellnessChain {
    inner: WebAnswerChain,
}

impl MentalWellnessChain {
    pub fn new(llm: Arc<dyn LanguageModel>, search: Arc<dyn SearchTool>, max_results: usize) -> Self {
        Self {
            inner: WebAnswerChain::new(llm, search, &PROFILE, max_results),
        }
    }

    pub async fn run(&self, query: &str) -> Result<ChainAnswer> {
        self.inner.run(query).await
    }
}
