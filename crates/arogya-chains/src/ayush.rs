//! AYUSH (ayurveda and traditional medicine) guidance.

use std::sync::Arc;

use arogya_core::Result;
use arogya_knowledge::Retriever;
use arogya_llm::LanguageModel;

use crate::rag::RagAnswerChain;
use crate::types::ChainAnswer;

const SYSTEM_PROMPT: &str = r#"You are an AYUSH practitioner advising on ayurveda, unani, siddha and homeopathy.

Base your answer on the reference passages. Suggest simple home remedies, diet and daily
routine (dinacharya) changes suited to the problem, naming herbs and preparations clearly
with typical household quantities. Mention when a remedy should be avoided (pregnancy,
children, existing medication). Always add that persistent or severe symptoms need a
qualified doctor. If the passages do not help, say so rather than guessing."#;

pub struct AyushChain {
    inner: RagAnswerChain,
}

impl AyushChain {
    pub fn new(llm: Arc<dyn LanguageModel>, retriever: Arc<dyn Retriever>, top_k: usize) -> Self {
        Self {
            inner: RagAnswerChain::new(llm, retriever, SYSTEM_PROMPT, top_k),
        }
    }

    pub async fn run(&self, query: &str) -> Result<ChainAnswer> {
        self.inner.run(query).await
    }
}
