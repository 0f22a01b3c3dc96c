//! Answers grounded on knowledge-store passages.

use std::sync::Arc;

use tracing::debug;

use arogya_core::Result;
use arogya_knowledge::Retriever;
use arogya_llm::{complete_text, LanguageModel};

use crate::context::{format_passages, grounded_prompt, passage_sources};
use crate::types::ChainAnswer;

/// Retrieve `top_k` passages, then answer from them.
pub struct RagAnswerChain {
    llm: Arc<dyn LanguageModel>,
    retriever: Arc<dyn Retriever>,
    system_prompt: &'static str,
    top_k: usize,
}

impl RagAnswerChain {
    pub fn new(
        llm: Arc<dyn LanguageModel>,
        retriever: Arc<dyn Retriever>,
        system_prompt: &'static str,
        top_k: usize,
    ) -> Self {
        Self {
            llm,
            retriever,
            system_prompt,
            top_k: top_k.max(1),
        }
    }

    pub async fn run(&self, query: &str) -> Result<ChainAnswer> {
        let passages = self.retriever.retrieve(query, self.top_k)?;
        debug!("Retrieved {} passages for {:?}", passages.len(), query);

        let prompt = grounded_prompt("Reference passages", &format_passages(&passages), query);
        let text = complete_text(self.llm.as_ref(), self.system_prompt, &prompt).await?;
        Ok(ChainAnswer {
            text,
            sources: passage_sources(&passages),
        })
    }
}
