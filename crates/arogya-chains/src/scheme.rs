//! Government health scheme lookup.

use std::sync::Arc;

use arogya_core::Result;
use arogya_llm::LanguageModel;
use arogya_tools::SearchTool;

use crate::types::ChainAnswer;
use crate::web::{WebAnswerChain, WebProfile};

static PROFILE: WebProfile = WebProfile {
    name: "government_scheme",
    query_prefix: "India government health scheme ",
    system_prompt: r#"You help people in India understand government health schemes such as
Ayushman Bharat PM-JAY, CGHS, ESIC, Janani Suraksha Yojana and state insurance programmes.

Using the web results provided, explain which schemes fit the user's situation, who is
eligible, what is covered, and how to apply (documents, portals, helplines). Cite scheme
names exactly. If the results do not cover the question, say so and point the user to the
official portal or the national helpline 14555. Keep the answer concise and practical."#,
};

pub struct GovernmentSchemeChain {
    inner: WebAnswerChain,
}

impl GovernmentSchemeChain {
    pub fn new(llm: Arc<dyn LanguageModel>, search: Arc<dyn SearchTool>, max_results: usize) -> Self {
        Self {
            inner: WebAnswerChain::new(llm, search, &PROFILE, max_results),
        }
    }

    pub async fn run(&self, query: &str) -> Result<ChainAnswer> {
        self.inner.run(query).await
    }
}
