//! Answers grounded on live web search.

use std::sync::Arc;

use tracing::debug;

use arogya_core::Result;
use arogya_llm::{complete_text, LanguageModel};
use arogya_tools::SearchTool;

use crate::context::{format_search_results, grounded_prompt, search_sources};
use crate::types::ChainAnswer;

/// What a search-backed chain asks for and how it frames the answer.
pub struct WebProfile {
    pub name: &'static str,
    /// Prepended to the user query before searching.
    pub query_prefix: &'static str,
    pub system_prompt: &'static str,
}

/// Search, then answer from the results.
pub struct WebAnswerChain {
    llm: Arc<dyn LanguageModel>,
    search: Arc<dyn SearchTool>,
    profile: &'static WebProfile,
    max_results: usize,
}

impl WebAnswerChain {
    pub fn new(
        llm: Arc<dyn LanguageModel>,
        search: Arc<dyn SearchTool>,
        profile: &'static WebProfile,
        max_results: usize,
    ) -> Self {
        Self {
            llm,
            search,
            profile,
            max_results: max_results.max(1),
        }
    }

    pub fn search_query(&self, query: &str) -> String {
        format!("{}{}", self.profile.query_prefix, query.trim())
    }

    pub async fn run(&self, query: &str) -> Result<ChainAnswer> {
        let search_query = self.search_query(query);
        let results = self.search.search(&search_query, self.max_results).await?;
        debug!(
            "{}: {} web results for {:?}",
            self.profile.name,
            results.len(),
            search_query
        );

        let prompt = grounded_prompt("Web results", &format_search_results(&results), query);
        let text = complete_text(self.llm.as_ref(), self.profile.system_prompt, &prompt).await?;
        Ok(ChainAnswer {
            text,
            sources: search_sources(&results),
        })
    }
}
