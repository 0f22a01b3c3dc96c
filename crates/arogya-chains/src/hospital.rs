//! Hospital and clinic locator.

use std::sync::Arc;

use arogya_core::Result;
use arogya_llm::LanguageModel;
use arogya_tools::SearchTool;

use crate::types::ChainAnswer;
use crate::web::{WebAnswerChain, WebProfile};

static PROFILE: WebProfile = WebProfile {
    name: "hospital_locator",
    query_prefix: "",
    system_prompt: r#"You help users in India find hospitals, clinics and emergency care.

From the web results, list the most relevant facilities with name, area, contact number and
whether they offer 24x7 emergency services when the results say so. Do not invent addresses
or phone numbers. If the user's location is unclear, ask for their city or PIN code. For any
emergency, remind them to call 108 (ambulance) or 112 immediately."#,
};

pub struct HospitalLocatorChain {
    inner: WebAnswerChain,
}

impl HospitalLocatorChain {
    pub fn new(llm: Arc<dyn LanguageModel>, search: Arc<dyn SearchTool>, max_results: usize) -> Self {
        Self {
            inner: WebAnswerChain::new(llm, search, &PROFILE, max_results),
        }
    }

    pub async fn run(&self, query: &str) -> Result<ChainAnswer> {
        self.inner.run(query).await
    }
}
