//! Shared application state.

use std::sync::Arc;

use arogya_core::ArogyaConfig;
use arogya_knowledge::KnowledgeStore;
use arogya_llm::{LLMConfig, LanguageModel, RemoteLlm};
use arogya_tools::{SearchTool, VideoSearch, WebSearch, YouTubeClient};
use arogya_workflow::{HealthcareWorkflow, WorkflowOptions};
use parking_lot::RwLock;

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: ArogyaConfig,
    pub store: Arc<KnowledgeStore>,
    /// Shared with the remote LLM so config updates apply to the next request.
    pub llm_config: Arc<RwLock<LLMConfig>>,
    pub llm: Arc<dyn LanguageModel>,
    pub workflow: HealthcareWorkflow,
}

impl AppState {
    /// Wire the production collaborators: remote LLM, web search, YouTube.
    pub fn new(config: ArogyaConfig, store: KnowledgeStore) -> Self {
        let llm_config = Arc::new(RwLock::new(LLMConfig::load(
            &config.data_paths.llm_config_file,
        )));
        let llm: Arc<dyn LanguageModel> = Arc::new(RemoteLlm::new(llm_config.clone()));
        let search: Arc<dyn SearchTool> = Arc::new(WebSearch::new(&config.tools));
        let videos: Arc<dyn VideoSearch> =
            Arc::new(YouTubeClient::new(config.tools.youtube_api_key.clone()));

        Self::with_components(config, Arc::new(store), llm_config, llm, search, videos)
    }

    /// Assemble state from explicit collaborators.
    pub fn with_components(
        config: ArogyaConfig,
        store: Arc<KnowledgeStore>,
        llm_config: Arc<RwLock<LLMConfig>>,
        llm: Arc<dyn LanguageModel>,
        search: Arc<dyn SearchTool>,
        videos: Arc<dyn VideoSearch>,
    ) -> Self {
        let workflow = HealthcareWorkflow::new(
            llm.clone(),
            search,
            store.clone(),
            videos,
            WorkflowOptions::from_config(&config),
        );
        Self {
            config,
            store,
            llm_config,
            llm,
            workflow,
        }
    }
}
