//! The `LanguageModel` seam every chain calls through.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use arogya_core::{Error, Result};

use crate::config::LLMConfig;
use crate::json::parse_json;
use crate::providers;
use crate::types::{ChatMessage, CompletionOptions};

/// Stateless text completion.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Complete a conversation and return the full assistant text.
    async fn complete(&self, messages: Vec<ChatMessage>, options: CompletionOptions) -> Result<String>;

    /// Human-readable name of the backing model, for logs and status.
    fn describe(&self) -> String;
}

/// Run a system + user prompt and parse the JSON object in the reply.
pub async fn complete_json<T: DeserializeOwned>(
    llm: &dyn LanguageModel,
    system: &str,
    user: &str,
) -> Result<T> {
    let raw = llm
        .complete(
            vec![ChatMessage::system(system), ChatMessage::user(user)],
            CompletionOptions::structured(),
        )
        .await?;
    parse_json(&raw)
}

/// Run a system + user prompt and return the trimmed reply text.
pub async fn complete_text(llm: &dyn LanguageModel, system: &str, user: &str) -> Result<String> {
    let raw = llm
        .complete(
            vec![ChatMessage::system(system), ChatMessage::user(user)],
            CompletionOptions::answer(),
        )
        .await?;
    Ok(raw.trim().to_string())
}

/// Language model backed by an external provider API.
///
/// The provider is resolved from the shared config on every call, so updates
/// made through the config endpoint take effect without a restart.
pub struct RemoteLlm {
    client: Client,
    config: Arc<RwLock<LLMConfig>>,
}

impl RemoteLlm {
    pub fn new(config: Arc<RwLock<LLMConfig>>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &Arc<RwLock<LLMConfig>> {
        &self.config
    }
}

#[async_trait]
impl LanguageModel for RemoteLlm {
    async fn complete(&self, messages: Vec<ChatMessage>, options: CompletionOptions) -> Result<String> {
        let target = self
            .config
            .read()
            .resolve_provider()
            .ok_or_else(|| Error::Llm("No LLM provider configured".into()))?;

        debug!(
            "Completion via {} ({}), {} messages",
            target.provider,
            target.model,
            messages.len()
        );

        let stream = providers::stream_llm(&self.client, &target, messages, options);
        providers::collect(stream).await.map_err(Error::Llm)
    }

    fn describe(&self) -> String {
        match self.config.read().resolve_provider() {
            Some(t) => format!("{}/{}", t.provider, t.model),
            None => "unconfigured".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    struct Canned(&'static str);

    #[async_trait]
    impl LanguageModel for Canned {
        async fn complete(&self, messages: Vec<ChatMessage>, options: CompletionOptions) -> Result<String> {
            assert_eq!(messages[0].role, "system");
            assert_eq!(messages[1].role, "user");
            assert!(options.max_tokens > 0);
            Ok(self.0.to_string())
        }

        fn describe(&self) -> String {
            "canned".into()
        }
    }

    #[derive(Deserialize)]
    struct Label {
        classification: String,
    }

    #[tokio::test]
    async fn test_remote_without_provider_fails() {
        let llm = RemoteLlm::new(Arc::new(RwLock::new(LLMConfig::default())));
        let err = llm
            .complete(vec![ChatMessage::user("hi")], CompletionOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Llm(msg) if msg.contains("No LLM provider")));
        assert_eq!(llm.describe(), "unconfigured");
    }

    #[tokio::test]
    async fn test_complete_json_and_text() {
        let llm = Canned("```json\n{\"classification\": \"ayush_support\"}\n```");
        let label: Label = complete_json(&llm, "sys", "user").await.unwrap();
        assert_eq!(label.classification, "ayush_support");

        let llm = Canned("  Rest and hydrate.\n");
        assert_eq!(complete_text(&llm, "sys", "user").await.unwrap(), "Rest and hydrate.");
    }
}
