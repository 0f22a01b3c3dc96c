//! Yoga and pranayama recommendations with a demonstration video.

use std::sync::Arc;

use tracing::{debug, warn};

use arogya_core::Result;
use arogya_knowledge::Retriever;
use arogya_llm::LanguageModel;
use arogya_tools::{VideoResult, VideoSearch};

use crate::rag::RagAnswerChain;
use crate::types::YogaRecommendation;

const SYSTEM_PROMPT: &str = r#"You are a certified yoga therapist.

Using the reference passages, recommend three to five asanas or pranayama practices for the
user's need. For each, give the name (Sanskrit and English), how to do it in two or three
steps, how long to hold or repeat it, and who should avoid it. Finish with one line on
building a gentle daily routine. Do not recommend anything strenuous for acute pain,
pregnancy or recent surgery without a teacher's supervision."#;

pub struct YogaChain {
    inner: RagAnswerChain,
    videos: Arc<dyn VideoSearch>,
    channel_ids: Vec<String>,
}

impl YogaChain {
    pub fn new(
        llm: Arc<dyn LanguageModel>,
        retriever: Arc<dyn Retriever>,
        videos: Arc<dyn VideoSearch>,
        channel_ids: Vec<String>,
        top_k: usize,
    ) -> Self {
        Self {
            inner: RagAnswerChain::new(llm, retriever, SYSTEM_PROMPT, top_k),
            videos,
            channel_ids,
        }
    }

    pub async fn run(&self, query: &str) -> Result<YogaRecommendation> {
        let answer = self.inner.run(query).await?;
        let video = self.find_video(query).await;
        Ok(YogaRecommendation {
            text: answer.text,
            sources: answer.sources,
            video,
        })
    }

    /// First matching video; lookup failures only cost the video.
    async fn find_video(&self, query: &str) -> Option<VideoResult> {
        match self.videos.search_videos(query, &self.channel_ids, 1).await {
            Ok(videos) => {
                let video = videos.into_iter().next();
                if video.is_none() {
                    debug!("No yoga video for {:?}", query);
                }
                video
            }
            Err(e) => {
                warn!("Yoga video lookup failed: {}", e);
                None
            }
        }
    }
}
