//! In-crate fakes for the chain collaborators.

use async_trait::async_trait;
use parking_lot::Mutex;

use arogya_core::{Error, Result};
use arogya_knowledge::{Passage, Retriever};
use arogya_llm::{ChatMessage, CompletionOptions, LanguageModel};
use arogya_tools::{SearchResult, SearchTool, VideoResult, VideoSearch};

/// Replies with a fixed string and records every (system, user) pair.
pub struct FakeLlm {
    reply: std::result::Result<String, String>,
    pub calls: Mutex<Vec<(String, String)>>,
}

impl FakeLlm {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn last_user_prompt(&self) -> String {
        self.calls.lock().last().map(|c| c.1.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LanguageModel for FakeLlm {
    async fn complete(&self, messages: Vec<ChatMessage>, _options: CompletionOptions) -> Result<String> {
        let system = messages
            .iter()
            .find(|m| m.role == "system")
            .map(|m| m.content.clone())
            .unwrap_or_default();
        let user = messages
            .iter()
            .rev()
            .find(|m| m.role == "user")
            .map(|m| m.content.clone())
            .unwrap_or_default();
        self.calls.lock().push((system, user));
        self.reply.clone().map_err(Error::Llm)
    }

    fn describe(&self) -> String {
        "fake".into()
    }
}

#[derive(Default)]
pub struct FakeSearch {
    pub results: Vec<SearchResult>,
    pub queries: Mutex<Vec<String>>,
}

impl FakeSearch {
    pub fn with(results: Vec<SearchResult>) -> Self {
        Self {
            results,
            queries: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl SearchTool for FakeSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        self.queries.lock().push(query.to_string());
        Ok(self.results.iter().take(max_results).cloned().collect())
    }
}

#[derive(Default)]
pub struct FakeRetriever {
    pub passages: Vec<Passage>,
}

impl Retriever for FakeRetriever {
    fn retrieve(&self, _query: &str, top_k: usize) -> Result<Vec<Passage>> {
        Ok(self.passages.iter().take(top_k).cloned().collect())
    }
}

pub struct FakeVideos {
    pub videos: Result<Vec<VideoResult>>,
    pub requests: Mutex<Vec<(String, Vec<String>, usize)>>,
}

impl FakeVideos {
    pub fn with(videos: Result<Vec<VideoResult>>) -> Self {
        Self {
            videos,
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl VideoSearch for FakeVideos {
    async fn search_videos(
        &self,
        query: &str,
        channel_ids: &[String],
        max_results: usize,
    ) -> Result<Vec<VideoResult>> {
        self.requests
            .lock()
            .push((query.to_string(), channel_ids.to_vec(), max_results));
        match &self.videos {
            Ok(v) => Ok(v.iter().take(max_results).cloned().collect()),
            Err(e) => Err(Error::Search(e.to_string())),
        }
    }
}

pub fn passage(doc_id: i64, title: &str, text: &str) -> Passage {
    Passage {
        passage_id: doc_id * 100,
        doc_id,
        title: title.into(),
        heading: None,
        text: text.into(),
        score: 1.0,
        source: None,
    }
}

pub fn result(title: &str, url: &str) -> SearchResult {
    SearchResult {
        title: title.into(),
        url: url.into(),
        snippet: format!("About {}", title),
    }
}

pub fn video(id: &str) -> VideoResult {
    VideoResult {
        video_id: id.into(),
        title: format!("Video {}", id),
        channel_title: "Yoga Channel".into(),
        url: format!("https://www.youtube.com/watch?v={}", id),
        thumbnail: String::new(),
    }
}
