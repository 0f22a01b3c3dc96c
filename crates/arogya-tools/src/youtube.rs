//! YouTube Data API v3 video search.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use arogya_core::{Error, Result};

use crate::search::request_failed;

const SEARCH_URL: &str = "https://www.googleapis.com/youtube/v3/search";

/// A video returned by the search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoResult {
    pub video_id: String,
    pub title: String,
    pub channel_title: String,
    pub url: String,
    pub thumbnail: String,
}

/// Video lookup used by the yoga chain.
#[async_trait]
pub trait VideoSearch: Send + Sync {
    /// Search videos for `query`, restricted to `channel_ids` when non-empty.
    async fn search_videos(
        &self,
        query: &str,
        channel_ids: &[String],
        max_results: usize,
    ) -> Result<Vec<VideoResult>>;
}

pub struct YouTubeClient {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
}

impl YouTubeClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            endpoint: SEARCH_URL.to_string(),
        }
    }

    #[cfg(test)]
    fn with_endpoint(api_key: &str, endpoint: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: Some(api_key.to_string()),
            endpoint: endpoint.to_string(),
        }
    }

    async fn search_once(
        &self,
        api_key: &str,
        query: &str,
        channel_id: Option<&str>,
        max_results: usize,
    ) -> Result<Vec<VideoResult>> {
        let max = max_results.clamp(1, 50).to_string();
        let mut params = vec![
            ("part", "snippet"),
            ("type", "video"),
            ("safeSearch", "strict"),
            ("q", query),
            ("maxResults", max.as_str()),
            ("key", api_key),
        ];
        if let Some(id) = channel_id {
            params.push(("channelId", id));
        }

        let response = self
            .client
            .get(&self.endpoint)
            .query(&params)
            .send()
            .await
            .map_err(|e| request_failed("YouTube", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Search(format!("YouTube API error {}: {}", status, body)));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| Error::Search(format!("YouTube returned invalid JSON: {}", e.without_url())))?;
        Ok(parse_search(&payload))
    }
}

#[async_trait]
impl VideoSearch for YouTubeClient {
    async fn search_videos(
        &self,
        query: &str,
        channel_ids: &[String],
        max_results: usize,
    ) -> Result<Vec<VideoResult>> {
        let Some(api_key) = self.api_key.as_deref() else {
            warn!("YOUTUBE_API_KEY not set; skipping video search");
            return Ok(Vec::new());
        };
        if max_results == 0 {
            return Ok(Vec::new());
        }

        let mut videos = Vec::new();
        if channel_ids.is_empty() {
            videos = self.search_once(api_key, query, None, max_results).await?;
        } else {
            for channel_id in channel_ids {
                if videos.len() >= max_results {
                    break;
                }
                let found = self
                    .search_once(api_key, query, Some(channel_id), max_results)
                    .await?;
                videos.extend(found);
            }
        }
        videos.truncate(max_results);
        debug!("YouTube returned {} videos for {:?}", videos.len(), query);
        Ok(videos)
    }
}

fn parse_search(payload: &Value) -> Vec<VideoResult> {
    let Some(items) = payload.get("items").and_then(|v| v.as_array()) else {
        return Vec::new();
    };
    items.iter().filter_map(parse_item).collect()
}

fn parse_item(item: &Value) -> Option<VideoResult> {
    let video_id = item["id"]["videoId"].as_str()?.to_string();
    let snippet = &item["snippet"];
    let thumbnails = &snippet["thumbnails"];
    let thumbnail = ["high", "medium", "default"]
        .iter()
        .find_map(|size| thumbnails[size]["url"].as_str())
        .unwrap_or("")
        .to_string();

    Some(VideoResult {
        url: format!("https://www.youtube.com/watch?v={}", video_id),
        title: snippet["title"].as_str().unwrap_or("").to_string(),
        channel_title: snippet["channelTitle"].as_str().unwrap_or("").to_string(),
        thumbnail,
        video_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_search_items() {
        let payload = json!({
            "items": [
                {
                    "id": {"kind": "youtube#video", "videoId": "abc123"},
                    "snippet": {
                        "title": "Pranayama for beginners",
                        "channelTitle": "Yoga With Ease",
                        "thumbnails": {
                            "default": {"url": "https://i.ytimg.com/vi/abc123/default.jpg"},
                            "medium": {"url": "https://i.ytimg.com/vi/abc123/mqdefault.jpg"}
                        }
                    }
                },
                {"id": {"kind": "youtube#channel", "channelId": "UCxyz"}, "snippet": {}}
            ]
        });
        let videos = parse_search(&payload);
        assert_eq!(videos.len(), 1);
        let v = &videos[0];
        assert_eq!(v.url, "https://www.youtube.com/watch?v=abc123");
        assert_eq!(v.channel_title, "Yoga With Ease");
        assert_eq!(v.thumbnail, "https://i.ytimg.com/vi/abc123/mqdefault.jpg");
    }

    #[test]
    fn test_video_serializes_camel_case() {
        let v = VideoResult {
            video_id: "id".into(),
            title: "t".into(),
            channel_title: "c".into(),
            url: "u".into(),
            thumbnail: "th".into(),
        };
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["channelTitle"], "c");
        assert_eq!(json["videoId"], "id");
    }

    #[tokio::test]
    async fn test_request_error_hides_key() {
        let client = YouTubeClient::with_endpoint("SECRET-KEY-123", "http://127.0.0.1:1/youtube/v3/search");
        let err = client.search_videos("yoga", &[], 1).await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("YouTube request failed"));
        assert!(!message.contains("SECRET-KEY-123"), "{}", message);
    }

    #[tokio::test]
    async fn test_missing_key_returns_empty() {
        let client = YouTubeClient::new(None);
        let videos = client
            .search_videos("pranayama for beginners", &[], 2)
            .await
            .unwrap();
        assert!(videos.is_empty());
    }
}
