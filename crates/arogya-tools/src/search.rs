//! Web search: Google Custom Search with a DuckDuckGo fallback.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use arogya_core::{Error, Result, SearchProvider, ToolsConfig};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Web search used by the search-backed chains.
#[async_trait]
pub trait SearchTool: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>>;
}

/// Search over the public web.
pub struct WebSearch {
    client: Client,
    provider: SearchProvider,
    google_key: Option<String>,
    google_engine_id: Option<String>,
}

impl WebSearch {
    pub fn new(config: &ToolsConfig) -> Self {
        Self {
            client: Client::new(),
            provider: config.search_provider,
            google_key: config.google_search_api_key.clone(),
            google_engine_id: config.google_search_engine_id.clone(),
        }
    }

    fn google_credentials(&self) -> Option<(&str, &str)> {
        match (&self.google_key, &self.google_engine_id) {
            (Some(k), Some(id)) if self.provider == SearchProvider::Google => {
                Some((k.as_str(), id.as_str()))
            }
            _ => None,
        }
    }

    async fn google_search(&self, query: &str, key: &str, engine_id: &str) -> Result<Vec<SearchResult>> {
        let url = format!(
            "https://www.googleapis.com/customsearch/v1?key={}&cx={}&q={}",
            key,
            engine_id,
            urlencoding::encode(query)
        );
        let payload = self.get_json(&url, "Google search").await?;
        Ok(parse_google(&payload))
    }

    async fn duckduckgo_search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let url = format!(
            "https://api.duckduckgo.com/?q={}&format=json&no_redirect=1&no_html=1",
            urlencoding::encode(query)
        );
        let payload = self.get_json(&url, "DuckDuckGo search").await?;
        Ok(parse_duckduckgo(&payload))
    }

    async fn get_json(&self, url: &str, what: &str) -> Result<Value> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| request_failed(what, e))?;

        if !response.status().is_success() {
            return Err(Error::Search(format!(
                "{} failed: {}",
                what,
                response.status()
            )));
        }
        response
            .json()
            .await
            .map_err(|e| Error::Search(format!("{} returned invalid JSON: {}", what, e.without_url())))
    }
}

/// Transport failure as a search error. The URL is dropped because it
/// carries the API key.
pub(crate) fn request_failed(what: &str, e: reqwest::Error) -> Error {
    Error::Search(format!("{} request failed: {}", what, e.without_url()))
}

#[async_trait]
impl SearchTool for WebSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        if let Some((key, engine_id)) = self.google_credentials() {
            match self.google_search(query, key, engine_id).await {
                Ok(results) if !results.is_empty() => {
                    debug!("Google returned {} results for {:?}", results.len(), query);
                    return Ok(truncate(results, max_results));
                }
                Ok(_) => debug!("Google returned nothing for {:?}; trying DuckDuckGo", query),
                Err(e) => warn!("{}; falling back to DuckDuckGo", e),
            }
        }

        let results = self.duckduckgo_search(query).await?;
        debug!("DuckDuckGo returned {} results for {:?}", results.len(), query);
        Ok(truncate(results, max_results))
    }
}

fn truncate(mut results: Vec<SearchResult>, max_results: usize) -> Vec<SearchResult> {
    results.truncate(max_results);
    results
}

fn str_field(item: &Value, key: &str) -> String {
    item.get(key)
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}

fn parse_google(payload: &Value) -> Vec<SearchResult> {
    payload
        .get("items")
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .map(|item| SearchResult {
                    title: str_field(item, "title"),
                    url: str_field(item, "link"),
                    snippet: str_field(item, "snippet"),
                })
                .filter(|r| !r.title.is_empty() && !r.url.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

fn parse_duckduckgo(payload: &Value) -> Vec<SearchResult> {
    let mut results = Vec::new();

    let abstract_text = str_field(payload, "AbstractText");
    let abstract_url = str_field(payload, "AbstractURL");
    if !abstract_text.is_empty() && !abstract_url.is_empty() {
        let heading = str_field(payload, "Heading");
        results.push(SearchResult {
            title: if heading.is_empty() {
                first_segment(&abstract_text)
            } else {
                heading
            },
            url: abstract_url,
            snippet: abstract_text,
        });
    }

    for key in ["Results", "RelatedTopics"] {
        if let Some(items) = payload.get(key).and_then(|v| v.as_array()) {
            extract_ddg_topics(items, &mut results);
        }
    }
    results
}

fn first_segment(text: &str) -> String {
    text.split(" - ").next().unwrap_or(text).to_string()
}

fn extract_ddg_topics(items: &[Value], results: &mut Vec<SearchResult>) {
    for item in items {
        if let Some(topics) = item.get("Topics").and_then(|v| v.as_array()) {
            extract_ddg_topics(topics, results);
            continue;
        }
        let text = str_field(item, "Text");
        let url = str_field(item, "FirstURL");
        if text.is_empty() || url.is_empty() {
            continue;
        }
        results.push(SearchResult {
            title: first_segment(&text),
            url,
            snippet: text,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_google_skips_incomplete_items() {
        let payload = json!({
            "items": [
                {"title": "Ayushman Bharat PM-JAY", "link": "https://pmjay.gov.in", "snippet": "Health cover of Rs 5 lakh"},
                {"title": "", "link": "https://example.com"},
                {"title": "No link"}
            ]
        });
        let results = parse_google(&payload);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].url, "https://pmjay.gov.in");
        assert!(parse_google(&json!({})).is_empty());
    }

    #[test]
    fn test_parse_duckduckgo_abstract_and_nested_topics() {
        let payload = json!({
            "Heading": "Pranayama",
            "AbstractText": "Pranayama is the practice of breath control in yoga.",
            "AbstractURL": "https://en.wikipedia.org/wiki/Pranayama",
            "RelatedTopics": [
                {"Text": "Kapalabhati - a breathing technique", "FirstURL": "https://duckduckgo.com/Kapalabhati"},
                {"Name": "See also", "Topics": [
                    {"Text": "Nadi Shodhana - alternate nostril", "FirstURL": "https://duckduckgo.com/Nadi"}
                ]},
                {"Text": "", "FirstURL": ""}
            ]
        });
        let results = parse_duckduckgo(&payload);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].title, "Pranayama");
        assert_eq!(results[1].title, "Kapalabhati");
        assert_eq!(results[2].snippet, "Nadi Shodhana - alternate nostril");
    }

    #[test]
    fn test_google_credentials_need_provider_and_both_keys() {
        let mut config = ToolsConfig::default();
        config.google_search_api_key = Some("k".into());
        assert!(WebSearch::new(&config).google_credentials().is_none());

        config.google_search_engine_id = Some("cx".into());
        assert_eq!(WebSearch::new(&config).google_credentials(), Some(("k", "cx")));

        config.search_provider = SearchProvider::DuckDuckGo;
        assert!(WebSearch::new(&config).google_credentials().is_none());
    }

    #[tokio::test]
    async fn test_request_error_hides_key() {
        // Nothing listens on port 1; the connection is refused locally.
        let err = Client::new()
            .get("http://127.0.0.1:1/customsearch/v1?key=SECRET-KEY-123&cx=cx")
            .send()
            .await
            .unwrap_err();
        let message = request_failed("Google search", err).to_string();
        assert!(message.contains("Google search request failed"));
        assert!(!message.contains("SECRET-KEY-123"), "{}", message);
    }

    #[test]
    fn test_truncate() {
        let r = SearchResult {
            title: "t".into(),
            url: "u".into(),
            snippet: "s".into(),
        };
        assert_eq!(truncate(vec![r.clone(), r.clone(), r], 2).len(), 2);
    }
}
