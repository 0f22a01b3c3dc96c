//! External LLM provider streaming implementations.
//!
//! Each provider streams tokens via SSE. OpenAI and Groq share the same
//! event format; Anthropic uses its own. Non-streaming completions are built
//! by draining the stream (see [`collect`]).

use std::pin::Pin;

use futures::Stream;
use reqwest::Client;
use serde_json::{json, Value};
use tokio_stream::StreamExt;
use tracing::{debug, error};

use crate::config::ResolvedProvider;
use crate::types::{ChatMessage, CompletionOptions, LLMProvider};

const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
const GROQ_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Boxed stream type for returning different stream implementations.
pub type BoxedStream = Pin<Box<dyn Stream<Item = StreamChunk> + Send>>;

/// A single streamed token or error.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamChunk {
    Token(String),
    Done { tokens_used: usize },
    Error(String),
}

/// What one SSE `data:` payload means for the caller.
#[derive(Debug, PartialEq)]
enum SseEvent {
    Token(String),
    Stop,
    Failure(String),
    Ignore,
}

/// Stream tokens from the resolved provider.
pub fn stream_llm(
    client: &Client,
    target: &ResolvedProvider,
    messages: Vec<ChatMessage>,
    options: CompletionOptions,
) -> BoxedStream {
    let (url, request) = match target.provider {
        LLMProvider::OpenAI => (OPENAI_URL, openai_request(client, OPENAI_URL, target)),
        LLMProvider::Groq => (GROQ_URL, openai_request(client, GROQ_URL, target)),
        LLMProvider::Anthropic => (ANTHROPIC_URL, anthropic_request(client, target)),
    };
    let body = match target.provider {
        LLMProvider::Anthropic => anthropic_body(&messages, &target.model, options),
        _ => openai_body(&messages, &target.model, options),
    };
    debug!("Streaming from {} with model {}", url, target.model);

    Box::pin(sse_stream(request.json(&body), target.provider))
}

/// Drain a token stream into the full completion text.
pub async fn collect(stream: BoxedStream) -> Result<String, String> {
    tokio::pin!(stream);
    let mut text = String::new();
    while let Some(chunk) = stream.next().await {
        match chunk {
            StreamChunk::Token(t) => text.push_str(&t),
            StreamChunk::Done { tokens_used } => {
                debug!("Completion finished after {} tokens", tokens_used);
                break;
            }
            StreamChunk::Error(e) => return Err(e),
        }
    }
    Ok(text)
}

fn openai_request(client: &Client, url: &str, target: &ResolvedProvider) -> reqwest::RequestBuilder {
    client
        .post(url)
        .header("Authorization", format!("Bearer {}", target.api_key))
        .header("Content-Type", "application/json")
}

fn anthropic_request(client: &Client, target: &ResolvedProvider) -> reqwest::RequestBuilder {
    client
        .post(ANTHROPIC_URL)
        .header("x-api-key", &target.api_key)
        .header("anthropic-version", ANTHROPIC_VERSION)
        .header("Content-Type", "application/json")
}

fn openai_body(messages: &[ChatMessage], model: &str, options: CompletionOptions) -> Value {
    let msgs: Vec<Value> = messages
        .iter()
        .map(|m| json!({"role": m.role, "content": m.content}))
        .collect();
    json!({
        "model": model,
        "messages": msgs,
        "temperature": options.temperature,
        "max_tokens": options.max_tokens,
        "stream": true,
    })
}

/// Anthropic takes the system prompt as a top-level field.
fn anthropic_body(messages: &[ChatMessage], model: &str, options: CompletionOptions) -> Value {
    let system: Vec<&str> = messages
        .iter()
        .filter(|m| m.role == "system")
        .map(|m| m.content.as_str())
        .collect();
    let conv: Vec<Value> = messages
        .iter()
        .filter(|m| m.role != "system")
        .map(|m| json!({"role": m.role, "content": m.content}))
        .collect();

    let mut body = json!({
        "model": model,
        "messages": conv,
        "temperature": options.temperature,
        "max_tokens": options.max_tokens,
        "stream": true,
    });
    if !system.is_empty() {
        body["system"] = json!(system.join("\n\n"));
    }
    body
}

fn parse_openai_event(data: &str) -> SseEvent {
    if data.trim() == "[DONE]" {
        return SseEvent::Stop;
    }
    let Ok(parsed) = serde_json::from_str::<Value>(data) else {
        return SseEvent::Ignore;
    };
    if let Some(msg) = parsed["error"]["message"].as_str() {
        return SseEvent::Failure(msg.to_string());
    }
    match parsed["choices"][0]["delta"]["content"].as_str() {
        Some(content) if !content.is_empty() => SseEvent::Token(content.to_string()),
        _ => SseEvent::Ignore,
    }
}

fn parse_anthropic_event(data: &str) -> SseEvent {
    let Ok(parsed) = serde_json::from_str::<Value>(data) else {
        return SseEvent::Ignore;
    };
    match parsed["type"].as_str() {
        Some("content_block_delta") => match parsed["delta"]["text"].as_str() {
            Some(text) if !text.is_empty() => SseEvent::Token(text.to_string()),
            _ => SseEvent::Ignore,
        },
        Some("message_stop") => SseEvent::Stop,
        Some("error") => SseEvent::Failure(
            parsed["error"]["message"]
                .as_str()
                .unwrap_or("Unknown error")
                .to_string(),
        ),
        _ => SseEvent::Ignore,
    }
}

/// Raw SSE bytes awaiting a newline. Lines are decoded only once complete,
/// so a character split across network chunks survives intact.
#[derive(Default)]
struct LineBuffer {
    bytes: Vec<u8>,
}

impl LineBuffer {
    fn push(&mut self, chunk: &[u8]) {
        self.bytes.extend_from_slice(chunk);
    }

    fn next_line(&mut self) -> Option<String> {
        let end = self.bytes.iter().position(|b| *b == b'\n')?;
        let line: Vec<u8> = self.bytes.drain(..=end).collect();
        Some(String::from_utf8_lossy(&line).trim().to_string())
    }
}

fn sse_stream(
    request: reqwest::RequestBuilder,
    provider: LLMProvider,
) -> impl Stream<Item = StreamChunk> + Send + 'static {
    let parse: fn(&str) -> SseEvent = match provider {
        LLMProvider::Anthropic => parse_anthropic_event,
        LLMProvider::OpenAI | LLMProvider::Groq => parse_openai_event,
    };

    async_stream::stream! {
        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                yield StreamChunk::Error(format!("Request failed: {}", e));
                return;
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            yield StreamChunk::Error(format!("API error {}: {}", status, body));
            return;
        }

        let mut stream = response.bytes_stream();
        let mut buffer = LineBuffer::default();
        let mut token_count = 0usize;

        while let Some(chunk) = stream.next().await {
            let bytes = match chunk {
                Ok(b) => b,
                Err(e) => {
                    yield StreamChunk::Error(format!("Stream read error: {}", e));
                    return;
                }
            };

            buffer.push(&bytes);

            while let Some(line) = buffer.next_line() {
                // Skip keep-alives and "event:" lines; payloads come on "data:".
                let Some(data) = line.strip_prefix("data:") else {
                    continue;
                };
                match parse(data.trim_start()) {
                    SseEvent::Token(text) => {
                        token_count += 1;
                        yield StreamChunk::Token(text);
                    }
                    SseEvent::Stop => {
                        yield StreamChunk::Done { tokens_used: token_count };
                        return;
                    }
                    SseEvent::Failure(msg) => {
                        error!("{} stream error: {}", provider, msg);
                        yield StreamChunk::Error(msg);
                        return;
                    }
                    SseEvent::Ignore => {}
                }
            }
        }

        yield StreamChunk::Done { tokens_used: token_count };
    }
}

/// Test an API key by making a minimal request.
pub async fn test_api_key(provider: &str, api_key: &str) -> Result<(), String> {
    let client = Client::new();

    let request = match provider {
        "openai" => client
            .get("https://api.openai.com/v1/models")
            .header("Authorization", format!("Bearer {}", api_key)),
        "groq" => client
            .get("https://api.groq.com/openai/v1/models")
            .header("Authorization", format!("Bearer {}", api_key)),
        "anthropic" => client
            .post(ANTHROPIC_URL)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&json!({
                "model": crate::config::DEFAULT_ANTHROPIC_MODEL,
                "max_tokens": 1,
                "messages": [{"role": "user", "content": "Hi"}],
            })),
        _ => return Err(format!("Unknown provider: {}", provider)),
    };

    let resp = request.send().await.map_err(|e| e.to_string())?;
    let status = resp.status();
    // Anthropic answers 400 for quota/model problems once the key itself is accepted.
    if status.is_success() || (provider == "anthropic" && status.as_u16() == 400) {
        Ok(())
    } else {
        Err(format!("API returned status {}", status))
    }
}
