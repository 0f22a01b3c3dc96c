//! LLM access for the healthcare chains.
//!
//! Every chain talks to a [`LanguageModel`]. The production implementation,
//! [`RemoteLlm`], calls an external provider (OpenAI, Anthropic, Groq) chosen
//! from the persisted [`LLMConfig`]. Structured answers are pulled out of the
//! completion text with the helpers in [`json`].

pub mod client;
pub mod config;
pub mod json;
pub mod providers;
pub mod types;

pub use client::{complete_json, complete_text, LanguageModel, RemoteLlm};
pub use config::{LLMConfig, ResolvedProvider};
pub use types::*;
