//! Arogya Chains: the specialised responders behind the healthcare workflow.
//!
//! Each chain wraps a [`LanguageModel`](arogya_llm::LanguageModel) and, where
//! it needs grounding, a [`Retriever`](arogya_knowledge::Retriever),
//! [`SearchTool`](arogya_tools::SearchTool) or
//! [`VideoSearch`](arogya_tools::VideoSearch). Every chain turns one text
//! query into one typed result.

pub mod ayush;
pub mod context;
pub mod guardrail;
pub mod hospital;
pub mod intent;
pub mod rag;
pub mod scheme;
pub mod symptom;
pub mod types;
pub mod web;
pub mod wellness;
pub mod yoga;

pub use ayush::AyushChain;
pub use guardrail::GuardrailChain;
pub use hospital::HospitalLocatorChain;
pub use intent::IntentClassifierChain;
pub use scheme::GovernmentSchemeChain;
pub use symptom::SymptomCheckerChain;
pub use types::*;
pub use wellness::MentalWellnessChain;
pub use yoga::YogaChain;

#[cfg(test)]
pub(crate) mod testing;
