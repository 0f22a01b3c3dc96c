//! Healthcare workflow: guardrail, intent classification, routed chains.
//!
//! [`HealthcareWorkflow::run`] screens the request, classifies it and hands
//! the clean user text to the matching chain. Symptom reports fan out into
//! follow-up chains (ayurveda, yoga, wellness) or an emergency hospital
//! lookup.

pub mod orchestrator;
pub mod types;

pub use orchestrator::HealthcareWorkflow;
pub use types::*;
