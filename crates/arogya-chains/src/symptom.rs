//! Symptom triage.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use arogya_core::Result;
use arogya_llm::{complete_json, LanguageModel};

use crate::types::SymptomAssessment;

const SYSTEM_PROMPT: &str = r#"You are a triage nurse reading a patient's message. Extract a structured assessment.

- symptoms: short lowercase phrases, one per symptom ("fever", "chest pain").
- severity: integer 1-10 for how serious the overall picture is.
- duration: how long the symptoms have lasted, if stated.
- is_emergency: true ONLY for red flags needing immediate care, such as chest pain with
  breathlessness, signs of stroke, severe bleeding, loss of consciousness, seizures,
  suicidal intent, severe allergic reaction, or very high fever in an infant.
- notes: anything else a clinician should know.

Respond with a single JSON object and nothing else:
{"symptoms": [], "severity": 5, "duration": null, "is_emergency": false, "notes": null}"#;

/// Severity assumed when the model gives none.
const DEFAULT_SEVERITY: u8 = 5;

#[derive(Deserialize)]
struct RawAssessment {
    #[serde(default)]
    symptoms: Vec<String>,
    severity: Option<Value>,
    duration: Option<String>,
    #[serde(default)]
    is_emergency: bool,
    notes: Option<String>,
}

impl From<RawAssessment> for SymptomAssessment {
    fn from(raw: RawAssessment) -> Self {
        Self {
            symptoms: raw
                .symptoms
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            severity: raw
                .severity
                .as_ref()
                .and_then(severity_from)
                .unwrap_or(DEFAULT_SEVERITY),
            duration: raw.duration.filter(|d| !d.trim().is_empty()),
            is_emergency: raw.is_emergency,
            notes: raw.notes.filter(|n| !n.trim().is_empty()),
        }
    }
}

/// Accept numbers or numeric strings ("7", "7/10") and clamp into range.
fn severity_from(value: &Value) -> Option<u8> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.split('/').next()?.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !n.is_finite() {
        return None;
    }
    let clamped = n.round().clamp(
        SymptomAssessment::MIN_SEVERITY as f64,
        SymptomAssessment::MAX_SEVERITY as f64,
    );
    Some(clamped as u8)
}

pub struct SymptomCheckerChain {
    llm: Arc<dyn LanguageModel>,
}

impl SymptomCheckerChain {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self { llm }
    }

    /// Assess `query`. Fails with a parse error if no assessment can be read.
    pub async fn run(&self, query: &str) -> Result<SymptomAssessment> {
        let raw: RawAssessment = complete_json(self.llm.as_ref(), SYSTEM_PROMPT, query).await?;
        let assessment = SymptomAssessment::from(raw);
        info!(
            "Symptom assessment: {} symptoms, severity {}, emergency={}",
            assessment.symptoms.len(),
            assessment.severity,
            assessment.is_emergency
        );
        Ok(assessment)
    }
}
