//! Results produced by the chains.

use serde::{Deserialize, Serialize};

use arogya_tools::VideoResult;

/// Where part of an answer came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Free-text answer with the material it was grounded on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainAnswer {
    pub text: String,
    #[serde(default)]
    pub sources: Vec<Source>,
}

/// Outcome of the safety check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyVerdict {
    pub is_safe: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl SafetyVerdict {
    pub fn safe() -> Self {
        Self {
            is_safe: true,
            reason: None,
        }
    }

    pub fn unsafe_because(reason: impl Into<String>) -> Self {
        Self {
            is_safe: false,
            reason: Some(reason.into()),
        }
    }
}

/// Routing label produced by the intent classifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Intent {
    GovernmentScheme,
    MentalWellness,
    Ayush,
    SymptomChecker,
    FacilityLocator,
    /// Any label outside the known set, kept verbatim.
    Other(String),
}

impl Intent {
    pub const KNOWN: [Intent; 5] = [
        Intent::GovernmentScheme,
        Intent::MentalWellness,
        Intent::Ayush,
        Intent::SymptomChecker,
        Intent::FacilityLocator,
    ];

    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "government_scheme_support" => Intent::GovernmentScheme,
            "mental_wellness_support" => Intent::MentalWellness,
            "ayush_support" => Intent::Ayush,
            "symptom_checker" => Intent::SymptomChecker,
            "facility_locator_support" => Intent::FacilityLocator,
            _ => Intent::Other(label.trim().to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Intent::GovernmentScheme => "government_scheme_support",
            Intent::MentalWellness => "mental_wellness_support",
            Intent::Ayush => "ayush_support",
            Intent::SymptomChecker => "symptom_checker",
            Intent::FacilityLocator => "facility_locator_support",
            Intent::Other(label) => label,
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Intent {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Intent {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Intent::from_label(&label))
    }
}

/// Intent label plus the model's explanation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentClassification {
    pub classification: Intent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

/// Structured reading of the user's symptoms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomAssessment {
    pub symptoms: Vec<String>,
    /// 1 (mild) to 10 (worst imaginable).
    pub severity: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    pub is_emergency: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl SymptomAssessment {
    pub const MIN_SEVERITY: u8 = 1;
    pub const MAX_SEVERITY: u8 = 10;

    /// Symptoms joined for use inside follow-up prompts.
    pub fn symptom_list(&self) -> String {
        self.symptoms.join(", ")
    }
}

/// Yoga guidance with an optional demonstration video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YogaRecommendation {
    pub text: String,
    #[serde(default)]
    pub sources: Vec<Source>,
    pub video: Option<VideoResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_labels() {
        for intent in Intent::KNOWN {
            assert_eq!(Intent::from_label(intent.label()), intent);
        }
        assert_eq!(Intent::from_label(" AYUSH_SUPPORT "), Intent::Ayush);
        assert_eq!(
            Intent::from_label("weather"),
            Intent::Other("weather".into())
        );
    }

    #[test]
    fn test_intent_serializes_as_label() {
        let c = IntentClassification {
            classification: Intent::FacilityLocator,
            reasoning: None,
        };
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["classification"], "facility_locator_support");
        assert!(json.get("reasoning").is_none());

        let back: IntentClassification =
            serde_json::from_str(r#"{"classification":"small_talk"}"#).unwrap();
        assert_eq!(back.classification, Intent::Other("small_talk".into()));
    }

    #[test]
    fn test_yoga_video_serializes_null() {
        let rec = YogaRecommendation {
            text: "Try Balasana.".into(),
            sources: vec![],
            video: None,
        };
        let json = serde_json::to_value(&rec).unwrap();
        assert!(json["video"].is_null());
    }
}
