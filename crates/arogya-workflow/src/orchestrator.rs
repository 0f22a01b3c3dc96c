//! Orchestrator: screens, classifies and routes one user request.

use std::sync::Arc;

use tracing::{info, info_span, Instrument};

use arogya_chains::{
    AyushChain, GovernmentSchemeChain, GuardrailChain, HospitalLocatorChain, Intent,
    IntentClassifierChain, MentalWellnessChain, SymptomCheckerChain, YogaChain,
};
use arogya_core::Result;
use arogya_knowledge::Retriever;
use arogya_llm::LanguageModel;
use arogya_tools::{SearchTool, VideoSearch};

use crate::types::*;

/// Runs the guardrail → classification → routed chain pipeline.
pub struct HealthcareWorkflow {
    guardrail: GuardrailChain,
    classifier: IntentClassifierChain,
    symptoms: SymptomCheckerChain,
    schemes: GovernmentSchemeChain,
    wellness: MentalWellnessChain,
    ayush: AyushChain,
    yoga: YogaChain,
    hospitals: HospitalLocatorChain,
}

impl HealthcareWorkflow {
    pub fn new(
        llm: Arc<dyn LanguageModel>,
        search: Arc<dyn SearchTool>,
        retriever: Arc<dyn Retriever>,
        videos: Arc<dyn VideoSearch>,
        options: WorkflowOptions,
    ) -> Self {
        info!(
            "Healthcare workflow ready: llm={}, rag_top_k={}, search_results={}",
            llm.describe(),
            options.rag_top_k,
            options.search_results
        );
        Self {
            guardrail: GuardrailChain::new(llm.clone()),
            classifier: IntentClassifierChain::new(llm.clone()),
            symptoms: SymptomCheckerChain::new(llm.clone()),
            schemes: GovernmentSchemeChain::new(llm.clone(), search.clone(), options.search_results),
            wellness: MentalWellnessChain::new(llm.clone(), search.clone(), options.search_results),
            ayush: AyushChain::new(llm.clone(), retriever.clone(), options.rag_top_k),
            yoga: YogaChain::new(
                llm.clone(),
                retriever,
                videos,
                options.yoga_channel_ids,
                options.rag_top_k,
            ),
            hospitals: HospitalLocatorChain::new(llm, search, options.search_results),
        }
    }

    /// Handle one request.
    ///
    /// `query_for_classification` is what the guardrail and classifier see
    /// (it may carry conversation context); routed chains always receive the
    /// clean `user_input`. Any chain error aborts the whole run.
    pub async fn run(&self, user_input: &str, query_for_classification: &str) -> Result<WorkflowResponse> {
        let request_id = uuid::Uuid::new_v4();
        let span = info_span!("workflow", %request_id);
        self.run_inner(user_input, query_for_classification)
            .instrument(span)
            .await
    }

    async fn run_inner(&self, user_input: &str, query_for_classification: &str) -> Result<WorkflowResponse> {
        info!("Step 1/3: safety check");
        let verdict = self.guardrail.check(query_for_classification).await?;
        if !verdict.is_safe {
            let reason = verdict
                .reason
                .unwrap_or_else(|| DEFAULT_BLOCK_REASON.to_string());
            info!("Request blocked: {}", reason);
            return Ok(WorkflowResponse::Blocked { reason });
        }

        info!("Step 2/3: intent classification");
        let classification = self.classifier.run(query_for_classification).await?;
        let intent = classification.classification;
        let label = intent.label().to_string();

        info!("Step 3/3: routing to {}", label);
        let response = match intent {
            Intent::GovernmentScheme => CompletedResponse::new(
                label,
                classification.reasoning,
                WorkflowOutput::Answer(self.schemes.run(user_input).await?),
            ),
            Intent::MentalWellness => {
                let output = WorkflowOutput::Answer(self.wellness.run(user_input).await?);
                let mut response = CompletedResponse::new(label, classification.reasoning, output);
                response.yoga_recommendations = Some(self.yoga.run(user_input).await?);
                response
            }
            Intent::Ayush => CompletedResponse::new(
                label,
                classification.reasoning,
                WorkflowOutput::Answer(self.ayush.run(user_input).await?),
            ),
            Intent::SymptomChecker => {
                let mut response = self.handle_symptoms(user_input).await?;
                response.intent = label;
                response.reasoning = classification.reasoning;
                response
            }
            Intent::FacilityLocator => CompletedResponse::new(
                label,
                classification.reasoning,
                WorkflowOutput::Answer(self.hospitals.run(user_input).await?),
            ),
            Intent::Other(_) => CompletedResponse::new(
                label,
                classification.reasoning,
                WorkflowOutput::Message(UNKNOWN_INTENT_MESSAGE.to_string()),
            ),
        };

        Ok(WorkflowResponse::Completed(response))
    }

    /// Assess symptoms and run the follow-up chains.
    ///
    /// Emergencies get a hospital lookup only. Otherwise ayurveda, yoga and
    /// general wellness guidance run in that order.
    pub async fn handle_symptoms(&self, user_input: &str) -> Result<CompletedResponse> {
        let assessment = self.symptoms.run(user_input).await?;
        let symptoms = assessment.symptom_list();
        let label = Intent::SymptomChecker.label().to_string();

        let mut response = if assessment.is_emergency {
            info!("Emergency symptoms reported: {}", symptoms);
            let hospitals = self
                .hospitals
                .run(&format!("Find nearest emergency hospitals for: {}", symptoms))
                .await?;
            let mut response =
                CompletedResponse::new(label, None, WorkflowOutput::Triage(TriageOutcome::emergency()));
            response.hospital_locator = Some(hospitals);
            response
        } else {
            let symptom_text = format!(
                "Patient has {} with severity {}/10",
                symptoms, assessment.severity
            );
            let ayurveda = self
                .ayush
                .run(&format!("Provide ayurvedic remedies for: {}", symptom_text))
                .await?;
            let yoga = self
                .yoga
                .run(&format!("Suggest yoga for: {}", symptom_text))
                .await?;
            let guidance = self
                .wellness
                .run(&format!("Provide wellness advice for: {}", symptom_text))
                .await?;

            let mut response =
                CompletedResponse::new(label, None, WorkflowOutput::Triage(TriageOutcome::routine()));
            response.ayurveda_recommendations = Some(ayurveda);
            response.yoga_recommendations = Some(yoga);
            response.general_guidance = Some(guidance);
            response
        };

        response.symptom_assessment = Some(assessment);
        Ok(response)
    }
}
