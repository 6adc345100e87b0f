//! External collaborator seams.
//!
//! The pipeline talks to language models, label databases and audit storage only through these
//! traits. Implementations are injected as `Arc<dyn Trait>` when services are built at startup.

use crate::audit::AuditRecord;
use crate::label::DrugLabel;
use crate::{CollaboratorError, CollaboratorResult};
use async_trait::async_trait;

/// Translates non-English symptom text into plain English.
///
/// Implementations must translate literal meaning only: no diagnosis, no drug names and no
/// clinical interpretation. See [`linguistic_adapter_prompt`].
#[async_trait]
pub trait LinguisticAdapter: Send + Sync {
    async fn translate_to_english(
        &self,
        text: &str,
        source_language: &str,
    ) -> CollaboratorResult<String>;
}

/// Proposes a short clinical symptom term for normalized English text.
///
/// Implementations must answer with a 1–3 word symptom term only. See
/// [`semantic_mapping_prompt`].
#[async_trait]
pub trait SemanticMapper: Send + Sync {
    async fn map_symptom(&self, text: &str) -> CollaboratorResult<String>;
}

/// Resolves a drug name to its label data.
#[async_trait]
pub trait LabelSource: Send + Sync {
    async fn get_label(&self, drug_name: &str) -> Option<DrugLabel>;
}

/// Receives one record per translation or scoring call.
///
/// Recording must not fail the request, so the method has no error channel.
pub trait AuditSink: Send + Sync {
    fn record(&self, record: AuditRecord);
}

/// Stand-in for a collaborator that has not been configured.
///
/// Every call fails with [`CollaboratorError::Unavailable`], which sends the pipeline down its
/// documented fallback path.
#[derive(Clone, Debug)]
pub struct UnavailableCollaborator {
    reason: String,
}

impl UnavailableCollaborator {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl LinguisticAdapter for UnavailableCollaborator {
    async fn translate_to_english(&self, _text: &str, _lang: &str) -> CollaboratorResult<String> {
        Err(CollaboratorError::Unavailable(self.reason.clone()))
    }
}

#[async_trait]
impl SemanticMapper for UnavailableCollaborator {
    async fn map_symptom(&self, _text: &str) -> CollaboratorResult<String> {
        Err(CollaboratorError::Unavailable(self.reason.clone()))
    }
}

/// Prompt for the linguistic adaptation contract.
pub fn linguistic_adapter_prompt(text: &str, source_language: &str) -> String {
    format!(
        "You are a clinical linguistic adapter. Your ONLY job is to translate \
patient descriptions from {source_language} to English.

CRITICAL RULES:
1. You are NOT a doctor - do NOT diagnose
2. You are NOT a pharmacist - do NOT mention drugs
3. You are NOT providing medical advice
4. You ONLY translate the linguistic meaning

Translate this patient description to plain English, preserving the exact meaning \
without adding any medical interpretation:

Input ({source_language}): {text}

Output (English translation only, no medical terms):"
    )
}

/// Prompt for the semantic mapping contract.
pub fn semantic_mapping_prompt(text: &str) -> String {
    format!(
        "What clinical symptom term describes this patient description in just 1-3 words: \
\"{text}\"? Do not name a disease, a drug or a treatment. \
Answer with ONLY the symptom term, nothing else."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unavailable_collaborator_always_fails() {
        let c = UnavailableCollaborator::new("GEMINI_API_KEY not set");
        let err = c.map_symptom("ringing ears").await.unwrap_err();
        assert_eq!(err.kind(), "Unavailable");
        assert!(c.translate_to_english("dolor", "Spanish").await.is_err());
    }

    #[test]
    fn prompts_carry_the_contract() {
        let p = linguistic_adapter_prompt("सिर दर्द", "Hindi");
        assert!(p.contains("from Hindi to English"));
        assert!(p.contains("do NOT diagnose"));
        assert!(p.contains("Input (Hindi): सिर दर्द"));

        let p = semantic_mapping_prompt("ears ringing");
        assert!(p.contains("1-3 words"));
        assert!(p.contains("\"ears ringing\""));
        assert!(p.contains("drug"));
    }
}
