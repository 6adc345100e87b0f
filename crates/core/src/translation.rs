//! Translation orchestrator.
//!
//! Runs the full pipeline for one symptom description:
//!
//! 1. validate input
//! 2. redact PII
//! 3. detect language and normalize to English
//! 4. curated lexicon match, or semantic fallback when nothing matches
//! 5. safety guardrail
//!
//! and emits exactly one audit record per successful call. Only input validation can fail; every
//! collaborator failure is absorbed by the stage that made the call.

use crate::audit::{anonymize_actor, hash_content, AuditAction, AuditRecord, TracingAuditSink};
use crate::collaborators::{AuditSink, LinguisticAdapter, SemanticMapper, UnavailableCollaborator};
use crate::config::CoreConfig;
use crate::fallback::SemanticFallbackMapper;
use crate::language::{LanguageDetector, LanguageNormalizer, WhatlangDetector};
use crate::lexicon::{Lexicon, LexiconMatcher};
use crate::mapping::{CodeEntry, MappingOutcome, Provenance};
use crate::pii::{PiiCategory, PiiRedactor};
use crate::pool::CollaboratorPool;
use crate::safety::{SafetyGuardrail, ViolationCategory};
use crate::validation::{validate_context, validate_session_id, validate_symptom_text};
use crate::PaeonResult;
use chrono::{DateTime, Utc};
use paeon_types::Confidence;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub text: String,
    pub context: Option<String>,
    pub session_id: Option<String>,
    /// Caller identity; only its salted hash is ever recorded.
    pub actor_id: Option<String>,
}

impl TranslationRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_actor(mut self, actor_id: impl Into<String>) -> Self {
        self.actor_id = Some(actor_id.into());
        self
    }
}

/// Outcome of one translation. Built once and never mutated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TranslationResult {
    pub id: Uuid,
    /// English name of the detected language.
    pub original_language: String,
    pub language_code: String,
    /// Input after PII redaction.
    pub raw_input: String,
    pub normalized_english: String,
    pub clinical_term: String,
    pub codes: Vec<CodeEntry>,
    pub confidence: Confidence,
    pub rationale: String,
    pub provenance: Provenance,
    pub safety_flags: Vec<ViolationCategory>,
    pub processing_time_ms: u64,
    pub pii_detected: bool,
    pub pii_categories: Vec<PiiCategory>,
    pub session_id: Option<String>,
    /// True when a collaborator failure forced a fallback: either normalization passed the
    /// input through untranslated or semantic mapping returned the unspecified default.
    pub degraded: bool,
    pub created_at: DateTime<Utc>,
}

/// External collaborators used by the translation pipeline.
#[derive(Clone)]
pub struct Collaborators {
    pub detector: Arc<dyn LanguageDetector>,
    pub adapter: Arc<dyn LinguisticAdapter>,
    pub mapper: Arc<dyn SemanticMapper>,
    pub audit: Arc<dyn AuditSink>,
}

impl Collaborators {
    /// Trigram detector and tracing audit sink, with both language-model seams unavailable.
    pub fn offline(reason: &str) -> Self {
        let unavailable = Arc::new(UnavailableCollaborator::new(reason));
        Self {
            detector: Arc::new(WhatlangDetector::new()),
            adapter: unavailable.clone(),
            mapper: unavailable,
            audit: Arc::new(TracingAuditSink),
        }
    }
}

pub struct TranslationService {
    max_input_chars: usize,
    audit_salt: String,
    redactor: PiiRedactor,
    normalizer: LanguageNormalizer,
    matcher: LexiconMatcher,
    fallback: SemanticFallbackMapper,
    guardrail: SafetyGuardrail,
    audit: Arc<dyn AuditSink>,
}

impl TranslationService {
    /// Builds the pipeline. Both collaborator stages share one bounded pool.
    pub fn new(cfg: &CoreConfig, lexicon: Arc<Lexicon>, collaborators: Collaborators) -> Self {
        let pool = CollaboratorPool::new(cfg.collaborator_concurrency(), cfg.collaborator_timeout());
        Self {
            max_input_chars: cfg.max_input_chars(),
            audit_salt: cfg.audit_salt().to_string(),
            redactor: PiiRedactor::new(),
            normalizer: LanguageNormalizer::new(
                collaborators.detector,
                collaborators.adapter,
                pool.clone(),
            ),
            matcher: LexiconMatcher::new(lexicon, cfg.thresholds()),
            fallback: SemanticFallbackMapper::new(
                collaborators.mapper,
                pool,
                cfg.fallback_confidence(),
            ),
            guardrail: SafetyGuardrail::new(),
            audit: collaborators.audit,
        }
    }

    pub fn redactor(&self) -> &PiiRedactor {
        &self.redactor
    }

    pub fn matcher(&self) -> &LexiconMatcher {
        &self.matcher
    }

    pub fn max_input_chars(&self) -> usize {
        self.max_input_chars
    }

    /// Translates a free-text symptom description into clinical vocabulary.
    ///
    /// # Errors
    ///
    /// Returns an input error if the text is blank or too long, the context is too long, or the
    /// session id is malformed. Nothing is processed or audited in that case.
    pub async fn translate(&self, request: &TranslationRequest) -> PaeonResult<TranslationResult> {
        let started = Instant::now();

        let text = validate_symptom_text(&request.text, self.max_input_chars)?;
        let context = validate_context(request.context.as_deref())?;
        if let Some(session_id) = &request.session_id {
            validate_session_id(session_id)?;
        }

        let (redacted, pii) = self.redactor.redact(text.as_str());
        let normalized = self.normalizer.normalize(&redacted).await;

        let outcome = match self.matcher.find(&normalized.text) {
            Some(hit) => MappingOutcome::Matched(hit),
            None => self.fallback.map(&normalized.text).await,
        };
        let provenance = outcome.provenance();
        let (mapping, safety) = self.guardrail.apply(outcome.into_mapping());

        let degraded = normalized.degraded || provenance == Provenance::FallbackError;
        let result = TranslationResult {
            id: Uuid::new_v4(),
            original_language: normalized.language_name.to_string(),
            language_code: normalized.language_code.to_string(),
            raw_input: redacted,
            normalized_english: normalized.text,
            clinical_term: mapping.clinical_term,
            codes: mapping.codes,
            confidence: mapping.confidence,
            rationale: mapping.rationale,
            provenance: mapping.provenance,
            safety_flags: safety.violated,
            processing_time_ms: started.elapsed().as_millis() as u64,
            pii_detected: pii.pii_detected(),
            pii_categories: pii.categories,
            session_id: request.session_id.clone(),
            degraded,
            created_at: Utc::now(),
        };

        tracing::info!(
            id = %result.id,
            language = %result.language_code,
            provenance = %result.provenance,
            confidence = result.confidence.value(),
            degraded = result.degraded,
            elapsed_ms = result.processing_time_ms,
            "translated symptom description"
        );

        self.record(&result, context.as_ref().map(|c| c.as_str()), request.actor_id.as_deref());
        Ok(result)
    }

    fn record(&self, result: &TranslationResult, context: Option<&str>, actor_id: Option<&str>) {
        let input = match context {
            Some(c) => format!("{}\n{c}", result.raw_input),
            None => result.raw_input.clone(),
        };
        let mut record = AuditRecord::new(
            AuditAction::SlangTranslation,
            anonymize_actor(actor_id, &self.audit_salt),
            hash_content(&input),
        );
        record.output_hash = Some(hash_content(&result.clinical_term));
        record.score = Some(result.confidence.value());
        record.pii_detected = result.pii_detected;
        record.safety_flags = result
            .safety_flags
            .iter()
            .map(|c| c.as_str().to_string())
            .collect();
        record.session_id = result.session_id.clone();
        self.audit.record(record);
    }
}
