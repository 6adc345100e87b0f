//! Semantic fallback mapping for text the curated lexicon does not cover.
//!
//! The [`SemanticMapper`] collaborator proposes a short symptom phrase. The phrase is cleaned,
//! resolved against a secondary term table, and returned with a capped confidence. Any failure
//! yields a fixed "Unspecified symptom" mapping instead of an error.

use crate::collaborators::SemanticMapper;
use crate::constants::{
    FALLBACK_ERROR_CONFIDENCE, UNSPECIFIED_ICD10_CODE, UNSPECIFIED_SNOMED_CODE,
    UNSPECIFIED_SYMPTOM,
};
use crate::mapping::{ClinicalMapping, CodeEntry, MappingOutcome, Provenance};
use crate::pool::CollaboratorPool;
use crate::{CollaboratorError, CollaboratorResult};
use paeon_types::Confidence;
use std::sync::Arc;

// (term, clinical term, SNOMED-CT, ICD-10)
const TERM_CODES: &[(&str, &str, &str, &str)] = &[
    ("tinnitus", "Tinnitus", "60862009", "H93.1"),
    ("ear ringing", "Tinnitus", "60862009", "H93.1"),
    ("ringing ears", "Tinnitus", "60862009", "H93.1"),
    ("ringing in ears", "Tinnitus", "60862009", "H93.1"),
    ("jaw pain", "Jaw Pain", "30968004", "K08.8"),
    ("mandibular pain", "Jaw Pain", "30968004", "K08.8"),
    ("temporomandibular", "TMJ Disorder", "91619002", "K07.6"),
    ("tmj", "TMJ Disorder", "91619002", "K07.6"),
    ("swollen glands", "Lymphadenopathy", "30746007", "R59.9"),
    ("lymph nodes", "Lymphadenopathy", "30746007", "R59.9"),
    ("sore throat", "Pharyngitis", "405737000", "J00"),
    ("throat pain", "Pharyngitis", "405737000", "J00"),
    ("difficulty swallowing", "Dysphagia", "40739000", "R13.1"),
    ("difficulty breathing", "Dyspnea", "267036007", "R06.0"),
    ("back stiffness", "Spinal Stiffness", "249917008", "M54.5"),
    ("stiff neck", "Neck Stiffness", "249917008", "M54.2"),
    ("tremor", "Tremor", "26079004", "R25.1"),
    ("shaking", "Tremor", "26079004", "R25.1"),
    ("muscle weakness", "Muscle Weakness", "26544005", "M62.8"),
    ("weakness", "Generalized Weakness", "80449002", "R53.1"),
    ("headache", "Headache", "25064002", "R51.9"),
    ("head pain", "Headache", "25064002", "R51.9"),
    ("splitting headache", "Severe Headache", "25064002", "R51.9"),
    ("migraine", "Migraine", "37796009", "G43.9"),
    ("vision problems", "Visual Disturbance", "63033001", "H53.9"),
    ("blurred vision", "Blurred Vision", "4148004", "H53.8"),
    ("eye pain", "Ocular Pain", "40638003", "H57.1"),
    ("ear pain", "Otalgia", "16001004", "H92.0"),
    ("ear ache", "Otalgia", "16001004", "H92.0"),
    ("shoulder pain", "Shoulder Pain", "55680006", "M25.51"),
    ("hip pain", "Hip Pain", "30989003", "M25.55"),
    ("knee pain", "Knee Pain", "30989003", "M25.56"),
    ("ankle pain", "Ankle Pain", "10601006", "M25.57"),
    ("foot pain", "Foot Pain", "47411000", "M79.3"),
    ("skin rash", "Rash", "271807003", "R21"),
    ("rash", "Rash", "271807003", "R21"),
    ("itching", "Pruritus", "418290006", "L29.9"),
    ("itchy", "Pruritus", "418290006", "L29.9"),
    ("hives", "Urticaria", "126485001", "L50.9"),
    ("skin irritation", "Dermatitis", "24075002", "L30.9"),
    ("dry skin", "Xerosis", "16386004", "L85.3"),
    ("skin sores", "Skin Lesion", "95320000", "L98.9"),
    ("mouth ulcer", "Oral Ulcer", "2092003", "K12.1"),
    ("canker sore", "Oral Ulcer", "2092003", "K12.1"),
    ("lip swelling", "Lip Edema", "423666004", "R60.0"),
    ("tongue swelling", "Glossitis", "76529007", "K14.0"),
    ("bad taste", "Dysgeusia", "367069002", "R43.2"),
    ("metallic taste", "Dysgeusia", "367069002", "R43.2"),
];

/// Cleans a raw collaborator reply into a lowercase candidate phrase.
///
/// Only the first non-empty line is considered.
pub fn clean_reply(raw: &str) -> CollaboratorResult<String> {
    let line = raw
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("");
    if line.chars().count() < 2 {
        return Err(CollaboratorError::MalformedResponse(format!(
            "reply is empty or too short: {raw:?}"
        )));
    }

    let cleaned = line
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '*' | '-' | '.') || c.is_whitespace())
        .to_lowercase();
    if cleaned.is_empty() {
        return Err(CollaboratorError::MalformedResponse(format!(
            "reply has no content after cleaning: {raw:?}"
        )));
    }
    Ok(cleaned)
}

/// Resolves a cleaned phrase to `(clinical term, SNOMED-CT, ICD-10)`.
///
/// Exact match first, then the first table term contained in the phrase or containing it.
pub fn resolve_term(phrase: &str) -> Option<(&'static str, &'static str, &'static str)> {
    TERM_CODES
        .iter()
        .find(|(term, ..)| *term == phrase)
        .or_else(|| {
            TERM_CODES
                .iter()
                .find(|(term, ..)| phrase.contains(term) || term.contains(phrase))
        })
        .map(|&(_, clinical, snomed, icd10)| (clinical, snomed, icd10))
}

fn title_case(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Fixed mapping returned when the collaborator fails.
pub fn unspecified_mapping(error: &CollaboratorError) -> ClinicalMapping {
    ClinicalMapping {
        clinical_term: UNSPECIFIED_SYMPTOM.into(),
        codes: CodeEntry::pair(
            UNSPECIFIED_SNOMED_CODE,
            UNSPECIFIED_ICD10_CODE,
            UNSPECIFIED_SYMPTOM,
        ),
        confidence: Confidence::clamped(FALLBACK_ERROR_CONFIDENCE),
        rationale: format!(
            "Unable to interpret symptom. Semantic mapping error: {}: {error}",
            error.kind()
        ),
        provenance: Provenance::FallbackError,
    }
}

pub struct SemanticFallbackMapper {
    mapper: Arc<dyn SemanticMapper>,
    pool: CollaboratorPool,
    confidence: Confidence,
}

impl SemanticFallbackMapper {
    pub fn new(mapper: Arc<dyn SemanticMapper>, pool: CollaboratorPool, confidence: f64) -> Self {
        Self {
            mapper,
            pool,
            confidence: Confidence::clamped(confidence),
        }
    }

    pub async fn map(&self, text: &str) -> MappingOutcome {
        match self.resolve(text).await {
            Ok(mapping) => {
                tracing::info!(
                    clinical_term = %mapping.clinical_term,
                    "semantic fallback resolved symptom"
                );
                MappingOutcome::Fallback(mapping)
            }
            Err(e) => {
                tracing::warn!(error = %e, "semantic fallback failed; using unspecified symptom");
                MappingOutcome::Error {
                    reason: e.to_string(),
                    mapping: unspecified_mapping(&e),
                }
            }
        }
    }

    async fn resolve(&self, text: &str) -> CollaboratorResult<ClinicalMapping> {
        let raw = self
            .pool
            .run("semantic_mapper", self.mapper.map_symptom(text))
            .await?;
        let phrase = clean_reply(&raw)?;

        let (clinical_term, snomed, icd10) = match resolve_term(&phrase) {
            Some((clinical, snomed, icd10)) => (clinical.to_string(), snomed, icd10),
            None => (
                title_case(&phrase),
                UNSPECIFIED_SNOMED_CODE,
                UNSPECIFIED_ICD10_CODE,
            ),
        };

        Ok(ClinicalMapping {
            codes: CodeEntry::pair(snomed, icd10, &clinical_term),
            rationale: format!("AI interpreted '{text}' as {clinical_term}"),
            clinical_term,
            confidence: self.confidence,
            provenance: Provenance::Fallback,
        })
    }
}
