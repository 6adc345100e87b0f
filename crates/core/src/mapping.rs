//! Clinical mapping types shared by the lexicon matcher, the fallback mapper and the guardrail.

use crate::constants::{ICD_10, SNOMED_CT};
use paeon_types::Confidence;
use serde::{Deserialize, Serialize};

/// A single code-system entry, e.g. `SNOMED-CT 80313002 Palpitations`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeEntry {
    pub system: String,
    pub code: String,
    pub display: String,
}

impl CodeEntry {
    pub fn new(
        system: impl Into<String>,
        code: impl Into<String>,
        display: impl Into<String>,
    ) -> Self {
        Self {
            system: system.into(),
            code: code.into(),
            display: display.into(),
        }
    }

    /// SNOMED-CT then ICD-10 entries for the same display term.
    pub fn pair(snomed: &str, icd10: &str, display: &str) -> Vec<CodeEntry> {
        vec![
            CodeEntry::new(SNOMED_CT, snomed, display),
            CodeEntry::new(ICD_10, icd10, display),
        ]
    }
}

/// Where a mapping came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provenance {
    /// Curated lexicon hit (high trust).
    Curated,
    /// Resolved by the semantic mapping collaborator (lower trust, capped).
    Fallback,
    /// The semantic mapping collaborator failed; fixed safe default.
    FallbackError,
}

impl Provenance {
    pub fn as_str(self) -> &'static str {
        match self {
            Provenance::Curated => "curated",
            Provenance::Fallback => "fallback",
            Provenance::FallbackError => "fallback-error",
        }
    }
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A clinical term with its codes, confidence, rationale and provenance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClinicalMapping {
    pub clinical_term: String,
    pub codes: Vec<CodeEntry>,
    pub confidence: Confidence,
    pub rationale: String,
    pub provenance: Provenance,
}

impl ClinicalMapping {
    pub fn code_for(&self, system: &str) -> Option<&str> {
        self.codes
            .iter()
            .find(|c| c.system == system)
            .map(|c| c.code.as_str())
    }
}

/// A winning curated lexicon entry together with its score.
#[derive(Clone, Debug, PartialEq)]
pub struct LexiconMatch {
    pub entry: crate::lexicon::LexiconEntry,
    pub score: f64,
    pub confidence: Confidence,
}

impl LexiconMatch {
    pub fn into_mapping(self) -> ClinicalMapping {
        let rationale = format!(
            "Matched curated mapping for '{}'. Body system: {}.",
            self.entry.expression, self.entry.body_system
        );
        ClinicalMapping {
            clinical_term: self.entry.clinical,
            codes: self.entry.codes,
            confidence: self.confidence,
            rationale,
            provenance: Provenance::Curated,
        }
    }
}

/// Per-stage result of the mapping step.
#[derive(Clone, Debug, PartialEq)]
pub enum MappingOutcome {
    Matched(LexiconMatch),
    Fallback(ClinicalMapping),
    /// The fallback stage failed; `mapping` is the fixed safe default.
    Error {
        reason: String,
        mapping: ClinicalMapping,
    },
}

impl MappingOutcome {
    pub fn provenance(&self) -> Provenance {
        match self {
            MappingOutcome::Matched(_) => Provenance::Curated,
            MappingOutcome::Fallback(m) => m.provenance,
            MappingOutcome::Error { .. } => Provenance::FallbackError,
        }
    }

    pub fn into_mapping(self) -> ClinicalMapping {
        match self {
            MappingOutcome::Matched(m) => m.into_mapping(),
            MappingOutcome::Fallback(mapping) => mapping,
            MappingOutcome::Error { mapping, .. } => mapping,
        }
    }
}
