//! Curated colloquial-expression lexicon and its matcher.
//!
//! The lexicon is loaded once at startup, either from the built-in table or from a YAML file,
//! and is read-only afterwards. Matching is a pure function of the table and the input text.

use crate::config::MatchingThresholds;
use crate::constants::{CURATED_CONFIDENCE_BASE, CURATED_CONFIDENCE_CEILING, CURATED_SCORE_WEIGHT};
use crate::mapping::{CodeEntry, LexiconMatch};
use crate::{PaeonError, PaeonResult};
use paeon_types::Confidence;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

/// One curated expression and the clinical concept it maps to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LexiconEntry {
    pub expression: String,
    pub clinical: String,
    pub codes: Vec<CodeEntry>,
    pub body_system: String,
}

/// On-disk representation of a lexicon entry.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LexiconEntryDef {
    expression: String,
    clinical: String,
    snomed: String,
    icd10: String,
    body_system: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LexiconFile {
    entries: Vec<LexiconEntryDef>,
}

impl From<LexiconEntryDef> for LexiconEntry {
    fn from(def: LexiconEntryDef) -> Self {
        let codes = CodeEntry::pair(&def.snomed, &def.icd10, &def.clinical);
        LexiconEntry {
            expression: def.expression.trim().to_lowercase(),
            clinical: def.clinical,
            codes,
            body_system: def.body_system,
        }
    }
}

// (expression, clinical term, SNOMED-CT, ICD-10, body system)
const CURATED: &[(&str, &str, &str, &str, &str)] = &[
    ("heart feels funny", "Palpitations", "80313002", "R00.2", "cardiovascular"),
    ("chest is tight", "Chest Tightness", "23924001", "R07.89", "cardiovascular"),
    ("chest pain", "Chest Tightness", "23924001", "R07.89", "cardiovascular"),
    ("chest tightness", "Chest Tightness", "23924001", "R07.89", "cardiovascular"),
    ("heart racing", "Tachycardia", "3424008", "R00.0", "cardiovascular"),
    ("heart skipping", "Cardiac Arrhythmia", "698247007", "I49.9", "cardiovascular"),
    ("cold", "Cold/Upper Respiratory Infection", "82272006", "J06.9", "respiratory"),
    ("can't breathe", "Dyspnea", "267036007", "R06.00", "respiratory"),
    ("short of breath", "Dyspnea", "267036007", "R06.00", "respiratory"),
    ("wheezing", "Wheezing", "56018004", "R06.2", "respiratory"),
    ("stomach is churning", "Nausea", "422587007", "R11.0", "gastrointestinal"),
    ("feeling bloated", "Bloating", "248490000", "R14.0", "gastrointestinal"),
    ("bloated", "Bloating", "248490000", "R14.0", "gastrointestinal"),
    ("throwing up", "Vomiting", "422400008", "R11.10", "gastrointestinal"),
    ("belly hurts", "Abdominal Pain", "21522001", "R10.9", "gastrointestinal"),
    ("runs", "Diarrhea", "62315008", "R19.7", "gastrointestinal"),
    ("head is pounding", "Headache", "25064002", "R51.9", "neurological"),
    ("dizzy", "Dizziness", "404640003", "R42", "neurological"),
    ("seeing double", "Diplopia", "24982008", "H53.2", "neurological"),
    ("numb", "Paresthesia", "91019004", "R20.2", "neurological"),
    ("burning feet", "Burning Feet Sensation", "39072002", "R20.8", "neurological"),
    ("feet burning", "Burning Feet Sensation", "39072002", "R20.8", "neurological"),
    ("burning", "Burning Sensation", "19387006", "R20.8", "skin"),
    ("joints are stiff", "Joint Stiffness", "84445001", "M25.60", "musculoskeletal"),
    ("back is killing me", "Severe Back Pain", "161891005", "M54.9", "musculoskeletal"),
    ("back pain", "Back Pain", "161891005", "M54.9", "musculoskeletal"),
    ("muscles ache", "Myalgia", "68962001", "M79.1", "musculoskeletal"),
    ("muscle pain", "Myalgia", "68962001", "M79.1", "musculoskeletal"),
    ("my legs hurt", "Leg Pain", "10601006", "M79.3", "musculoskeletal"),
    ("leg pain", "Leg Pain", "10601006", "M79.3", "musculoskeletal"),
    ("legs hurt", "Leg Pain", "10601006", "M79.3", "musculoskeletal"),
    ("arm pain", "Arm Pain", "3877011000036101", "M79.8", "musculoskeletal"),
    ("my arms hurt", "Arm Pain", "3877011000036101", "M79.8", "musculoskeletal"),
    ("neck pain", "Cervical Pain", "81680005", "M54.2", "musculoskeletal"),
    ("feeling tired", "Fatigue", "84229001", "R53.83", "general"),
    ("no energy", "Fatigue", "84229001", "R53.83", "general"),
    ("fever", "Pyrexia", "386661006", "R50.9", "general"),
    ("chills", "Chills", "43724002", "R68.83", "general"),
    ("sweating", "Hyperhidrosis", "52613005", "R61", "general"),
];

/// Ordered, validated set of curated entries.
#[derive(Clone, Debug)]
pub struct Lexicon {
    entries: Vec<LexiconEntry>,
}

impl Lexicon {
    /// Builds a lexicon, checking that it is non-empty, that every expression is non-blank and
    /// unique, and that every entry carries at least one code.
    pub fn new(entries: Vec<LexiconEntry>) -> PaeonResult<Self> {
        if entries.is_empty() {
            return Err(PaeonError::InvalidLexicon("lexicon has no entries".into()));
        }

        let mut seen = HashSet::new();
        for entry in &entries {
            if entry.expression.trim().is_empty() {
                return Err(PaeonError::InvalidLexicon(
                    "entry with an empty expression".into(),
                ));
            }
            if entry.clinical.trim().is_empty() {
                return Err(PaeonError::InvalidLexicon(format!(
                    "'{}' has an empty clinical term",
                    entry.expression
                )));
            }
            if entry.codes.is_empty() {
                return Err(PaeonError::InvalidLexicon(format!(
                    "'{}' has no codes",
                    entry.expression
                )));
            }
            if !seen.insert(entry.expression.as_str()) {
                return Err(PaeonError::InvalidLexicon(format!(
                    "duplicate expression '{}'",
                    entry.expression
                )));
            }
        }

        Ok(Self { entries })
    }

    /// The built-in curated table.
    pub fn curated() -> Self {
        let entries = CURATED
            .iter()
            .map(|&(expression, clinical, snomed, icd10, body_system)| LexiconEntry {
                expression: expression.into(),
                clinical: clinical.into(),
                codes: CodeEntry::pair(snomed, icd10, clinical),
                body_system: body_system.into(),
            })
            .collect();
        Self { entries }
    }

    pub fn from_yaml_str(yaml: &str) -> PaeonResult<Self> {
        let file: LexiconFile = serde_yaml::from_str(yaml).map_err(PaeonError::LexiconParse)?;
        Self::new(file.entries.into_iter().map(LexiconEntry::from).collect())
    }

    pub fn from_yaml_file(path: &Path) -> PaeonResult<Self> {
        let yaml = std::fs::read_to_string(path).map_err(PaeonError::LexiconRead)?;
        let lexicon = Self::from_yaml_str(&yaml)?;
        tracing::info!(
            path = %path.display(),
            entries = lexicon.len(),
            "loaded lexicon from file"
        );
        Ok(lexicon)
    }

    /// Loads from `path` when given, otherwise returns the built-in table.
    pub fn load(path: Option<&Path>) -> PaeonResult<Self> {
        match path {
            Some(p) => Self::from_yaml_file(p),
            None => Ok(Self::curated()),
        }
    }

    pub fn entries(&self) -> &[LexiconEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn words(text: &str) -> HashSet<&str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .filter(|w| !w.is_empty())
        .collect()
}

/// Finds the best curated entry for a piece of normalized English text.
#[derive(Clone, Debug)]
pub struct LexiconMatcher {
    lexicon: Arc<Lexicon>,
    thresholds: MatchingThresholds,
}

impl LexiconMatcher {
    pub fn new(lexicon: Arc<Lexicon>, thresholds: MatchingThresholds) -> Self {
        Self {
            lexicon,
            thresholds,
        }
    }

    /// Scores every entry and returns the winner if its score clears the acceptance threshold.
    ///
    /// An entry scores `len(expression) / len(text)` when it occurs verbatim, or its word-overlap
    /// ratio when that exceeds the overlap threshold, whichever is higher. The first entry in table
    /// order wins ties.
    pub fn find(&self, text: &str) -> Option<LexiconMatch> {
        let text = text.trim().to_lowercase();
        if text.is_empty() {
            return None;
        }
        let text_len = text.chars().count() as f64;
        let text_words = words(&text);

        let mut best: Option<(&LexiconEntry, f64)> = None;
        for entry in self.lexicon.entries() {
            let mut score = 0.0_f64;

            if text.contains(entry.expression.as_str()) {
                score = entry.expression.chars().count() as f64 / text_len;
            }

            let expr_words = words(&entry.expression);
            if !expr_words.is_empty() {
                let shared = expr_words.intersection(&text_words).count();
                let overlap = shared as f64 / expr_words.len() as f64;
                if overlap > self.thresholds.overlap {
                    score = score.max(overlap);
                }
            }

            if score > best.map_or(0.0, |(_, s)| s) {
                best = Some((entry, score));
            }
        }

        let (entry, score) = best?;
        if score <= self.thresholds.acceptance {
            tracing::debug!(
                expression = %entry.expression,
                score,
                "best curated candidate below acceptance threshold"
            );
            return None;
        }

        let confidence = Confidence::clamped(
            (CURATED_CONFIDENCE_BASE + score * CURATED_SCORE_WEIGHT)
                .min(CURATED_CONFIDENCE_CEILING),
        );
        Some(LexiconMatch {
            entry: entry.clone(),
            score,
            confidence,
        })
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }
}
