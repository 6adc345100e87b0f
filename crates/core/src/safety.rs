//! Safety guardrail for generated clinical output.
//!
//! Output must describe symptoms only. Anything that reads as a diagnosis, a prescription, a
//! prognosis or a treatment recommendation is flagged, sanitized and down-weighted.

use crate::constants::SAFETY_CONFIDENCE_PENALTY;
use crate::mapping::ClinicalMapping;
use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Disclaimer appended to compliance-facing text.
pub const COMPLIANCE_DISCLAIMER: &str = "\n\n---\n⚠️ IMPORTANT: This is for Healthcare Professional use only. \
This system provides clinical terminology mapping, not medical diagnosis. \
Always consult qualified healthcare providers for medical decisions.";

/// Standard disclaimer notices recognised in free text.
pub const REQUIRED_DISCLAIMERS: &[&str] = &[
    "For Healthcare Professional use only",
    "Not a diagnostic tool",
    "Consult your healthcare provider",
    "This is not medical advice",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationCategory {
    Diagnostic,
    Prescriptive,
    Prognosis,
    Treatment,
}

impl ViolationCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ViolationCategory::Diagnostic => "diagnostic",
            ViolationCategory::Prescriptive => "prescriptive",
            ViolationCategory::Prognosis => "prognosis",
            ViolationCategory::Treatment => "treatment",
        }
    }
}

impl std::fmt::Display for ViolationCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(&format!("(?i){p}")).expect("valid safety regex"))
        .collect()
}

static CATEGORY_PATTERNS: LazyLock<Vec<(ViolationCategory, Vec<Regex>)>> = LazyLock::new(|| {
    vec![
        (
            ViolationCategory::Diagnostic,
            compile(&[
                r"\byou have\b.*(?:disease|disorder|condition|syndrome|infection)",
                r"\byou have\s+(?:a\s+|an\s+)?[a-z]{4,}",
                r"\byou are suffering from\b",
                r"\bdiagnosis:?\s*(?:is|would be|appears to be)",
                r"\bthis (?:is|indicates|suggests|confirms)\s+(?:a\s+|an\s+)?(?:disease|disorder|condition)",
                r"\byou(?:'ve| have) (?:got|contracted|developed)\b",
                r"\btest results (?:show|indicate|confirm) (?:you have|presence of)",
            ]),
        ),
        (
            ViolationCategory::Prescriptive,
            compile(&[
                r"\byou should take\b",
                r"\btake\s+\d+\s*(?:mg|ml|tablets?|pills?|capsules?)",
                r"\bI (?:recommend|suggest|advise) (?:you take|taking)",
                r"\bprescription:?\s*",
                r"\bstart (?:taking|on|with)\s+\w+\s*(?:mg|ml)?",
                r"\byou need\s+(?:to take|medication|medicine|treatment)",
                r"\bdosage:?\s*\d+",
            ]),
        ),
        (
            ViolationCategory::Prognosis,
            compile(&[
                r"\bthis will\s+(?:get|become|turn|progress)",
                r"\byour condition will\b",
                r"\bexpect\s+(?:recovery|improvement|deterioration)",
                r"\blikely to\s+(?:recover|worsen|die|survive)",
                r"\bprognosis:?\s*",
                r"\blife expectancy\b",
            ]),
        ),
        (
            ViolationCategory::Treatment,
            compile(&[
                r"\byou should\s+(?:undergo|have|get|consider)\s+(?:surgery|treatment|therapy)",
                r"\btreatment options include\b",
                r"\bI recommend\s+(?:surgery|treatment|therapy|procedure)",
                r"\bconsider\s+(?:surgery|chemotherapy|radiation|transplant)",
            ]),
        ),
    ]
});

// Applied in order, each once over the whole text.
static SANITIZERS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"(?i)\byou have\s+", "symptoms consistent with "),
        (r"(?i)\bdiagnosis\b", "clinical interpretation"),
        (r"(?i)\btreatment\b", "management options"),
    ]
    .into_iter()
    .map(|(p, r)| (Regex::new(p).expect("valid sanitizer regex"), r))
    .collect()
});

/// Result of scanning a clinical term and its rationale.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyAssessment {
    pub is_safe: bool,
    /// Violated categories in fixed order: diagnostic, prescriptive, prognosis, treatment.
    pub violated: Vec<ViolationCategory>,
    pub violation_count: usize,
    pub reason: Option<String>,
    /// Sanitized clinical term; only present when unsafe.
    pub sanitized: Option<String>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SafetyGuardrail;

impl SafetyGuardrail {
    pub fn new() -> Self {
        LazyLock::force(&CATEGORY_PATTERNS);
        LazyLock::force(&SANITIZERS);
        Self
    }

    /// Scans `term + " " + rationale` against every category.
    pub fn assess(&self, term: &str, rationale: &str) -> SafetyAssessment {
        let combined = format!("{term} {rationale}");
        let mut violated = Vec::new();
        let mut violation_count = 0;

        for (category, patterns) in CATEGORY_PATTERNS.iter() {
            let hits = patterns.iter().filter(|p| p.is_match(&combined)).count();
            if hits > 0 {
                violated.push(*category);
                violation_count += hits;
            }
        }

        if violated.is_empty() {
            return SafetyAssessment {
                is_safe: true,
                violated,
                violation_count: 0,
                reason: None,
                sanitized: None,
            };
        }

        let names: Vec<&str> = violated.iter().map(|c| c.as_str()).collect();
        SafetyAssessment {
            is_safe: false,
            reason: Some(format!("Output contains {} language", names.join(", "))),
            sanitized: Some(self.sanitize(term)),
            violated,
            violation_count,
        }
    }

    /// Rewrites diagnostic phrasing into symptom-descriptive phrasing.
    pub fn sanitize(&self, text: &str) -> String {
        SANITIZERS
            .iter()
            .fold(text.to_string(), |acc, (pattern, replacement)| {
                pattern.replace_all(&acc, NoExpand(*replacement)).into_owned()
            })
    }

    /// Assesses a mapping and, if unsafe, sanitizes its term, annotates its rationale and
    /// applies the confidence penalty.
    pub fn apply(&self, mut mapping: ClinicalMapping) -> (ClinicalMapping, SafetyAssessment) {
        let assessment = self.assess(&mapping.clinical_term, &mapping.rationale);
        if !assessment.is_safe {
            tracing::warn!(
                categories = ?assessment.violated,
                violations = assessment.violation_count,
                "safety guardrail flagged output"
            );
            if let Some(sanitized) = &assessment.sanitized {
                for code in &mut mapping.codes {
                    if code.display == mapping.clinical_term {
                        code.display = sanitized.clone();
                    }
                }
                mapping.clinical_term = sanitized.clone();
            }
            if let Some(reason) = &assessment.reason {
                mapping.rationale.push_str(&format!(" [Safety note: {reason}]"));
            }
            mapping.confidence = mapping.confidence.scaled(SAFETY_CONFIDENCE_PENALTY);
        }
        (mapping, assessment)
    }

    /// Appends the compliance disclaimer.
    pub fn add_disclaimer(&self, text: &str) -> String {
        format!("{text}{COMPLIANCE_DISCLAIMER}")
    }

    /// True when a disclaimer is present and non-blank.
    pub fn has_disclaimer(&self, disclaimer: Option<&str>) -> bool {
        disclaimer.is_some_and(|d| !d.trim().is_empty())
    }

    /// Standard notices found in `text`, compared case-insensitively.
    pub fn recognised_disclaimers(&self, text: &str) -> Vec<&'static str> {
        let lower = text.to_lowercase();
        REQUIRED_DISCLAIMERS
            .iter()
            .copied()
            .filter(|d| lower.contains(&d.to_lowercase()))
            .collect()
    }
}
