//! Request and response bodies for the REST API.
//!
//! Field names follow the public JSON contract; conversions from the core result types live
//! alongside each response.

use paeon_core::balance::{DrugBalance, FairBalanceAssessment, FairBalanceInput};
use paeon_core::language::SupportedLanguage;
use paeon_core::mapping::CodeEntry;
use paeon_core::pii::RedactionReport;
use paeon_core::translation::TranslationResult;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
    pub version: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StandardCode {
    /// Code system, `SNOMED-CT` or `ICD-10`
    pub system: String,
    pub code: String,
    pub display: String,
}

impl From<CodeEntry> for StandardCode {
    fn from(c: CodeEntry) -> Self {
        Self {
            system: c.system,
            code: c.code,
            display: c.display,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TranslateReq {
    /// Patient description in any supported language
    #[schema(example = "my heart feels funny and tight")]
    pub text: String,
    /// Optional clinical context, at most 500 characters
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    #[schema(example = "sess_abc123")]
    pub session_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TranslateRes {
    pub id: String,
    /// Detected source language, e.g. `English`
    pub original_language: String,
    pub language_code: String,
    /// Input with PII removed
    pub raw_input: String,
    pub normalized_english: String,
    pub clinical_interpretation: String,
    pub standard_codes: Vec<StandardCode>,
    pub confidence: f64,
    pub rationale: String,
    /// `curated`, `fallback` or `fallback-error`
    pub provenance: String,
    pub safety_flags: Vec<String>,
    pub pii_detected: bool,
    /// True when a collaborator failure forced a fallback
    pub degraded: bool,
    pub processing_time_ms: u64,
    pub session_id: Option<String>,
    /// RFC 3339 timestamp
    pub created_at: String,
}

impl From<TranslationResult> for TranslateRes {
    fn from(r: TranslationResult) -> Self {
        Self {
            id: r.id.to_string(),
            original_language: r.original_language,
            language_code: r.language_code,
            raw_input: r.raw_input,
            normalized_english: r.normalized_english,
            clinical_interpretation: r.clinical_term,
            standard_codes: r.codes.into_iter().map(StandardCode::from).collect(),
            confidence: r.confidence.value(),
            rationale: r.rationale,
            provenance: r.provenance.as_str().to_string(),
            safety_flags: r
                .safety_flags
                .iter()
                .map(|c| c.as_str().to_string())
                .collect(),
            pii_detected: r.pii_detected,
            degraded: r.degraded,
            processing_time_ms: r.processing_time_ms,
            session_id: r.session_id,
            created_at: r.created_at.to_rfc3339(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct QuickTranslateReq {
    pub text: String,
}

/// Compact translation for demos.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct QuickTranslateRes {
    pub input: String,
    pub language: String,
    pub clinical: String,
    /// Confidence as a whole percentage
    pub confidence: u32,
    pub codes: Vec<StandardCode>,
}

impl From<TranslationResult> for QuickTranslateRes {
    fn from(r: TranslationResult) -> Self {
        Self {
            input: r.raw_input,
            language: r.original_language,
            clinical: r.clinical_term,
            confidence: (r.confidence.value() * 100.0) as u32,
            codes: r.codes.into_iter().map(StandardCode::from).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SupportedLanguageRes {
    pub code: String,
    pub name: String,
    pub native_name: String,
}

impl From<&SupportedLanguage> for SupportedLanguageRes {
    fn from(l: &SupportedLanguage) -> Self {
        Self {
            code: l.code.into(),
            name: l.name.into(),
            native_name: l.native_name.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FeedbackReq {
    pub approved: bool,
    /// Corrected clinical interpretation, at most 1000 characters
    #[serde(default)]
    pub correction: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FeedbackRes {
    pub status: String,
    pub message: String,
    pub translation_id: String,
    pub approved: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ScoreBalanceReq {
    pub benefits: Vec<String>,
    /// Risk and safety statements
    pub risks: Vec<String>,
    #[serde(default)]
    pub contraindications: Vec<String>,
    #[serde(default)]
    pub boxed_warning: Option<String>,
    #[serde(default)]
    pub disclaimer: Option<String>,
}

impl From<ScoreBalanceReq> for FairBalanceInput {
    fn from(r: ScoreBalanceReq) -> Self {
        Self {
            benefits: r.benefits,
            risks: r.risks,
            contraindications: r.contraindications,
            boxed_warning: r.boxed_warning,
            disclaimer: r.disclaimer,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ScoreBalanceRes {
    pub benefit_words: usize,
    pub risk_words: usize,
    pub balance_ratio: f64,
    pub balance_score: f64,
    pub score: f64,
    pub compliant: bool,
    pub note: Option<String>,
}

impl From<FairBalanceAssessment> for ScoreBalanceRes {
    fn from(a: FairBalanceAssessment) -> Self {
        Self {
            benefit_words: a.benefit_words,
            risk_words: a.risk_words,
            balance_ratio: a.balance_ratio,
            balance_score: a.balance_score,
            score: a.score,
            compliant: a.compliant,
            note: a.note,
        }
    }
}

/// Fair-balance score for the patient education content built from a stored label.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DrugBalanceRes {
    pub drug_name: String,
    pub generic_name: String,
    pub drug_class: String,
    pub benefits: Vec<String>,
    pub safety_information: String,
    pub boxed_warning: Option<String>,
    pub disclaimer: Option<String>,
    pub assessment: ScoreBalanceRes,
}

impl From<DrugBalance> for DrugBalanceRes {
    fn from(b: DrugBalance) -> Self {
        Self {
            drug_name: b.label.display_name().to_string(),
            generic_name: b.label.generic_name,
            drug_class: b.label.drug_class,
            benefits: b.input.benefits,
            safety_information: b.input.risks.join(" "),
            boxed_warning: b.input.boxed_warning,
            disclaimer: b.input.disclaimer,
            assessment: b.assessment.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RedactReq {
    pub text: String,
    /// Also return a partially masked copy that keeps the shape of emails and phone numbers
    #[serde(default)]
    pub partial_mask: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RedactRes {
    pub redacted: String,
    pub masked: Option<String>,
    pub pii_detected: bool,
    pub categories: Vec<String>,
    pub match_count: usize,
    pub original_length: usize,
    pub stripped_length: usize,
    pub model_version: String,
}

impl RedactRes {
    pub fn new(redacted: String, masked: Option<String>, report: RedactionReport) -> Self {
        Self {
            redacted,
            masked,
            pii_detected: report.pii_detected(),
            categories: report
                .categories
                .iter()
                .map(|c| c.as_str().to_string())
                .collect(),
            match_count: report.match_count,
            original_length: report.original_length,
            stripped_length: report.stripped_length,
            model_version: report.model_version,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paeon_core::label::StaticLabelSource;
    use paeon_core::pii::PiiRedactor;

    #[test]
    fn score_request_defaults_optional_fields() {
        let req: ScoreBalanceReq =
            serde_json::from_str(r#"{"benefits": ["Lowers sugar"], "risks": ["Nausea"]}"#)
                .unwrap();
        let input = FairBalanceInput::from(req);
        assert!(input.contraindications.is_empty());
        assert_eq!(input.boxed_warning, None);
        assert_eq!(input.disclaimer, None);
    }

    #[test]
    fn drug_balance_uses_brand_name() {
        let source = StaticLabelSource::with_defaults();
        let label = source.find("eliquis").unwrap().clone();
        let input = FairBalanceInput::from_label(&label, false, "Consult your doctor.");
        let balance = DrugBalance {
            assessment: paeon_core::balance::FairBalanceScorer::default().score(&input),
            input,
            label,
        };
        let res = DrugBalanceRes::from(balance);
        assert_eq!(res.drug_name, "Eliquis");
        assert_eq!(res.generic_name, "Apixaban");
        assert_eq!(res.boxed_warning, None);
        assert_eq!(res.benefits.len(), 4);
    }

    #[test]
    fn redact_response_lists_category_names() {
        let (redacted, report) = PiiRedactor::new().redact("email me at jo@example.com");
        let res = RedactRes::new(redacted, None, report);
        assert!(res.pii_detected);
        assert_eq!(res.categories, vec!["email"]);
        assert_eq!(res.redacted, "email me at [EMAIL_REDACTED]");
    }
}
