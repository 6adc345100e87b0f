//! Fair-balance scoring of drug education content.
//!
//! Risk information must be given prominence comparable to benefit information. Prominence is
//! approximated by whitespace word counts.

use crate::audit::{anonymize_actor, hash_content, AuditAction, AuditRecord};
use crate::collaborators::{AuditSink, LabelSource};
use crate::label::{DrugLabel, PATIENT_DISCLAIMER};
use crate::safety::SafetyGuardrail;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Risk words must reach this share of benefit words.
pub const MIN_BALANCE_RATIO: f64 = 0.7;
/// Overall score required for compliance.
pub const COMPLIANCE_THRESHOLD: f64 = 0.8;

const BALANCE_WEIGHT: f64 = 0.5;
const DISCLAIMER_WEIGHT: f64 = 0.3;
const BOXED_WARNING_WEIGHT: f64 = 0.2;

pub const BALANCE_DEFICIENCY_NOTE: &str =
    "Increase risk/safety information for Fair Balance compliance";
pub const MISSING_DISCLAIMER_NOTE: &str = "Missing required disclaimer";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FairBalanceInput {
    pub benefits: Vec<String>,
    /// Risk and safety text, e.g. side effects and serious risks.
    pub risks: Vec<String>,
    pub contraindications: Vec<String>,
    pub boxed_warning: Option<String>,
    pub disclaimer: Option<String>,
}

impl FairBalanceInput {
    /// Builds scoring input from a drug label: the first four key benefits, the label's safety
    /// paragraph, all contraindications and, if requested, the boxed warning.
    pub fn from_label(label: &DrugLabel, include_boxed_warning: bool, disclaimer: &str) -> Self {
        Self {
            benefits: label.key_benefits.iter().take(4).cloned().collect(),
            risks: vec![label.safety_information()],
            contraindications: label.contraindications.clone(),
            boxed_warning: if include_boxed_warning {
                label.boxed_warning.clone()
            } else {
                None
            },
            disclaimer: Some(disclaimer.to_string()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FairBalanceAssessment {
    pub benefit_words: usize,
    pub risk_words: usize,
    pub balance_ratio: f64,
    pub balance_score: f64,
    pub score: f64,
    pub compliant: bool,
    pub note: Option<String>,
}

fn word_count<'a>(items: impl IntoIterator<Item = &'a String>) -> usize {
    items.into_iter().map(|s| s.split_whitespace().count()).sum()
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FairBalanceScorer {
    guardrail: SafetyGuardrail,
}

impl FairBalanceScorer {
    pub fn new(guardrail: SafetyGuardrail) -> Self {
        Self { guardrail }
    }

    pub fn score(&self, input: &FairBalanceInput) -> FairBalanceAssessment {
        let benefit_words = word_count(&input.benefits);
        let risk_words = word_count(&input.risks)
            + word_count(&input.contraindications)
            + word_count(input.boxed_warning.iter());

        let balance_ratio = risk_words as f64 / benefit_words.max(1) as f64;
        let balance_score = if balance_ratio >= 1.0 {
            1.0
        } else {
            (balance_ratio / MIN_BALANCE_RATIO).min(1.0)
        };

        let has_disclaimer = self.guardrail.has_disclaimer(input.disclaimer.as_deref());
        let disclaimer_score = if has_disclaimer { 1.0 } else { 0.0 };
        let score = BALANCE_WEIGHT * balance_score
            + DISCLAIMER_WEIGHT * disclaimer_score
            + BOXED_WARNING_WEIGHT;

        let compliant = score >= COMPLIANCE_THRESHOLD && has_disclaimer;
        let note = if compliant {
            None
        } else if balance_ratio < MIN_BALANCE_RATIO {
            Some(BALANCE_DEFICIENCY_NOTE.to_string())
        } else if !has_disclaimer {
            Some(MISSING_DISCLAIMER_NOTE.to_string())
        } else {
            None
        };

        FairBalanceAssessment {
            benefit_words,
            risk_words,
            balance_ratio,
            balance_score,
            score,
            compliant,
            note,
        }
    }
}

/// Result of scoring a stored drug label.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DrugBalance {
    pub label: DrugLabel,
    pub input: FairBalanceInput,
    pub assessment: FairBalanceAssessment,
}

/// Scores content and records an audit entry per call.
pub struct BalanceService {
    scorer: FairBalanceScorer,
    labels: Arc<dyn LabelSource>,
    audit: Arc<dyn AuditSink>,
    audit_salt: String,
}

impl BalanceService {
    pub fn new(
        labels: Arc<dyn LabelSource>,
        audit: Arc<dyn AuditSink>,
        audit_salt: impl Into<String>,
    ) -> Self {
        Self {
            scorer: FairBalanceScorer::new(SafetyGuardrail::new()),
            labels,
            audit,
            audit_salt: audit_salt.into(),
        }
    }

    pub fn score(
        &self,
        input: &FairBalanceInput,
        actor_id: Option<&str>,
        session_id: Option<&str>,
    ) -> FairBalanceAssessment {
        let assessment = self.scorer.score(input);
        tracing::info!(
            score = assessment.score,
            ratio = assessment.balance_ratio,
            compliant = assessment.compliant,
            "scored fair balance"
        );
        self.record(input, &assessment, actor_id, session_id);
        assessment
    }

    /// Looks up `drug_name` and scores the patient education content built from its label.
    ///
    /// Returns `None` when the label source does not know the drug.
    pub async fn score_drug(
        &self,
        drug_name: &str,
        include_boxed_warning: bool,
        actor_id: Option<&str>,
    ) -> Option<DrugBalance> {
        let Some(label) = self.labels.get_label(drug_name).await else {
            tracing::info!(drug = drug_name, "no label found");
            return None;
        };
        let input = FairBalanceInput::from_label(&label, include_boxed_warning, PATIENT_DISCLAIMER);
        let assessment = self.score(&input, actor_id, None);
        Some(DrugBalance {
            label,
            input,
            assessment,
        })
    }

    fn record(
        &self,
        input: &FairBalanceInput,
        assessment: &FairBalanceAssessment,
        actor_id: Option<&str>,
        session_id: Option<&str>,
    ) {
        let input_text = serde_json::to_string(input).unwrap_or_else(|_| format!("{input:?}"));
        let output_text =
            serde_json::to_string(assessment).unwrap_or_else(|_| format!("{assessment:?}"));

        let mut record = AuditRecord::new(
            AuditAction::FairBalanceScoring,
            anonymize_actor(actor_id, &self.audit_salt),
            hash_content(&input_text),
        );
        record.output_hash = Some(hash_content(&output_text));
        record.score = Some(assessment.score);
        record.session_id = session_id.map(str::to_string);
        self.audit.record(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::MemoryAuditSink;
    use crate::label::StaticLabelSource;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn scorer() -> FairBalanceScorer {
        FairBalanceScorer::new(SafetyGuardrail::new())
    }

    #[test]
    fn balanced_content_with_disclaimer_is_compliant() {
        let input = FairBalanceInput {
            benefits: strings(&["Controls blood sugar", "Safe"]),
            risks: strings(&["May cause nausea"]),
            contraindications: strings(&["Kidney"]),
            boxed_warning: Some("Lactic acidosis".into()),
            disclaimer: Some("Consult your healthcare provider.".into()),
        };
        let a = scorer().score(&input);
        assert_eq!(a.benefit_words, 4);
        assert_eq!(a.risk_words, 6);
        assert!(a.balance_ratio >= 1.0);
        assert_eq!(a.balance_score, 1.0);
        assert!((a.score - 1.0).abs() < 1e-9);
        assert!(a.compliant);
        assert_eq!(a.note, None);
    }

    #[test]
    fn equal_benefit_and_risk_words_score_full_marks() {
        let input = FairBalanceInput {
            benefits: strings(&["Controls blood sugar daily"]),
            risks: strings(&["May cause nausea"]),
            contraindications: vec![],
            boxed_warning: Some("Hypoglycemia".into()),
            disclaimer: Some("Consult your healthcare provider.".into()),
        };
        let a = scorer().score(&input);
        assert_eq!(a.benefit_words, 4);
        assert_eq!(a.risk_words, 4);
        assert_eq!(a.balance_ratio, 1.0);
        assert_eq!(a.balance_score, 1.0);
        assert!((a.score - 1.0).abs() < 1e-9);
        assert!(a.compliant);
        assert_eq!(a.note, None);
    }

    #[test]
    fn benefit_heavy_content_is_not_compliant() {
        let input = FairBalanceInput {
            benefits: strings(&[
                "Helps control blood sugar levels",
                "Reduces risk of complications",
            ]),
            risks: strings(&["May cause nausea"]),
            contraindications: vec![],
            boxed_warning: None,
            disclaimer: Some("Consult your healthcare provider.".into()),
        };
        let a = scorer().score(&input);
        assert_eq!(a.benefit_words, 9);
        assert_eq!(a.risk_words, 3);

        let input = FairBalanceInput {
            benefits: strings(&[
                "Helps control blood sugar levels",
                "Reduces risk of diabetes complications",
            ]),
            ..input
        };
        let a = scorer().score(&input);
        assert_eq!(a.benefit_words, 10);
        assert!((a.balance_ratio - 0.3).abs() < 1e-9);
        assert!((a.balance_score - 0.3 / 0.7).abs() < 1e-9);
        assert!((a.score - 0.714_285_714).abs() < 1e-6);
        assert!(!a.compliant);
        assert_eq!(a.note.as_deref(), Some(BALANCE_DEFICIENCY_NOTE));
    }

    #[test]
    fn missing_disclaimer_is_reported_when_balanced() {
        let input = FairBalanceInput {
            benefits: strings(&["Lowers sugar"]),
            risks: strings(&["Nausea and diarrhea"]),
            disclaimer: Some("   ".into()),
            ..Default::default()
        };
        let a = scorer().score(&input);
        assert_eq!(a.balance_score, 1.0);
        assert!((a.score - 0.7).abs() < 1e-9);
        assert!(!a.compliant);
        assert_eq!(a.note.as_deref(), Some(MISSING_DISCLAIMER_NOTE));
    }

    #[test]
    fn balance_deficiency_takes_priority_over_disclaimer() {
        let input = FairBalanceInput {
            benefits: strings(&["one two three four five six seven eight nine ten"]),
            risks: strings(&["one"]),
            ..Default::default()
        };
        let a = scorer().score(&input);
        assert_eq!(a.note.as_deref(), Some(BALANCE_DEFICIENCY_NOTE));
    }

    #[test]
    fn empty_benefits_do_not_divide_by_zero() {
        let input = FairBalanceInput {
            risks: strings(&["Nausea"]),
            disclaimer: Some("x".into()),
            ..Default::default()
        };
        let a = scorer().score(&input);
        assert_eq!(a.balance_ratio, 1.0);
        assert!(a.compliant);
    }

    #[test]
    fn from_label_takes_first_four_benefits() {
        let source = StaticLabelSource::with_defaults();
        let label = source.find("metformin").unwrap();
        let with_box = FairBalanceInput::from_label(label, true, PATIENT_DISCLAIMER);
        let without_box = FairBalanceInput::from_label(label, false, PATIENT_DISCLAIMER);
        assert_eq!(with_box.benefits.len(), 4);
        assert!(with_box.boxed_warning.is_some());
        assert!(without_box.boxed_warning.is_none());
        assert_eq!(with_box.risks, vec![label.safety_information()]);
    }

    #[tokio::test]
    async fn service_scores_drug_and_audits() {
        let audit = Arc::new(MemoryAuditSink::new());
        let service = BalanceService::new(
            Arc::new(StaticLabelSource::with_defaults()),
            audit.clone(),
            "test-salt",
        );

        let result = service
            .score_drug("Glucophage", true, Some("clinician-1"))
            .await
            .expect("metformin label");
        assert!(result.assessment.compliant);
        assert_eq!(result.assessment.note, None);
        assert!(service.score_drug("unknown-drug", true, None).await.is_none());

        let records = audit.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].action, AuditAction::FairBalanceScoring);
        assert_eq!(
            records[0].actor_hash,
            anonymize_actor(Some("clinician-1"), "test-salt")
        );
        assert_eq!(records[0].score, Some(result.assessment.score));
        assert_eq!(records[0].input_hash.len(), 64);
    }
}
