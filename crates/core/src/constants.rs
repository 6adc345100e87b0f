//! Constants used throughout the Paeon core crate.
//!
//! Thresholds listed here are defaults only; the tunable ones are carried on
//! [`CoreConfig`](crate::config::CoreConfig) so deployments can override them at startup.

use std::time::Duration;

/// Maximum number of characters accepted for a symptom description.
pub const DEFAULT_MAX_INPUT_CHARS: usize = 2_000;

/// Maximum number of characters accepted for the optional clinical context.
pub const MAX_CONTEXT_CHARS: usize = 500;

/// Maximum length of a caller-supplied session identifier.
pub const MAX_SESSION_ID_LEN: usize = 128;

/// Word-overlap ratio an expression must exceed to become a lexicon candidate.
pub const DEFAULT_OVERLAP_THRESHOLD: f64 = 0.7;

/// Winning lexicon score must exceed this value for a curated match to be accepted.
pub const DEFAULT_ACCEPTANCE_THRESHOLD: f64 = 0.5;

/// Base confidence for an accepted curated match.
pub const CURATED_CONFIDENCE_BASE: f64 = 0.7;

/// Weight of the lexicon score on top of [`CURATED_CONFIDENCE_BASE`].
pub const CURATED_SCORE_WEIGHT: f64 = 0.25;

/// Ceiling for curated confidence.
pub const CURATED_CONFIDENCE_CEILING: f64 = 0.95;

/// Confidence attached to a resolved fallback mapping.
pub const DEFAULT_FALLBACK_CONFIDENCE: f64 = 0.75;

/// Allowed range for the fallback confidence ceiling.
pub const FALLBACK_CONFIDENCE_RANGE: (f64, f64) = (0.75, 0.9);

/// Confidence of the fixed mapping returned when the fallback collaborator fails.
pub const FALLBACK_ERROR_CONFIDENCE: f64 = 0.5;

/// Multiplier applied to the confidence of an output flagged by the safety guardrail.
pub const SAFETY_CONFIDENCE_PENALTY: f64 = 0.7;

/// Default hard timeout for a single collaborator call.
pub const DEFAULT_COLLABORATOR_TIMEOUT: Duration = Duration::from_secs(10);

/// Default number of concurrent collaborator calls.
pub const DEFAULT_COLLABORATOR_CONCURRENCY: usize = 2;

/// Code system names.
pub const SNOMED_CT: &str = "SNOMED-CT";
pub const ICD_10: &str = "ICD-10";

/// Codes used when a symptom cannot be resolved to a specific concept.
pub const UNSPECIFIED_SNOMED_CODE: &str = "267038008";
pub const UNSPECIFIED_ICD10_CODE: &str = "R68.89";

/// Clinical term returned when the fallback collaborator fails.
pub const UNSPECIFIED_SYMPTOM: &str = "Unspecified symptom";

/// Default salt used when hashing actor identifiers for audit records.
pub const DEFAULT_AUDIT_SALT: &str = "paeon_audit";

/// Version tag reported by the PII redactor.
pub const PII_DETECTION_MODEL_VERSION: &str = "1.0.0";
