//! # Paeon Core
//!
//! Core logic for translating patient descriptions of symptoms into clinical vocabulary, and for
//! scoring drug education content for fair balance.
//!
//! This crate contains the translation pipeline and its stages:
//! - PII redaction before any text leaves the process
//! - Language detection and normalization to English
//! - Curated lexicon matching with a semantic fallback
//! - A safety guardrail over every emitted mapping
//! - Fair-balance scoring against drug labels
//! - Hashed audit records for every call
//!
//! **No API concerns**: HTTP servers, request DTOs and language-model clients belong in
//! `api-rest`, `api-shared` and `llm`. External services are reached only through the traits in
//! [`collaborators`].

pub mod audit;
pub mod balance;
pub mod collaborators;
pub mod config;
pub mod constants;
pub mod error;
pub mod fallback;
pub mod label;
pub mod language;
pub mod lexicon;
pub mod mapping;
pub mod pii;
pub mod pool;
pub mod safety;
pub mod translation;
pub mod validation;

pub use audit::{AuditAction, AuditRecord, MemoryAuditSink, TracingAuditSink};
pub use balance::{BalanceService, DrugBalance, FairBalanceAssessment, FairBalanceInput};
pub use collaborators::{AuditSink, LabelSource, LinguisticAdapter, SemanticMapper};
pub use config::{CoreConfig, MatchingThresholds};
pub use error::{CollaboratorError, CollaboratorResult, PaeonError, PaeonResult};
pub use label::{DrugLabel, StaticLabelSource};
pub use language::{supported_languages, SupportedLanguage};
pub use lexicon::{Lexicon, LexiconEntry, LexiconMatcher};
pub use mapping::{ClinicalMapping, CodeEntry, Provenance};
pub use pii::{PiiCategory, PiiRedactor, RedactionReport};
pub use safety::{SafetyGuardrail, ViolationCategory};
pub use translation::{Collaborators, TranslationRequest, TranslationResult, TranslationService};
