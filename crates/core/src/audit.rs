//! Audit records for translation and scoring calls.
//!
//! Records never carry raw text or raw actor identifiers, only SHA-256 digests.

use crate::collaborators::AuditSink;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Mutex;
use uuid::Uuid;

pub const ANONYMOUS_ACTOR: &str = "anonymous";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    SlangTranslation,
    FairBalanceScoring,
}

impl AuditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            AuditAction::SlangTranslation => "slang_translation",
            AuditAction::FairBalanceScoring => "fair_balance_scoring",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub action: AuditAction,
    pub actor_hash: String,
    pub input_hash: String,
    pub output_hash: Option<String>,
    /// Confidence for translations, overall score for balance scoring.
    pub score: Option<f64>,
    pub pii_detected: bool,
    pub safety_flags: Vec<String>,
    pub session_id: Option<String>,
}

impl AuditRecord {
    pub fn new(action: AuditAction, actor_hash: String, input_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            action,
            actor_hash,
            input_hash,
            output_hash: None,
            score: None,
            pii_detected: false,
            safety_flags: Vec::new(),
            session_id: None,
        }
    }
}

/// Lowercase hex SHA-256 of `content`.
pub fn hash_content(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

/// Salted, truncated hash of an actor identifier, or `"anonymous"` when there is none.
pub fn anonymize_actor(actor_id: Option<&str>, salt: &str) -> String {
    match actor_id.map(str::trim).filter(|a| !a.is_empty()) {
        Some(actor) => {
            let mut digest = hash_content(&format!("{salt}:{actor}"));
            digest.truncate(16);
            digest
        }
        None => ANONYMOUS_ACTOR.to_string(),
    }
}

/// Emits every record as a structured `tracing` event.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, record: AuditRecord) {
        tracing::info!(
            target: "paeon::audit",
            id = %record.id,
            action = record.action.as_str(),
            actor = %record.actor_hash,
            input_hash = %record.input_hash,
            output_hash = record.output_hash.as_deref().unwrap_or(""),
            score = record.score.unwrap_or_default(),
            pii_detected = record.pii_detected,
            safety_flags = ?record.safety_flags,
            session_id = record.session_id.as_deref().unwrap_or(""),
            "audit"
        );
    }
}

/// Keeps records in memory. Used by tests and the CLI.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<AuditRecord> {
        match self.records.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, record: AuditRecord) {
        match self.records.lock() {
            Ok(mut guard) => guard.push(record),
            Err(poisoned) => poisoned.into_inner().push(record),
        }
    }
}
