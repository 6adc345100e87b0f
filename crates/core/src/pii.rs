//! PII detection and redaction.
//!
//! Every rule is applied in a fixed order, each over the output of the previous one. More specific
//! rules (date of birth, record numbers, card numbers) run before the generic date and digit-run
//! rules so that the more informative placeholder wins. Placeholders contain no digits and no
//! capitalised words, so redacting already-redacted text changes nothing.

use crate::constants::PII_DETECTION_MODEL_VERSION;
use regex::{Captures, NoExpand, Regex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Confidence reported for a category detected by a structural pattern.
const PATTERN_CONFIDENCE: f64 = 0.95;
/// Confidence reported for heuristic name detection.
const NAME_CONFIDENCE: f64 = 0.8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PiiCategory {
    Email,
    Dob,
    Mrn,
    CreditCard,
    Aadhaar,
    PhoneIndia,
    PhoneUs,
    Ssn,
    PhoneGeneric,
    Date,
    IpAddress,
    Name,
}

impl PiiCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            PiiCategory::Email => "email",
            PiiCategory::Dob => "dob",
            PiiCategory::Mrn => "mrn",
            PiiCategory::CreditCard => "credit_card",
            PiiCategory::Aadhaar => "aadhaar",
            PiiCategory::PhoneIndia => "phone_india",
            PiiCategory::PhoneUs => "phone_us",
            PiiCategory::Ssn => "ssn",
            PiiCategory::PhoneGeneric => "phone_generic",
            PiiCategory::Date => "date",
            PiiCategory::IpAddress => "ip_address",
            PiiCategory::Name => "name",
        }
    }

    fn confidence(self) -> f64 {
        match self {
            PiiCategory::Name => NAME_CONFIDENCE,
            _ => PATTERN_CONFIDENCE,
        }
    }
}

impl std::fmt::Display for PiiCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

struct PiiRule {
    category: PiiCategory,
    pattern: Regex,
    placeholder: &'static str,
}

impl PiiRule {
    fn new(category: PiiCategory, pattern: &str, placeholder: &'static str) -> Self {
        Self {
            category,
            pattern: Regex::new(pattern).expect("valid PII regex"),
            placeholder,
        }
    }
}

static RULES: LazyLock<Vec<PiiRule>> = LazyLock::new(|| {
    use PiiCategory::*;
    vec![
        PiiRule::new(
            Email,
            r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b",
            "[EMAIL_REDACTED]",
        ),
        PiiRule::new(
            Dob,
            r"(?i)\b(?:DOB|Date\s*of\s*Birth|Born)[\s:]*\d{1,2}[-/]\d{1,2}[-/]\d{2,4}\b",
            "[DOB_REDACTED]",
        ),
        PiiRule::new(
            Mrn,
            r"(?i)\b(?:MRN|MR|Patient\s*ID)[\s:#-]*\d{4,12}\b",
            "[MRN_REDACTED]",
        ),
        PiiRule::new(
            CreditCard,
            r"\b(?:\d{4}[\s-]?){3}\d{4}\b",
            "[CARD_REDACTED]",
        ),
        PiiRule::new(
            Aadhaar,
            r"\b\d{4}[\s-]?\d{4}[\s-]?\d{4}\b",
            "[AADHAAR_REDACTED]",
        ),
        PiiRule::new(
            PhoneIndia,
            r"(?:\+91[-\s]?|\b)[6-9]\d{9}\b",
            "[PHONE_REDACTED]",
        ),
        PiiRule::new(
            PhoneUs,
            r"(?:\+1[-\s]?)?(?:\(\d{3}\)|\b\d{3})[-\s]?\d{3}[-\s]?\d{4}\b",
            "[PHONE_REDACTED]",
        ),
        PiiRule::new(Ssn, r"\b\d{3}[\s-]?\d{2}[\s-]?\d{4}\b", "[SSN_REDACTED]"),
        PiiRule::new(PhoneGeneric, r"\b\d{10,15}\b", "[PHONE_REDACTED]"),
        PiiRule::new(Date, r"\b\d{1,2}[-/]\d{1,2}[-/]\d{2,4}\b", "[DATE_REDACTED]"),
        PiiRule::new(IpAddress, r"\b(?:\d{1,3}\.){3}\d{1,3}\b", "[IP_REDACTED]"),
        // Capitalised names run until the first lowercase word; lowercase names take at most two.
        PiiRule::new(
            Name,
            r"\b(?i:mr|mrs|ms|dr|prof)\.\s+(?:[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*|(?i:[a-z]+(?:\s+[a-z]+)?))\b",
            "[NAME_REDACTED]",
        ),
        PiiRule::new(
            Name,
            r"\b(?i:my\s+name\s+is|i\s+am|i'm)\s+[A-Z][a-z]+\b",
            "[NAME_REDACTED]",
        ),
    ]
});

static EMAIL_PARTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Za-z0-9._%+-]+)@([A-Za-z0-9.-]+)\.([A-Za-z]{2,})\b").expect("valid regex")
});

static PHONE_DIGITS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\+[0-9]{1,3}[\s-]?)?\b([0-9]{7,15})\b").expect("valid regex")
});

/// What the redactor found. Produced once per call and never modified.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RedactionReport {
    /// Detected categories in rule order, without duplicates.
    pub categories: Vec<PiiCategory>,
    pub match_count: usize,
    pub confidence: BTreeMap<PiiCategory, f64>,
    /// Length of the input in characters.
    pub original_length: usize,
    /// Length of the redacted output in characters.
    pub stripped_length: usize,
    pub model_version: String,
}

impl RedactionReport {
    pub fn pii_detected(&self) -> bool {
        self.match_count > 0
    }
}

/// Pattern-based PII redactor.
///
/// Stateless; the compiled rule set is shared process-wide.
#[derive(Clone, Copy, Debug, Default)]
pub struct PiiRedactor;

impl PiiRedactor {
    /// Creates a redactor, compiling the rule set if this is the first use.
    pub fn new() -> Self {
        LazyLock::force(&RULES);
        Self
    }

    /// Replaces every detected PII span with its category placeholder.
    pub fn redact(&self, text: &str) -> (String, RedactionReport) {
        let mut sanitized = text.to_owned();
        let mut categories: Vec<PiiCategory> = Vec::new();
        let mut confidence = BTreeMap::new();
        let mut match_count = 0;

        for rule in RULES.iter() {
            let hits = rule.pattern.find_iter(&sanitized).count();
            if hits == 0 {
                continue;
            }
            match_count += hits;
            if !categories.contains(&rule.category) {
                categories.push(rule.category);
            }
            confidence.insert(rule.category, rule.category.confidence());
            sanitized = rule
                .pattern
                .replace_all(&sanitized, NoExpand(rule.placeholder))
                .into_owned();
        }

        if match_count > 0 {
            tracing::debug!(
                matches = match_count,
                categories = ?categories,
                "redacted PII from input"
            );
        }

        let report = RedactionReport {
            categories,
            match_count,
            confidence,
            original_length: text.chars().count(),
            stripped_length: sanitized.chars().count(),
            model_version: PII_DETECTION_MODEL_VERSION.into(),
        };
        (sanitized, report)
    }

    /// Runs detection without returning the rewritten text.
    pub fn detect(&self, text: &str) -> RedactionReport {
        self.redact(text).1
    }

    /// Returns true when no PII is detected in `text`.
    pub fn validate_no_pii(&self, text: &str) -> bool {
        !self.detect(text).pii_detected()
    }

    /// Partially masks emails and phone-like digit runs for display.
    ///
    /// `john@example.com` becomes `j***@e******.com`; `9876543210` becomes `******3210`.
    /// This is a display helper only and is never used on the translation path.
    pub fn mask_partial(&self, text: &str, mask: char) -> String {
        let masked = EMAIL_PARTS.replace_all(text, |caps: &Captures<'_>| {
            format!(
                "{}@{}.{}",
                keep_first(&caps[1], mask),
                keep_first(&caps[2], mask),
                &caps[3]
            )
        });

        PHONE_DIGITS
            .replace_all(&masked, |caps: &Captures<'_>| {
                let prefix = caps.get(1).map_or("", |m| m.as_str());
                let digits = &caps[2];
                let hidden = digits.chars().count().saturating_sub(4);
                let tail = digits
                    .char_indices()
                    .nth(hidden)
                    .map_or("", |(at, _)| &digits[at..]);
                format!("{prefix}{}{tail}", mask.to_string().repeat(hidden))
            })
            .into_owned()
    }
}

fn keep_first(value: &str, mask: char) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => {
            let rest = chars.count();
            std::iter::once(first)
                .chain(std::iter::repeat(mask).take(rest))
                .collect()
        }
        None => String::new(),
    }
}
