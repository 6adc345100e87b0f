//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. Request handling never reads process-wide environment variables,
//! which keeps behaviour consistent across multi-threaded runtimes and test harnesses.

use crate::constants::{
    CURATED_CONFIDENCE_BASE, CURATED_CONFIDENCE_CEILING, CURATED_SCORE_WEIGHT,
    DEFAULT_ACCEPTANCE_THRESHOLD, DEFAULT_AUDIT_SALT, DEFAULT_COLLABORATOR_CONCURRENCY,
    DEFAULT_COLLABORATOR_TIMEOUT, DEFAULT_FALLBACK_CONFIDENCE, DEFAULT_MAX_INPUT_CHARS,
    DEFAULT_OVERLAP_THRESHOLD, FALLBACK_CONFIDENCE_RANGE,
};
use crate::{PaeonError, PaeonResult};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Environment variable names read by [`CoreConfig::from_lookup`].
pub mod env {
    pub const MAX_INPUT_CHARS: &str = "PAEON_MAX_INPUT_CHARS";
    pub const OVERLAP_THRESHOLD: &str = "PAEON_OVERLAP_THRESHOLD";
    pub const ACCEPTANCE_THRESHOLD: &str = "PAEON_ACCEPTANCE_THRESHOLD";
    pub const FALLBACK_CONFIDENCE: &str = "PAEON_FALLBACK_CONFIDENCE";
    pub const COLLABORATOR_TIMEOUT_MS: &str = "PAEON_COLLABORATOR_TIMEOUT_MS";
    pub const COLLABORATOR_CONCURRENCY: &str = "PAEON_COLLABORATOR_CONCURRENCY";
    pub const LEXICON_PATH: &str = "PAEON_LEXICON_PATH";
    pub const AUDIT_SALT: &str = "PAEON_AUDIT_SALT";
}

/// Thresholds used by the curated lexicon matcher.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatchingThresholds {
    /// Word-overlap ratio an expression must exceed to be considered.
    pub overlap: f64,
    /// Winning score must exceed this for the match to be accepted.
    pub acceptance: f64,
}

impl Default for MatchingThresholds {
    fn default() -> Self {
        Self {
            overlap: DEFAULT_OVERLAP_THRESHOLD,
            acceptance: DEFAULT_ACCEPTANCE_THRESHOLD,
        }
    }
}

impl MatchingThresholds {
    /// Lowest confidence an accepted curated match can carry under these thresholds.
    pub fn curated_confidence_floor(&self) -> f64 {
        (CURATED_CONFIDENCE_BASE + self.acceptance * CURATED_SCORE_WEIGHT)
            .min(CURATED_CONFIDENCE_CEILING)
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    max_input_chars: usize,
    thresholds: MatchingThresholds,
    fallback_confidence: f64,
    collaborator_timeout: Duration,
    collaborator_concurrency: usize,
    lexicon_path: Option<PathBuf>,
    audit_salt: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
            thresholds: MatchingThresholds::default(),
            fallback_confidence: DEFAULT_FALLBACK_CONFIDENCE,
            collaborator_timeout: DEFAULT_COLLABORATOR_TIMEOUT,
            collaborator_concurrency: DEFAULT_COLLABORATOR_CONCURRENCY,
            lexicon_path: None,
            audit_salt: DEFAULT_AUDIT_SALT.into(),
        }
    }
}

impl CoreConfig {
    /// Create a new `CoreConfig`, validating every tunable.
    ///
    /// # Errors
    ///
    /// Returns [`PaeonError::InvalidConfig`] if:
    /// - `max_input_chars` or `collaborator_concurrency` is zero,
    /// - a threshold lies outside `[0, 1]`,
    /// - `fallback_confidence` lies outside the fallback range or reaches the lowest curated
    ///   confidence the thresholds allow,
    /// - `collaborator_timeout` is zero,
    /// - `audit_salt` is blank.
    pub fn new(
        max_input_chars: usize,
        thresholds: MatchingThresholds,
        fallback_confidence: f64,
        collaborator_timeout: Duration,
        collaborator_concurrency: usize,
        lexicon_path: Option<PathBuf>,
        audit_salt: String,
    ) -> PaeonResult<Self> {
        if max_input_chars == 0 {
            return Err(PaeonError::InvalidConfig(
                "max_input_chars must be greater than zero".into(),
            ));
        }

        for (name, value) in [
            ("overlap threshold", thresholds.overlap),
            ("acceptance threshold", thresholds.acceptance),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(PaeonError::InvalidConfig(format!(
                    "{name} must be within [0, 1] (got {value})"
                )));
            }
        }

        let (low, high) = FALLBACK_CONFIDENCE_RANGE;
        if !(low..=high).contains(&fallback_confidence) {
            return Err(PaeonError::InvalidConfig(format!(
                "fallback confidence must be within [{low}, {high}] (got {fallback_confidence})"
            )));
        }

        let floor = thresholds.curated_confidence_floor();
        if fallback_confidence >= floor {
            return Err(PaeonError::InvalidConfig(format!(
                "fallback confidence {fallback_confidence} must stay below the curated floor {floor}"
            )));
        }

        if collaborator_timeout.is_zero() {
            return Err(PaeonError::InvalidConfig(
                "collaborator timeout must be greater than zero".into(),
            ));
        }

        if collaborator_concurrency == 0 {
            return Err(PaeonError::InvalidConfig(
                "collaborator concurrency must be greater than zero".into(),
            ));
        }

        if audit_salt.trim().is_empty() {
            return Err(PaeonError::InvalidConfig("audit salt cannot be empty".into()));
        }

        Ok(Self {
            max_input_chars,
            thresholds,
            fallback_confidence,
            collaborator_timeout,
            collaborator_concurrency,
            lexicon_path,
            audit_salt,
        })
    }

    /// Resolve configuration from a key lookup, falling back to defaults for absent keys.
    ///
    /// `lookup` is typically `|k| std::env::var(k).ok()`; tests pass a map instead so they
    /// never touch process-wide state.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> PaeonResult<Self> {
        let defaults = Self::default();

        let max_input_chars =
            parse_value(env::MAX_INPUT_CHARS, lookup(env::MAX_INPUT_CHARS))?
                .unwrap_or(defaults.max_input_chars);
        let thresholds = MatchingThresholds {
            overlap: parse_value(env::OVERLAP_THRESHOLD, lookup(env::OVERLAP_THRESHOLD))?
                .unwrap_or(defaults.thresholds.overlap),
            acceptance: parse_value(
                env::ACCEPTANCE_THRESHOLD,
                lookup(env::ACCEPTANCE_THRESHOLD),
            )?
            .unwrap_or(defaults.thresholds.acceptance),
        };
        let fallback_confidence =
            parse_value(env::FALLBACK_CONFIDENCE, lookup(env::FALLBACK_CONFIDENCE))?
                .unwrap_or(defaults.fallback_confidence);
        let collaborator_timeout = parse_value::<u64>(
            env::COLLABORATOR_TIMEOUT_MS,
            lookup(env::COLLABORATOR_TIMEOUT_MS),
        )?
        .map(Duration::from_millis)
        .unwrap_or(defaults.collaborator_timeout);
        let collaborator_concurrency = parse_value(
            env::COLLABORATOR_CONCURRENCY,
            lookup(env::COLLABORATOR_CONCURRENCY),
        )?
        .unwrap_or(defaults.collaborator_concurrency);
        let lexicon_path = non_blank(lookup(env::LEXICON_PATH)).map(PathBuf::from);
        let audit_salt = non_blank(lookup(env::AUDIT_SALT)).unwrap_or(defaults.audit_salt);

        Self::new(
            max_input_chars,
            thresholds,
            fallback_confidence,
            collaborator_timeout,
            collaborator_concurrency,
            lexicon_path,
            audit_salt,
        )
    }

    /// Resolve configuration from the process environment. Call once at startup.
    pub fn from_env() -> PaeonResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn max_input_chars(&self) -> usize {
        self.max_input_chars
    }

    pub fn thresholds(&self) -> MatchingThresholds {
        self.thresholds
    }

    pub fn fallback_confidence(&self) -> f64 {
        self.fallback_confidence
    }

    pub fn collaborator_timeout(&self) -> Duration {
        self.collaborator_timeout
    }

    pub fn collaborator_concurrency(&self) -> usize {
        self.collaborator_concurrency
    }

    pub fn lexicon_path(&self) -> Option<&Path> {
        self.lexicon_path.as_deref()
    }

    pub fn audit_salt(&self) -> &str {
        &self.audit_salt
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse an optional configuration value.
///
/// `None` and blank strings mean "not set"; anything else must parse as `T`.
fn parse_value<T: FromStr>(key: &str, value: Option<String>) -> PaeonResult<Option<T>> {
    non_blank(value)
        .map(|v| {
            v.parse::<T>().map_err(|_| {
                PaeonError::InvalidConfig(format!("{key} has an unparseable value: {v:?}"))
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_lookup_yields_defaults() {
        let cfg = CoreConfig::from_lookup(|_| None).expect("defaults are valid");
        assert_eq!(cfg.max_input_chars(), 2_000);
        assert_eq!(cfg.thresholds(), MatchingThresholds::default());
        assert_eq!(cfg.fallback_confidence(), 0.75);
        assert_eq!(cfg.collaborator_concurrency(), 2);
        assert_eq!(cfg.collaborator_timeout(), Duration::from_secs(10));
        assert!(cfg.lexicon_path().is_none());
        assert_eq!(cfg.audit_salt(), "paeon_audit");
    }

    #[test]
    fn lookup_overrides_are_applied() {
        let cfg = CoreConfig::from_lookup(lookup_from(&[
            (env::MAX_INPUT_CHARS, "500"),
            (env::OVERLAP_THRESHOLD, "0.6"),
            (env::ACCEPTANCE_THRESHOLD, " 0.4 "),
            (env::FALLBACK_CONFIDENCE, "0.78"),
            (env::COLLABORATOR_TIMEOUT_MS, "250"),
            (env::COLLABORATOR_CONCURRENCY, "4"),
            (env::LEXICON_PATH, "/etc/paeon/lexicon.yaml"),
        ]))
        .expect("valid overrides");

        assert_eq!(cfg.max_input_chars(), 500);
        assert_eq!(cfg.thresholds().overlap, 0.6);
        assert_eq!(cfg.thresholds().acceptance, 0.4);
        assert_eq!(cfg.fallback_confidence(), 0.78);
        assert_eq!(cfg.collaborator_timeout(), Duration::from_millis(250));
        assert_eq!(cfg.collaborator_concurrency(), 4);
        assert_eq!(
            cfg.lexicon_path(),
            Some(Path::new("/etc/paeon/lexicon.yaml"))
        );
    }

    #[test]
    fn blank_values_are_treated_as_unset() {
        let cfg = CoreConfig::from_lookup(lookup_from(&[
            (env::MAX_INPUT_CHARS, "   "),
            (env::LEXICON_PATH, ""),
        ]))
        .expect("blank values fall back to defaults");
        assert_eq!(cfg.max_input_chars(), 2_000);
        assert!(cfg.lexicon_path().is_none());
    }

    #[test]
    fn unparseable_value_is_rejected() {
        let err = CoreConfig::from_lookup(lookup_from(&[(env::COLLABORATOR_CONCURRENCY, "two")]))
            .expect_err("expected parse failure");
        assert!(matches!(err, PaeonError::InvalidConfig(msg) if msg.contains("PAEON_COLLABORATOR_CONCURRENCY")));
    }

    #[test]
    fn fallback_confidence_must_stay_in_range() {
        let err = CoreConfig::from_lookup(lookup_from(&[(env::FALLBACK_CONFIDENCE, "0.95")]))
            .expect_err("0.95 would rival curated confidence");
        assert!(matches!(err, PaeonError::InvalidConfig(_)));
    }

    #[test]
    fn fallback_confidence_must_stay_below_curated_floor() {
        assert!((MatchingThresholds::default().curated_confidence_floor() - 0.825).abs() < 1e-9);

        let err = CoreConfig::from_lookup(lookup_from(&[(env::FALLBACK_CONFIDENCE, "0.9")]))
            .expect_err("0.9 outranks a weak curated match");
        assert!(matches!(err, PaeonError::InvalidConfig(msg) if msg.contains("curated floor")));

        let err = CoreConfig::from_lookup(lookup_from(&[(env::ACCEPTANCE_THRESHOLD, "0.1")]))
            .expect_err("default fallback outranks curated matches accepted at 0.1");
        assert!(matches!(err, PaeonError::InvalidConfig(_)));

        let cfg = CoreConfig::from_lookup(lookup_from(&[(env::FALLBACK_CONFIDENCE, "0.8")]))
            .expect("0.8 stays below the default floor");
        assert!(cfg.fallback_confidence() < cfg.thresholds().curated_confidence_floor());
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let err = CoreConfig::from_lookup(lookup_from(&[(env::COLLABORATOR_CONCURRENCY, "0")]))
            .expect_err("expected validation failure");
        assert!(matches!(err, PaeonError::InvalidConfig(_)));
    }

    #[test]
    fn threshold_outside_unit_interval_is_rejected() {
        let err = CoreConfig::from_lookup(lookup_from(&[(env::OVERLAP_THRESHOLD, "1.5")]))
            .expect_err("expected validation failure");
        assert!(matches!(err, PaeonError::InvalidConfig(msg) if msg.contains("overlap")));
    }
}
