//! Input validation utilities.
//!
//! This module contains functions for validating caller inputs before any pipeline stage runs.
//! A request that fails validation is rejected outright; nothing is partially processed.

use crate::constants::{MAX_CONTEXT_CHARS, MAX_SESSION_ID_LEN};
use crate::{PaeonError, PaeonResult};
use paeon_types::NonEmptyText;

/// Validates a free-text symptom description.
///
/// The text is trimmed and must contain between 1 and `max_chars` characters.
///
/// # Errors
///
/// Returns [`PaeonError::InputValidation`] for blank or over-long text.
pub fn validate_symptom_text(text: &str, max_chars: usize) -> PaeonResult<NonEmptyText> {
    NonEmptyText::bounded(text, max_chars).map_err(|source| PaeonError::InputValidation {
        field: "text",
        source,
    })
}

/// Validates the optional clinical context attached to a request.
///
/// Blank context is treated as absent.
pub fn validate_context(context: Option<&str>) -> PaeonResult<Option<NonEmptyText>> {
    match context {
        None => Ok(None),
        Some(c) if c.trim().is_empty() => Ok(None),
        Some(c) => NonEmptyText::bounded(c, MAX_CONTEXT_CHARS)
            .map(Some)
            .map_err(|source| PaeonError::InputValidation {
                field: "context",
                source,
            }),
    }
}

/// Validates that a session identifier is safe to log and echo back.
///
/// - Rejects empty or whitespace-only strings
/// - Bounds the length to avoid pathological inputs
/// - Restricts characters to a conservative ASCII set
///
/// # Errors
///
/// Returns [`PaeonError::InvalidInput`] if the session id is invalid.
pub fn validate_session_id(session_id: &str) -> PaeonResult<()> {
    if session_id.trim().is_empty() {
        return Err(PaeonError::InvalidInput(
            "session_id cannot be empty".into(),
        ));
    }

    if session_id.len() > MAX_SESSION_ID_LEN {
        return Err(PaeonError::InvalidInput(format!(
            "session_id exceeds maximum length of {} characters",
            MAX_SESSION_ID_LEN
        )));
    }

    let ok = session_id
        .bytes()
        .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'.' | b'-' | b'_'));

    if !ok {
        return Err(PaeonError::InvalidInput(
            "session_id contains invalid characters (only alphanumeric, '.', '-', '_' allowed)"
                .into(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use paeon_types::TextError;

    #[test]
    fn symptom_text_is_trimmed() {
        let text = validate_symptom_text("  my head is pounding  ", 2_000).unwrap();
        assert_eq!(text.as_str(), "my head is pounding");
    }

    #[test]
    fn blank_symptom_text_is_rejected() {
        let err = validate_symptom_text(" \n ", 2_000).unwrap_err();
        assert!(matches!(
            err,
            PaeonError::InputValidation {
                field: "text",
                source: TextError::Empty
            }
        ));
        assert!(err.is_input_error());
    }

    #[test]
    fn over_long_symptom_text_is_rejected() {
        let long = "a".repeat(2_001);
        let err = validate_symptom_text(&long, 2_000).unwrap_err();
        assert!(matches!(
            err,
            PaeonError::InputValidation {
                source: TextError::TooLong {
                    max: 2_000,
                    actual: 2_001
                },
                ..
            }
        ));
    }

    #[test]
    fn blank_context_is_absent() {
        assert!(validate_context(None).unwrap().is_none());
        assert!(validate_context(Some("   ")).unwrap().is_none());
        assert_eq!(
            validate_context(Some("after exercise")).unwrap().unwrap().as_str(),
            "after exercise"
        );
    }

    #[test]
    fn over_long_context_is_rejected() {
        let long = "x".repeat(501);
        assert!(validate_context(Some(&long)).is_err());
    }

    #[test]
    fn session_id_charset_is_restricted() {
        assert!(validate_session_id("sess-42_a.b").is_ok());
        assert!(validate_session_id("").is_err());
        assert!(validate_session_id("has space").is_err());
        assert!(validate_session_id("naïve").is_err());
        assert!(validate_session_id(&"s".repeat(129)).is_err());
    }
}
