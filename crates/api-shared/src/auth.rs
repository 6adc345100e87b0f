//! API key checking for the REST surface.

/// Header carrying the caller's API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Environment variable holding the expected key. Unset disables the check.
pub const API_KEY_ENV: &str = "API_KEY";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing x-api-key header")]
    MissingKey,
    #[error("invalid API key")]
    InvalidKey,
}

/// Reads the expected API key once at startup.
pub fn api_key_from_env() -> Option<String> {
    std::env::var(API_KEY_ENV)
        .ok()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
}

/// Validates the provided API key against the expected one.
pub fn validate_api_key(provided_key: Option<&str>, expected_key: &str) -> Result<(), AuthError> {
    match provided_key {
        None => Err(AuthError::MissingKey),
        Some(key) if key == expected_key => Ok(()),
        Some(_) => Err(AuthError::InvalidKey),
    }
}
