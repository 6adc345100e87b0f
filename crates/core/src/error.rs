use std::time::Duration;

/// Errors surfaced by the Paeon core.
///
/// Only [`PaeonError::InputValidation`] can escape a translation or scoring request; the other
/// variants are raised while building services at startup.
#[derive(Debug, thiserror::Error)]
pub enum PaeonError {
    #[error("invalid {field}: {source}")]
    InputValidation {
        field: &'static str,
        #[source]
        source: paeon_types::TextError,
    },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to read lexicon file: {0}")]
    LexiconRead(std::io::Error),
    #[error("failed to parse lexicon YAML: {0}")]
    LexiconParse(serde_yaml::Error),
    #[error("invalid lexicon: {0}")]
    InvalidLexicon(String),
}

impl PaeonError {
    /// Returns true when the error was caused by caller input rather than server state.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            PaeonError::InputValidation { .. } | PaeonError::InvalidInput(_)
        )
    }
}

pub type PaeonResult<T> = std::result::Result<T, PaeonError>;

/// Failure of an external collaborator call.
///
/// These never reach the caller of the pipeline: each stage converts them into its documented
/// fail-open or fail-safe default.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CollaboratorError {
    #[error("collaborator call timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
    #[error("collaborator transport error: {0}")]
    Transport(String),
    #[error("collaborator returned a malformed response: {0}")]
    MalformedResponse(String),
    #[error("collaborator pool is closed")]
    PoolClosed,
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),
}

impl CollaboratorError {
    /// Short, stable name of the failure kind, suitable for rationales and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            CollaboratorError::Timeout(_) => "Timeout",
            CollaboratorError::Transport(_) => "TransportError",
            CollaboratorError::MalformedResponse(_) => "MalformedResponse",
            CollaboratorError::PoolClosed => "PoolClosed",
            CollaboratorError::Unavailable(_) => "Unavailable",
        }
    }
}

pub type CollaboratorResult<T> = std::result::Result<T, CollaboratorError>;
