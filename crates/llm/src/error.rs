use paeon_core::CollaboratorError;

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("API key is empty")]
    MissingApiKey,
    #[error("invalid language model configuration: {0}")]
    InvalidConfig(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: HTTP {status}: {body}")]
    Api { status: u16, body: String },
    #[error("failed to parse response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

pub type LlmResult<T> = std::result::Result<T, LlmError>;

impl From<LlmError> for CollaboratorError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::MissingApiKey | LlmError::InvalidConfig(_) => {
                CollaboratorError::Unavailable(e.to_string())
            }
            LlmError::Http(_) | LlmError::Api { .. } => CollaboratorError::Transport(e.to_string()),
            LlmError::Json(_) | LlmError::InvalidResponse(_) => {
                CollaboratorError::MalformedResponse(e.to_string())
            }
        }
    }
}
