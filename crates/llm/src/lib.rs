//! # Paeon LLM
//!
//! Language-model backed implementations of the core collaborator traits.
//!
//! [`GeminiClient`] implements both [`LinguisticAdapter`] and [`SemanticMapper`] against the
//! Gemini `generateContent` endpoint. When no API key is configured, [`language_models`] hands
//! back unavailable collaborators and the pipeline runs on the curated lexicon alone.

pub mod error;
pub mod gemini;

pub use error::{LlmError, LlmResult};
pub use gemini::{GeminiClient, GeminiConfig};

use paeon_core::collaborators::{LinguisticAdapter, SemanticMapper, UnavailableCollaborator};
use std::sync::Arc;

/// Builds the two language-model collaborators.
///
/// Falls back to [`UnavailableCollaborator`] when `config` is `None` or the client cannot be
/// built, so startup never fails on a missing model.
pub fn language_models(
    config: Option<GeminiConfig>,
) -> (Arc<dyn LinguisticAdapter>, Arc<dyn SemanticMapper>) {
    let reason = match config.map(GeminiClient::new) {
        Some(Ok(client)) => {
            tracing::info!(model = client.model(), "using Gemini language models");
            let client = Arc::new(client);
            return (client.clone(), client);
        }
        Some(Err(e)) => {
            tracing::error!(error = %e, "failed to build Gemini client");
            format!("language model client failed to start: {e}")
        }
        None => {
            tracing::warn!("GEMINI_API_KEY not set; semantic fallback and translation disabled");
            "no language model configured".to_string()
        }
    };
    let unavailable = Arc::new(UnavailableCollaborator::new(reason));
    (unavailable.clone(), unavailable)
}
