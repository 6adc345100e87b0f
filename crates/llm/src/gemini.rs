//! Gemini `generateContent` client.

use crate::{LlmError, LlmResult};
use async_trait::async_trait;
use paeon_core::collaborators::{
    linguistic_adapter_prompt, semantic_mapping_prompt, LinguisticAdapter, SemanticMapper,
};
use paeon_core::{CollaboratorError, CollaboratorResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable names read by [`GeminiConfig::from_lookup`].
pub mod env {
    pub const API_KEY: &str = "GEMINI_API_KEY";
    pub const MODEL: &str = "GEMINI_MODEL";
    pub const BASE_URL: &str = "GEMINI_BASE_URL";
    pub const TIMEOUT_MS: &str = "GEMINI_TIMEOUT_MS";
}

const TRANSLATION_SETTINGS: GenerationSettings = GenerationSettings {
    max_output_tokens: 200,
    temperature: 0.1,
};

const MAPPING_SETTINGS: GenerationSettings = GenerationSettings {
    max_output_tokens: 500,
    temperature: 0.3,
};

#[derive(Clone)]
pub struct GeminiConfig {
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> LlmResult<Self> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(LlmError::MissingApiKey);
        }
        Ok(Self {
            api_key,
            model: DEFAULT_MODEL.into(),
            base_url: DEFAULT_BASE_URL.into(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reads the `GEMINI_*` variables through `lookup`.
    ///
    /// Returns `Ok(None)` when no API key is set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> LlmResult<Option<Self>> {
        let Some(api_key) = lookup(env::API_KEY).filter(|k| !k.trim().is_empty()) else {
            return Ok(None);
        };
        let mut config = Self::new(api_key)?;

        if let Some(model) = lookup(env::MODEL).filter(|m| !m.trim().is_empty()) {
            config = config.with_model(model.trim());
        }
        if let Some(url) = lookup(env::BASE_URL).filter(|u| !u.trim().is_empty()) {
            config = config.with_base_url(url.trim());
        }
        if let Some(raw) = lookup(env::TIMEOUT_MS) {
            let ms: u64 = raw.trim().parse().map_err(|_| {
                LlmError::InvalidConfig(format!("{} must be an integer, got {raw:?}", env::TIMEOUT_MS))
            })?;
            if ms == 0 {
                return Err(LlmError::InvalidConfig(format!(
                    "{} must be greater than zero",
                    env::TIMEOUT_MS
                )));
            }
            config = config.with_timeout(Duration::from_millis(ms));
        }
        Ok(Some(config))
    }

    pub fn from_env() -> LlmResult<Option<Self>> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"***")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Clone, Copy, Debug)]
struct GenerationSettings {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: Option<u32>,
    #[serde(default)]
    candidates_token_count: Option<u32>,
}

fn build_request(prompt: String, settings: GenerationSettings) -> GenerateRequest {
    GenerateRequest {
        contents: vec![Content {
            parts: vec![Part { text: prompt }],
        }],
        generation_config: GenerationConfig {
            temperature: settings.temperature,
            max_output_tokens: settings.max_output_tokens,
        },
    }
}

/// Joins the text parts of the first candidate.
fn extract_text(body: &str) -> LlmResult<String> {
    let response: GenerateResponse = serde_json::from_str(body)?;

    if let Some(usage) = &response.usage_metadata {
        tracing::debug!(
            prompt_tokens = ?usage.prompt_token_count,
            response_tokens = ?usage.candidates_token_count,
            "gemini usage"
        );
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::InvalidResponse("no candidates in response".into()))?;
    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".into());
        return Err(LlmError::InvalidResponse(format!(
            "empty candidate (finish reason: {reason})"
        )));
    }
    Ok(text)
}

#[derive(Clone, Debug)]
pub struct GeminiClient {
    config: GeminiConfig,
    client: Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> LlmResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    pub fn model(&self) -> &str {
        self.config.model()
    }

    async fn generate(&self, prompt: String, settings: GenerationSettings) -> LlmResult<String> {
        let request = build_request(prompt, settings);
        let response = self
            .client
            .post(self.config.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::error!(status = status.as_u16(), "gemini request failed");
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }
        extract_text(&body)
    }
}

#[async_trait]
impl LinguisticAdapter for GeminiClient {
    async fn translate_to_english(
        &self,
        text: &str,
        source_language: &str,
    ) -> CollaboratorResult<String> {
        let prompt = linguistic_adapter_prompt(text, source_language);
        let english = self
            .generate(prompt, TRANSLATION_SETTINGS)
            .await
            .map_err(CollaboratorError::from)?;
        Ok(english.trim().to_string())
    }
}

#[async_trait]
impl SemanticMapper for GeminiClient {
    async fn map_symptom(&self, text: &str) -> CollaboratorResult<String> {
        let prompt = semantic_mapping_prompt(text);
        self.generate(prompt, MAPPING_SETTINGS)
            .await
            .map_err(CollaboratorError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn request_serializes_camel_case() {
        let request = build_request("hello".into(), TRANSLATION_SETTINGS);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 200);
        assert!(json["generationConfig"]["temperature"].as_f64().unwrap() < 0.11);
    }

    #[test]
    fn extracts_first_candidate_text() {
        let body = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "Tinnitus"}], "role": "model"}, "finishReason": "STOP"},
                {"content": {"parts": [{"text": "Otalgia"}]}}
            ],
            "usageMetadata": {"promptTokenCount": 80, "candidatesTokenCount": 2}
        }"#;
        assert_eq!(extract_text(body).unwrap(), "Tinnitus");
    }

    #[test]
    fn empty_or_invalid_responses_are_errors() {
        assert!(matches!(
            extract_text(r#"{"candidates": []}"#),
            Err(LlmError::InvalidResponse(_))
        ));
        let blocked = r#"{"candidates": [{"finishReason": "SAFETY"}]}"#;
        match extract_text(blocked) {
            Err(LlmError::InvalidResponse(msg)) => assert!(msg.contains("SAFETY")),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(matches!(extract_text("not json"), Err(LlmError::Json(_))));
    }

    #[test]
    fn config_from_lookup() {
        assert!(GeminiConfig::from_lookup(lookup(&[])).unwrap().is_none());
        assert!(GeminiConfig::from_lookup(lookup(&[(env::API_KEY, "  ")]))
            .unwrap()
            .is_none());

        let config = GeminiConfig::from_lookup(lookup(&[
            (env::API_KEY, "secret"),
            (env::MODEL, "gemini-pro"),
            (env::BASE_URL, "http://localhost:9000/v1/"),
            (env::TIMEOUT_MS, "1500"),
        ]))
        .unwrap()
        .unwrap();
        assert_eq!(config.model(), "gemini-pro");
        assert_eq!(config.timeout, Duration::from_millis(1500));
        assert_eq!(
            config.endpoint(),
            "http://localhost:9000/v1/models/gemini-pro:generateContent"
        );
        assert!(!format!("{config:?}").contains("secret"));

        let err = GeminiConfig::from_lookup(lookup(&[
            (env::API_KEY, "secret"),
            (env::TIMEOUT_MS, "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, LlmError::InvalidConfig(_)));
    }
}
