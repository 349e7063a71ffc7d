pub mod models;

use crate::config::QuizConfig;
use crate::core::LowLevelClient;
use crate::error::{AIError, GeminiError, QuizError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, error, info, instrument, warn};

pub use models::GeminiModel;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
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
    response_mime_type: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

/// Configuration for Gemini client
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: GeminiModel,
    pub max_output_tokens: u32,
    pub temperature: f32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: GeminiModel::default(),
            max_output_tokens: 8192,
            temperature: 0.7,
        }
    }
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("model", &self.model)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("temperature", &self.temperature)
            .finish_non_exhaustive()
    }
}

impl GeminiConfig {
    /// Build from the quiz configuration. Fails when no credential is set.
    pub fn from_quiz_config(config: &QuizConfig) -> Result<Self, QuizError> {
        Ok(Self {
            api_key: config.require_api_key()?.to_string(),
            model: GeminiModel::from_id(&config.model),
            ..Default::default()
        })
    }
}

#[derive(Clone)]
pub struct GeminiClient {
    config: GeminiConfig,
    client: Client,
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.config.model.id())
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Create a new Gemini client with full configuration
    pub fn new(config: GeminiConfig) -> Result<Self, QuizError> {
        if config.api_key.trim().is_empty() {
            return Err(QuizError::Configuration("Gemini API key is empty".to_string()));
        }
        info!(model = %config.model.id(), "Creating new Gemini client");
        Ok(Self {
            config,
            client: Client::new(),
        })
    }

    /// Create a client from the quiz configuration (credential + model).
    pub fn from_config(config: &QuizConfig) -> Result<Self, QuizError> {
        Self::new(GeminiConfig::from_quiz_config(config)?)
    }

    pub fn model(&self) -> &GeminiModel {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!("{GEMINI_API_BASE}/models/{}:generateContent", self.config.model.id())
    }
}

#[async_trait]
impl LowLevelClient for GeminiClient {
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len(), model = %self.config.model.id()))]
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_output_tokens,
                response_mime_type: "application/json".to_string(),
            },
        };

        debug!("Sending request to Gemini API");
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP request failed");
                GeminiError::Http(e.to_string())
            })?;

        let status = response.status();
        debug!(status = %status, "Received response from Gemini API");

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(status_error(status, &error_text).into());
        }

        let body: GenerateContentResponse = response.json().await.map_err(|e| {
            error!(error = %e, "Failed to parse Gemini response JSON");
            GeminiError::Http(e.to_string())
        })?;

        let text = candidate_text(body)?;
        info!(response_len = text.len(), "Successfully received Gemini response");
        Ok(text)
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> {
        Box::new(self.clone())
    }
}

/// Map a non-success HTTP status onto the matching [`GeminiError`].
fn status_error(status: StatusCode, body: &str) -> GeminiError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => {
            warn!("Gemini API rate limit exceeded");
            GeminiError::RateLimit
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            error!(status = %status, "Gemini API authentication failed");
            GeminiError::Authentication
        }
        _ => {
            error!(status = %status, error = %body, "Gemini API error");
            GeminiError::Api(format!("{status}: {body}"))
        }
    }
}

/// Text of the first candidate, joined across its parts.
fn candidate_text(body: GenerateContentResponse) -> Result<String, GeminiError> {
    let candidate = body.candidates.into_iter().next().ok_or_else(|| {
        error!("No candidates in Gemini response");
        GeminiError::Api("No candidates in response".to_string())
    })?;

    if candidate.finish_reason.as_deref() == Some("SAFETY") {
        warn!("Gemini response blocked by safety filters");
        return Err(GeminiError::ContentFiltered);
    }

    let text: String = candidate
        .content
        .map(|content| content.parts.into_iter().map(|part| part.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        error!("Gemini candidate carried no text");
        return Err(GeminiError::Api("Empty response text".to_string()));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(body: serde_json::Value) -> GenerateContentResponse {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn throttling_and_credentials_have_their_own_errors() {
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, ""),
            GeminiError::RateLimit
        ));
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, ""),
            GeminiError::Authentication
        ));
        assert!(matches!(
            status_error(StatusCode::FORBIDDEN, "denied"),
            GeminiError::Authentication
        ));
    }

    #[test]
    fn other_failures_keep_status_and_body() {
        match status_error(StatusCode::INTERNAL_SERVER_ERROR, "backend exploded") {
            GeminiError::Api(message) => {
                assert!(message.contains("500"));
                assert!(message.contains("backend exploded"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn candidate_parts_are_joined() {
        let body = response(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "{\"questions\":" }, { "text": "[]}" }] },
                "finishReason": "STOP"
            }]
        }));
        assert_eq!(candidate_text(body).unwrap(), "{\"questions\":[]}");
    }

    #[test]
    fn missing_candidates_is_an_api_error() {
        assert!(matches!(candidate_text(response(json!({}))), Err(GeminiError::Api(_))));
        assert!(matches!(
            candidate_text(response(json!({ "candidates": [] }))),
            Err(GeminiError::Api(_))
        ));
    }

    #[test]
    fn safety_stop_is_content_filtered() {
        let body = response(json!({
            "candidates": [{ "finishReason": "SAFETY" }]
        }));
        assert!(matches!(candidate_text(body), Err(GeminiError::ContentFiltered)));
    }

    #[test]
    fn blank_candidate_text_is_an_api_error() {
        let body = response(json!({
            "candidates": [{ "content": { "parts": [{ "text": "  " }] }, "finishReason": "STOP" }]
        }));
        assert!(matches!(candidate_text(body), Err(GeminiError::Api(_))));

        let no_content = response(json!({ "candidates": [{ "finishReason": "MAX_TOKENS" }] }));
        assert!(matches!(candidate_text(no_content), Err(GeminiError::Api(_))));
    }

    #[test]
    fn missing_credential_is_a_configuration_error() {
        let config = QuizConfig::default();
        assert!(matches!(
            GeminiClient::from_config(&config),
            Err(QuizError::Configuration(_))
        ));
    }

    #[test]
    fn configured_model_is_used_for_the_endpoint() {
        let config = QuizConfig {
            api_key: Some("super-secret".to_string()),
            model: "gemini-2.5-pro".to_string(),
            ..QuizConfig::default()
        };
        let client = GeminiClient::from_config(&config).unwrap();
        assert_eq!(client.model(), &GeminiModel::Pro);
        assert!(client.endpoint().ends_with("/models/gemini-2.5-pro:generateContent"));
        assert!(!format!("{client:?}").contains("super-secret"));
    }

    #[test]
    fn unknown_models_pass_through() {
        assert_eq!(
            GeminiModel::from_id("gemini-exp-1206").id(),
            "gemini-exp-1206"
        );
    }
}
