//! OpenAI API Provider
//!
//! This module implements the LlmProvider trait for OpenAI's chat
//! completions API (and OpenAI-compatible endpoints via a custom base URL).

use crate::error::{Result, QueryMindError};
use crate::llm::client::LlmHttpClient;
use crate::llm::provider::{ChatTurn, GenerationParams, LlmProvider, LlmResponse};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// OpenAI chat completions URL
const OPENAI_API_BASE: &str = "https://api.openai.com/v1/chat/completions";

/// OpenAI GPT API provider
pub struct OpenAiProvider {
    /// API key for authentication
    api_key: String,
    /// Model to use (e.g., "gpt-4o", "gpt-4o-mini")
    model: String,
    /// Endpoint URL (OPENAI_API_BASE unless overridden)
    endpoint: String,
    /// HTTP client for making requests
    client: LlmHttpClient,
    /// Maximum tokens for generation
    max_tokens: u32,
}

impl OpenAiProvider {
    /// Create a new OpenAI provider
    ///
    /// # Arguments
    /// * `api_key` - OpenAI API key
    /// * `model` - Model identifier (defaults to gpt-4o-mini)
    pub fn new(api_key: impl Into<String>, model: Option<String>) -> Result<Self> {
        Ok(Self {
            api_key: api_key.into(),
            model: model.unwrap_or_else(|| "gpt-4o-mini".to_string()),
            endpoint: OPENAI_API_BASE.to_string(),
            client: LlmHttpClient::new()?,
            max_tokens: 2500,
        })
    }

    /// Point the provider at an OpenAI-compatible endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the maximum tokens for generation
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Convert chat turns to the OpenAI wire format
    fn convert_turns(&self, turns: &[ChatTurn]) -> Vec<OpenAiMessage> {
        turns
            .iter()
            .map(|turn| OpenAiMessage {
                role: turn.role.as_str().to_string(),
                content: turn.content.clone(),
            })
            .collect()
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    /// Generate a response from the chat completions API
    async fn chat(
        &self,
        turns: &[ChatTurn],
        params: Option<&GenerationParams>,
    ) -> Result<LlmResponse> {
        let max_tokens = params.and_then(|p| p.max_tokens).unwrap_or(self.max_tokens);
        let temperature = params.and_then(|p| p.temperature).unwrap_or(0.6);

        let request = OpenAiRequest {
            model: self.model.clone(),
            messages: self.convert_turns(turns),
            max_tokens: Some(max_tokens),
            temperature: Some(temperature),
            stop: params.and_then(|p| p.stop_sequences.clone()),
        };

        let headers = LlmHttpClient::build_headers(&self.api_key)?;
        let response_text = self
            .client
            .post_with_retry(&self.endpoint, headers, &request)
            .await?;

        let openai_response: OpenAiResponse =
            serde_json::from_str(&response_text).map_err(|e| QueryMindError::LlmApi {
                provider: "OpenAI".to_string(),
                message: format!("Failed to parse response: {}", e),
                status: 0,
            })?;

        let content = openai_response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .unwrap_or_default();

        Ok(LlmResponse {
            content,
            model: Some(openai_response.model),
            input_tokens: openai_response.usage.as_ref().map(|u| u.prompt_tokens),
            output_tokens: openai_response.usage.as_ref().map(|u| u.completion_tokens),
            finish_reason: openai_response
                .choices
                .first()
                .and_then(|c| c.finish_reason.clone()),
        })
    }

    fn provider_name(&self) -> &str {
        "OpenAI"
    }

    fn has_credentials(&self) -> bool {
        !self.api_key.is_empty()
    }
}

/// OpenAI API request format
#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
}

/// OpenAI API message format
#[derive(Debug, Serialize, Clone)]
struct OpenAiMessage {
    role: String,
    content: String,
}

/// OpenAI API response format
#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    model: String,
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

/// Choice in OpenAI response
#[derive(Debug, Deserialize, Clone)]
struct Choice {
    message: OpenAiMessageResponse,
    finish_reason: Option<String>,
}

/// Message in OpenAI response
#[derive(Debug, Deserialize, Clone)]
struct OpenAiMessageResponse {
    content: Option<String>,
}

/// Token usage information
#[derive(Debug, Deserialize, Clone)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_provider_creation() {
        let provider = OpenAiProvider::new("test-key", None).unwrap();
        assert_eq!(provider.model, "gpt-4o-mini");
        assert_eq!(provider.max_tokens, 2500);
        assert!(provider.has_credentials());
    }

    #[test]
    fn test_openai_provider_with_custom_model() {
        let provider = OpenAiProvider::new("test-key", Some("gpt-4o".to_string())).unwrap();
        assert_eq!(provider.model, "gpt-4o");
    }

    #[test]
    fn test_missing_credentials() {
        let provider = OpenAiProvider::new("", None).unwrap();
        assert!(!provider.has_credentials());
        assert!(provider.validate_config().is_err());
    }

    #[test]
    fn test_turn_conversion() {
        let provider = OpenAiProvider::new("test-key", None).unwrap();

        let turns = vec![
            ChatTurn::system("You are a helpful assistant."),
            ChatTurn::user("Hello"),
            ChatTurn::assistant("Hi there!"),
        ];

        let messages = provider.convert_turns(&turns);
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].role, "user");
        assert_eq!(messages[2].role, "assistant");
        assert_eq!(messages[2].content, "Hi there!");
    }
}
