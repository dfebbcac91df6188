//! Ollama API Provider
//!
//! This module implements the LlmProvider trait against a local Ollama
//! server's /api/chat endpoint. No API key is required.

use crate::error::{Result, QueryMindError};
use crate::llm::client::LlmHttpClient;
use crate::llm::provider::{ChatTurn, GenerationParams, LlmProvider, LlmResponse};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Default Ollama base URL
const OLLAMA_DEFAULT_BASE: &str = "http://localhost:11434";

/// Ollama chat provider
pub struct OllamaProvider {
    /// Base URL of the Ollama server
    base_url: String,
    /// Model to use (e.g., "qwen3:latest", "llama3.1:latest")
    model: String,
    /// HTTP client for making requests
    client: LlmHttpClient,
    /// Sampling temperature
    temperature: f32,
    /// Maximum tokens to generate (num_predict)
    max_tokens: u32,
}

impl OllamaProvider {
    /// Create a new Ollama provider
    ///
    /// # Arguments
    /// * `model` - Model identifier
    /// * `base_url` - Server base URL (defaults to localhost:11434)
    pub fn new(model: impl Into<String>, base_url: Option<String>) -> Result<Self> {
        Ok(Self {
            base_url: base_url.unwrap_or_else(|| OLLAMA_DEFAULT_BASE.to_string()),
            model: model.into(),
            client: LlmHttpClient::new()?,
            temperature: 0.6,
            max_tokens: 2500,
        })
    }

    /// Create a provider with a custom request timeout
    pub fn with_timeout(mut self, timeout_secs: u64) -> Result<Self> {
        self.client = LlmHttpClient::with_timeout(timeout_secs)?;
        Ok(self)
    }

    /// Set the default sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the default generation limit
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn chat_endpoint(&self) -> String {
        format!("{}/api/chat", self.base_url.trim_end_matches('/'))
    }

    /// Convert chat turns to the Ollama wire format
    fn convert_turns(&self, turns: &[ChatTurn]) -> Vec<OllamaMessage> {
        turns
            .iter()
            .map(|turn| OllamaMessage {
                role: turn.role.as_str().to_string(),
                content: turn.content.clone(),
            })
            .collect()
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    /// Generate a response from the Ollama chat API
    async fn chat(
        &self,
        turns: &[ChatTurn],
        params: Option<&GenerationParams>,
    ) -> Result<LlmResponse> {
        let temperature = params
            .and_then(|p| p.temperature)
            .unwrap_or(self.temperature);
        let num_predict = params.and_then(|p| p.max_tokens).unwrap_or(self.max_tokens);

        let request = OllamaRequest {
            model: self.model.clone(),
            messages: self.convert_turns(turns),
            stream: false,
            options: OllamaOptions {
                temperature,
                num_predict,
                stop: params.and_then(|p| p.stop_sequences.clone()),
            },
        };

        let headers = LlmHttpClient::build_plain_headers();
        let response_text = self
            .client
            .post_with_retry(&self.chat_endpoint(), headers, &request)
            .await?;

        let ollama_response: OllamaResponse =
            serde_json::from_str(&response_text).map_err(|e| QueryMindError::LlmApi {
                provider: "Ollama".to_string(),
                message: format!("Failed to parse response: {}", e),
                status: 0,
            })?;

        Ok(LlmResponse {
            content: ollama_response.message.content,
            model: Some(ollama_response.model),
            input_tokens: ollama_response.prompt_eval_count,
            output_tokens: ollama_response.eval_count,
            finish_reason: ollama_response.done_reason,
        })
    }

    fn provider_name(&self) -> &str {
        "Ollama"
    }

    /// Ollama is a local server; no credentials needed
    fn has_credentials(&self) -> bool {
        true
    }
}

/// Ollama chat request format
#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    stream: bool,
    options: OllamaOptions,
}

/// Ollama sampling options
#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
}

/// Ollama chat message format
#[derive(Debug, Serialize, Deserialize)]
struct OllamaMessage {
    role: String,
    content: String,
}

/// Ollama chat response format
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    model: String,
    message: OllamaMessage,
    #[serde(default)]
    done_reason: Option<String>,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_provider_creation() {
        let provider = OllamaProvider::new("qwen3:latest", None).unwrap();
        assert_eq!(provider.model, "qwen3:latest");
        assert_eq!(provider.base_url, OLLAMA_DEFAULT_BASE);
        assert!(provider.has_credentials());
    }

    #[test]
    fn test_chat_endpoint_trims_slash() {
        let provider =
            OllamaProvider::new("llama3.1:latest", Some("http://ollama:11434/".to_string()))
                .unwrap();
        assert_eq!(provider.chat_endpoint(), "http://ollama:11434/api/chat");
    }

    #[test]
    fn test_turn_conversion() {
        let provider = OllamaProvider::new("qwen3:latest", None).unwrap();
        let turns = vec![
            ChatTurn::system("You are a database assistant."),
            ChatTurn::user("List the tables"),
        ];
        let messages = provider.convert_turns(&turns);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].role, "user");
        assert_eq!(messages[1].content, "List the tables");
    }

    #[test]
    fn test_response_parsing() {
        let raw = r#"{
            "model": "qwen3:latest",
            "message": {"role": "assistant", "content": "Answer: done"},
            "done_reason": "stop",
            "prompt_eval_count": 42,
            "eval_count": 7
        }"#;
        let parsed: OllamaResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.message.content, "Answer: done");
        assert_eq!(parsed.prompt_eval_count, Some(42));
    }
}
