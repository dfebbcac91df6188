//! LLM Provider Trait
//!
//! This module defines the trait-based abstraction for the language-model
//! capability. The agent loop only sees this boundary: an ordered list of
//! role-tagged chat turns in, free-form text out.

use crate::error::{Result, QueryMindError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Chat turn role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatRole {
    /// System turn (sets behavior/context)
    System,
    /// User turn (query or input)
    User,
    /// Assistant turn (response)
    Assistant,
}

impl ChatRole {
    /// Wire-format name used by every chat-completion style API
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::System => "system",
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// One turn of a conversation. Immutable once appended to memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    /// Turn role
    pub role: ChatRole,
    /// Turn content
    pub content: String,
}

impl ChatTurn {
    /// Create a new system turn
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    /// Create a new user turn
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    /// Create a new assistant turn
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// LLM response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    /// Generated text content
    pub content: String,
    /// Number of tokens used (input)
    pub input_tokens: Option<u32>,
    /// Number of tokens used (output)
    pub output_tokens: Option<u32>,
    /// Model used for generation
    pub model: Option<String>,
    /// Finish reason (e.g., "stop", "length")
    pub finish_reason: Option<String>,
}

impl LlmResponse {
    /// Create a new response carrying only text
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            input_tokens: None,
            output_tokens: None,
            model: None,
            finish_reason: None,
        }
    }

    /// Get total token count if both sides were reported
    pub fn total_tokens(&self) -> Option<u32> {
        self.input_tokens
            .and_then(|input| self.output_tokens.map(|output| input + output))
    }
}

/// LLM generation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Temperature (0.0 - 1.0, higher = more random)
    pub temperature: Option<f32>,
    /// Stop sequences
    pub stop_sequences: Option<Vec<String>>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_tokens: Some(2500),
            temperature: Some(0.6),
            stop_sequences: None,
        }
    }
}

impl GenerationParams {
    /// Create new default parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Set max tokens
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Trait for LLM providers
///
/// Implementations turn a prompt (ordered chat turns) into free-form text.
/// Latency and failure bounding is the caller's job; a provider reports
/// transport and API failures as errors and never fabricates content.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a response from the LLM
    ///
    /// # Arguments
    /// * `turns` - The full prompt as ordered chat turns
    /// * `params` - Generation parameters
    ///
    /// # Returns
    /// The LLM response
    async fn chat(
        &self,
        turns: &[ChatTurn],
        params: Option<&GenerationParams>,
    ) -> Result<LlmResponse>;

    /// Get the provider name
    fn provider_name(&self) -> &str;

    /// Check if the provider has the credentials it needs
    fn has_credentials(&self) -> bool;

    /// Validate the provider configuration
    fn validate_config(&self) -> Result<()> {
        if !self.has_credentials() {
            return Err(QueryMindError::LlmProvider(format!(
                "{}: missing API credentials",
                self.provider_name()
            )));
        }
        Ok(())
    }
}
