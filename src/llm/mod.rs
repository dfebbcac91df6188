//! LLM integration module
//!
//! This module provides trait-based LLM provider abstraction: the model
//! invoker boundary the agent loop talks to, plus concrete backends.

pub mod client;
pub mod provider;

// Provider implementations
pub mod providers {
    pub mod ollama;
    pub mod openai;
}

// Re-exports
pub use provider::{ChatRole, ChatTurn, GenerationParams, LlmProvider, LlmResponse};
