//! Environment-driven settings
//!
//! Runtime defaults can be overridden through environment variables
//! (loaded from `.env` at startup). Persistent per-provider keys and
//! model overrides live in [`crate::config::storage`] instead.

use crate::agent::AgentConfig;
use crate::llm::GenerationParams;
use std::time::Duration;

/// Default Ollama model
pub const DEFAULT_OLLAMA_MODEL: &str = "qwen3:latest";
/// Default Ollama endpoint
pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";
/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.6;
/// Default completion token limit
pub const DEFAULT_MAX_TOKENS: u32 = 2500;
/// Default per-request HTTP timeout, in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
/// Default reasoning cycle budget per turn
pub const DEFAULT_MAX_CYCLES: usize = 10;
/// Default wall-clock budget per turn, in seconds
pub const DEFAULT_TURN_TIMEOUT_SECS: u64 = 120;

/// Read an environment variable, parsing it into `T` or falling back
fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Model invocation settings
#[derive(Debug, Clone)]
pub struct LlmSettings {
    /// Model identifier for the local Ollama provider
    pub ollama_model: String,
    /// Base URL of the Ollama server
    pub ollama_base_url: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Completion token limit per invocation
    pub max_tokens: u32,
    /// Per-request HTTP timeout, in seconds
    pub request_timeout_secs: u64,
}

impl LlmSettings {
    /// Read settings from the environment, using defaults where unset
    pub fn from_env() -> Self {
        Self {
            ollama_model: env_or("OLLAMA_MODEL", DEFAULT_OLLAMA_MODEL.to_string()),
            ollama_base_url: env_or("OLLAMA_BASE_URL", DEFAULT_OLLAMA_BASE_URL.to_string()),
            temperature: env_or("OLLAMA_TEMPERATURE", DEFAULT_TEMPERATURE),
            max_tokens: env_or("OLLAMA_MAX_TOKENS", DEFAULT_MAX_TOKENS),
            request_timeout_secs: env_or(
                "OLLAMA_REQUEST_TIMEOUT",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            ),
        }
    }

    /// Generation parameters derived from these settings
    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams::new()
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens)
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            ollama_model: DEFAULT_OLLAMA_MODEL.to_string(),
            ollama_base_url: DEFAULT_OLLAMA_BASE_URL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Agent budget settings
#[derive(Debug, Clone)]
pub struct AgentSettings {
    /// Maximum reasoning cycles per turn
    pub max_cycles: usize,
    /// Wall-clock budget per turn, in seconds
    pub turn_timeout_secs: u64,
}

impl AgentSettings {
    /// Read settings from the environment, using defaults where unset
    pub fn from_env() -> Self {
        Self {
            max_cycles: env_or("AGENT_MAX_CYCLES", DEFAULT_MAX_CYCLES),
            turn_timeout_secs: env_or("AGENT_TURN_TIMEOUT_SECS", DEFAULT_TURN_TIMEOUT_SECS),
        }
    }

    /// Full agent configuration with these budgets and given params
    pub fn agent_config(&self, params: GenerationParams) -> AgentConfig {
        AgentConfig {
            max_cycles: self.max_cycles,
            turn_timeout: Duration::from_secs(self.turn_timeout_secs),
            params,
        }
    }
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_cycles: DEFAULT_MAX_CYCLES,
            turn_timeout_secs: DEFAULT_TURN_TIMEOUT_SECS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let llm = LlmSettings::default();
        assert_eq!(llm.ollama_model, "qwen3:latest");
        assert_eq!(llm.ollama_base_url, "http://localhost:11434");

        let agent = AgentSettings::default();
        assert_eq!(agent.max_cycles, 10);
        assert_eq!(agent.turn_timeout_secs, 120);
    }

    #[test]
    fn test_agent_config_conversion() {
        let agent = AgentSettings {
            max_cycles: 4,
            turn_timeout_secs: 30,
        };
        let config = agent.agent_config(GenerationParams::new());
        assert_eq!(config.max_cycles, 4);
        assert_eq!(config.turn_timeout, Duration::from_secs(30));
    }
}
