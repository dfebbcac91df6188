//! Configuration storage
//!
//! Persistent storage of configuration data including API keys,
//! per-provider model overrides and the selected provider.

use crate::error::{QueryMindError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// Configuration file name
const CONFIG_FILE: &str = "config.toml";

/// Persistent configuration data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API keys for LLM providers
    pub api_keys: HashMap<String, String>,
    /// Model configurations for each provider
    pub models: HashMap<String, String>,
    /// Current selected provider
    pub current_provider: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_keys: HashMap::new(),
            models: Self::default_models(),
            current_provider: None,
        }
    }
}

impl Config {
    /// Get default models for each provider
    pub fn default_models() -> HashMap<String, String> {
        let mut models = HashMap::new();
        models.insert("ollama".to_string(), "qwen3:latest".to_string());
        models.insert("openai".to_string(), "gpt-4o-mini".to_string());
        models
    }

    /// Create a new empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the configuration directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| {
                QueryMindError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "Could not find configuration directory",
                ))
            })?
            .join("querymind");

        fs::create_dir_all(&config_dir)?;

        Ok(config_dir)
    }

    /// Get the configuration file path
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }

    /// Load configuration from disk, falling back to defaults when the
    /// file does not exist yet
    pub fn load() -> Result<Self> {
        let config_file = Self::config_file()?;

        if !config_file.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(&config_file)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| QueryMindError::Config(format!("invalid config file: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let config_file = Self::config_file()?;

        let content = toml::to_string_pretty(self)
            .map_err(|e| QueryMindError::Config(format!("failed to serialize config: {}", e)))?;

        fs::write(&config_file, content)?;

        Ok(())
    }

    /// Get model for a provider
    pub fn get_model(&self, provider: &str) -> Option<String> {
        self.models.get(provider).cloned()
    }

    /// Set model for a provider
    pub fn set_model(&mut self, provider: String, model: String) {
        self.models.insert(provider, model);
    }

    /// Set API key for a provider
    pub fn set_api_key(&mut self, provider: String, key: String) {
        self.api_keys.insert(provider, key);
    }

    /// Get API key for a provider
    pub fn get_api_key(&self, provider: &str) -> Option<&String> {
        self.api_keys.get(provider)
    }

    /// List all configured providers
    pub fn list_providers(&self) -> Vec<String> {
        self.api_keys.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = Config::new();
        assert!(!config.models.is_empty());
        assert!(config.models.contains_key("ollama"));
        assert!(config.models.contains_key("openai"));
    }

    #[test]
    fn test_model_management() {
        let mut config = Config::new();

        config.set_model("ollama".to_string(), "llama3.1:8b".to_string());
        assert_eq!(
            config.get_model("ollama"),
            Some("llama3.1:8b".to_string())
        );
    }

    #[test]
    fn test_api_key_management() {
        let mut config = Config::new();
        assert!(config.list_providers().is_empty());

        config.set_api_key("openai".to_string(), "sk-test".to_string());
        assert_eq!(config.get_api_key("openai"), Some(&"sk-test".to_string()));
        assert_eq!(config.list_providers(), vec!["openai".to_string()]);
    }
}
