//! Configuration module
//!
//! Persistent provider configuration (API keys, model overrides) plus
//! the in-memory application state shared by the REPL.

pub mod settings;
pub mod storage;

use crate::database::DatabasePool;
use std::collections::HashMap;

pub use settings::{AgentSettings, LlmSettings};

/// Application state
pub struct AppState {
    /// Active database pool (none until /connect)
    pub pool: Option<DatabasePool>,
    /// LLM provider API keys
    pub api_keys: HashMap<String, String>,
    /// Model configurations for each provider
    pub models: HashMap<String, String>,
    /// Current selected provider
    pub current_provider: Option<String>,
}

impl AppState {
    /// Create a new application state, loading from disk if available
    pub fn new() -> Self {
        match storage::Config::load() {
            Ok(config) => Self {
                pool: None,
                api_keys: config.api_keys,
                models: config.models,
                current_provider: config.current_provider,
            },
            Err(_) => Self {
                pool: None,
                api_keys: HashMap::new(),
                models: storage::Config::default_models(),
                current_provider: None,
            },
        }
    }

    /// Store an API key for a provider and save to disk
    pub fn set_api_key(&mut self, provider: String, key: String) {
        self.api_keys.insert(provider.clone(), key);
        if self.current_provider.is_none() {
            self.current_provider = Some(provider);
        }
        let _ = self.save();
    }

    /// Get API key for a provider
    pub fn get_api_key(&self, provider: &str) -> Option<&String> {
        self.api_keys.get(provider)
    }

    /// Set model for a provider and save to disk
    pub fn set_model(&mut self, provider: String, model: String) {
        self.models.insert(provider, model);
        let _ = self.save();
    }

    /// Get model for a provider
    pub fn get_model(&self, provider: &str) -> Option<String> {
        self.models.get(provider).cloned()
    }

    /// Set the current provider and save to disk
    pub fn set_current_provider(&mut self, provider: String) {
        self.current_provider = Some(provider);
        let _ = self.save();
    }

    /// Get the current provider
    pub fn get_current_provider(&self) -> Option<&String> {
        self.current_provider.as_ref()
    }

    /// Check if a database is connected
    pub fn is_connected(&self) -> bool {
        self.pool.is_some()
    }

    /// List all configured providers
    pub fn list_providers(&self) -> Vec<String> {
        self.api_keys.keys().cloned().collect()
    }

    /// Save configuration to disk
    fn save(&self) -> crate::error::Result<()> {
        let config = storage::Config {
            api_keys: self.api_keys.clone(),
            models: self.models.clone(),
            current_provider: self.current_provider.clone(),
        };
        config.save()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
