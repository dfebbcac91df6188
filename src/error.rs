//! Error types for querymind
//!
//! This module defines the error types used throughout the application.
//!
//! The agent-facing variants follow a deliberate split: `Parse` and
//! `Operation` are recoverable per reasoning cycle (they are absorbed into
//! the trace as observations so the model can self-correct), while
//! `ModelInvocation`, `BudgetExceeded` and `TurnTimeout` abort the turn and
//! cross the loop boundary to the caller.

use thiserror::Error;

/// Result type alias for querymind
pub type Result<T> = std::result::Result<T, QueryMindError>;

/// Main error type for querymind
#[derive(Error, Debug)]
pub enum QueryMindError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// IO-related errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP-related errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid database connection URL
    #[error("Invalid database URL: {0}")]
    InvalidDatabaseUrl(String),

    /// Unsupported database type
    #[error("Unsupported database type: {0}")]
    UnsupportedDatabaseType(String),

    /// LLM provider errors (missing key, bad config)
    #[error("LLM provider error: {0}")]
    LlmProvider(String),

    /// LLM API returned a non-success status or unusable body
    #[error("LLM API error ({provider}, status {status}): {message}")]
    LlmApi {
        provider: String,
        message: String,
        status: u16,
    },

    /// Model output did not match any recognized reasoning-step shape.
    /// Recoverable: the loop records it as an observation and continues.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A dispatched operation failed or targeted an unknown operation.
    /// Recoverable: the dispatcher renders it into an observation.
    #[error("Operation error: {0}")]
    Operation(String),

    /// The language-model capability was unreachable, errored or timed out.
    /// Fatal for the current turn.
    #[error("Model invocation failed: {0}")]
    ModelInvocation(String),

    /// The per-turn cycle budget ran out without a final answer.
    /// Fatal for the current turn.
    #[error("Reasoning budget exceeded after {cycles} cycles without a final answer")]
    BudgetExceeded { cycles: usize },

    /// The per-turn wall-clock budget ran out without a final answer.
    /// Fatal for the current turn.
    #[error("Turn timed out after {seconds}s without a final answer")]
    TurnTimeout { seconds: u64 },

    /// Command parsing errors
    #[error("Command parsing error: {0}")]
    CommandParse(String),

    /// Invalid command syntax with expected usage
    #[error("Invalid syntax for {command}. Expected: {expected}")]
    InvalidCommandSyntax { command: String, expected: String },

    /// Unknown slash command
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),
}

impl QueryMindError {
    /// Wrap a database connection failure with the URL that caused it
    pub fn db_connection(url: String, source: sqlx::Error) -> Self {
        QueryMindError::Config(format!("Failed to connect to {}: {}", url, source))
    }

    /// True if this error aborts the current turn (crosses the loop boundary)
    pub fn is_turn_fatal(&self) -> bool {
        matches!(
            self,
            QueryMindError::ModelInvocation(_)
                | QueryMindError::BudgetExceeded { .. }
                | QueryMindError::TurnTimeout { .. }
        )
    }
}
