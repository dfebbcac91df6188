//! Command parsing for the CLI
//!
//! All `/` commands understood by the querymind REPL. Anything that does
//! not start with `/` is treated as a natural-language request for the
//! agent.

use crate::error::{QueryMindError, Result};

/// Command types
#[derive(Debug, Clone, PartialEq)]
pub enum CommandType {
    /// Connect to a database
    Connect { url: String },
    /// Set configuration (API keys)
    Config { provider: String, key: String },
    /// Switch to a different LLM provider
    Use { provider: String },
    /// Set model for a provider
    Model { provider: String, model: String },
    /// List configured LLM providers
    Providers,
    /// Clear conversation memory
    Clear,
    /// Show help message
    Help,
    /// Exit the application
    Quit,
    /// Natural language request for the agent
    Query { text: String },
}

/// Parsed command
#[derive(Debug, Clone)]
pub struct Command {
    /// The type of command
    pub command_type: CommandType,
}

impl Command {
    /// Parse a command from user input
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        if !input.starts_with('/') {
            return Ok(Command {
                command_type: CommandType::Query {
                    text: input.to_string(),
                },
            });
        }

        let parts: Vec<&str> = input.splitn(3, ' ').collect();
        let cmd = parts[0];

        let command_type = match cmd {
            "/connect" => {
                if parts.len() < 2 {
                    return Err(QueryMindError::InvalidCommandSyntax {
                        command: cmd.to_string(),
                        expected: "/connect <database_url>".to_string(),
                    });
                }
                CommandType::Connect {
                    url: parts[1].to_string(),
                }
            }
            "/config" => {
                if parts.len() < 3 {
                    return Err(QueryMindError::InvalidCommandSyntax {
                        command: cmd.to_string(),
                        expected: "/config <provider> <api_key>".to_string(),
                    });
                }
                CommandType::Config {
                    provider: parts[1].to_string(),
                    key: parts[2].to_string(),
                }
            }
            "/use" => {
                if parts.len() < 2 {
                    return Err(QueryMindError::InvalidCommandSyntax {
                        command: cmd.to_string(),
                        expected: "/use <provider>".to_string(),
                    });
                }
                CommandType::Use {
                    provider: parts[1].to_string(),
                }
            }
            "/model" => {
                if parts.len() < 3 {
                    return Err(QueryMindError::InvalidCommandSyntax {
                        command: cmd.to_string(),
                        expected: "/model <provider> <model>".to_string(),
                    });
                }
                CommandType::Model {
                    provider: parts[1].to_string(),
                    model: parts[2].to_string(),
                }
            }
            "/providers" => CommandType::Providers,
            "/clear" => CommandType::Clear,
            "/help" => CommandType::Help,
            "/quit" | "/exit" => CommandType::Quit,
            _ => return Err(QueryMindError::UnknownCommand(cmd.to_string())),
        };

        Ok(Command { command_type })
    }
}

/// Mask an API key for display
pub fn mask_key(key: &str) -> String {
    if key.len() > 8 {
        format!("{}...{}", &key[..4], &key[key.len() - 4..])
    } else {
        "***".to_string()
    }
}

/// Help text shown by /help
pub fn help_text() -> String {
    r#"
QueryMind Commands

Database:
  /connect <url>     Connect to a database (postgresql://, mysql://, sqlite://)

Configuration:
  /config <provider> <key>   Set API key for an LLM provider
  /use <provider>            Switch to a different LLM provider (ollama, openai)
  /model <provider> <model>  Set model for a provider
  /providers                 List configured providers

Session:
  /clear             Clear conversation memory
  /help              Show this help message
  /quit, /exit       Exit QueryMind

Natural Language:
  Any text without a / prefix is sent to the agent.

Examples:
  /connect sqlite://./demo.db
  /model ollama qwen3:latest
  Create a users table and insert Alice with alice@example.com
"#
    .to_string()
}

/// Format an error for display
pub fn format_error(error: &QueryMindError) -> String {
    format!("Error: {}", error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_connect_command() {
        let cmd = Command::parse("/connect postgresql://localhost/test").unwrap();
        assert_eq!(
            cmd.command_type,
            CommandType::Connect {
                url: "postgresql://localhost/test".to_string()
            }
        );
    }

    #[test]
    fn test_parse_config_command() {
        let cmd = Command::parse("/config openai test-key-123").unwrap();
        assert_eq!(
            cmd.command_type,
            CommandType::Config {
                provider: "openai".to_string(),
                key: "test-key-123".to_string()
            }
        );
    }

    #[test]
    fn test_parse_use_and_model() {
        let cmd = Command::parse("/use ollama").unwrap();
        assert_eq!(
            cmd.command_type,
            CommandType::Use {
                provider: "ollama".to_string()
            }
        );

        let cmd = Command::parse("/model ollama llama3.1:8b").unwrap();
        assert_eq!(
            cmd.command_type,
            CommandType::Model {
                provider: "ollama".to_string(),
                model: "llama3.1:8b".to_string()
            }
        );
    }

    #[test]
    fn test_parse_session_commands() {
        assert_eq!(
            Command::parse("/clear").unwrap().command_type,
            CommandType::Clear
        );
        assert_eq!(
            Command::parse("/help").unwrap().command_type,
            CommandType::Help
        );
        assert_eq!(
            Command::parse("/quit").unwrap().command_type,
            CommandType::Quit
        );
        assert_eq!(
            Command::parse("/exit").unwrap().command_type,
            CommandType::Quit
        );
    }

    #[test]
    fn test_parse_query() {
        let cmd = Command::parse("Show me all users").unwrap();
        assert_eq!(
            cmd.command_type,
            CommandType::Query {
                text: "Show me all users".to_string()
            }
        );
    }

    #[test]
    fn test_parse_invalid_command() {
        assert!(Command::parse("/invalid").is_err());
    }

    #[test]
    fn test_parse_missing_args() {
        assert!(Command::parse("/connect").is_err());
        assert!(Command::parse("/config openai").is_err());
        assert!(Command::parse("/model ollama").is_err());
    }

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("sk-abcdefgh1234"), "sk-a...1234");
        assert_eq!(mask_key("short"), "***");
    }
}
