//! REPL implementation
//!
//! The interactive Read-Eval-Print loop for QueryMind. Slash commands
//! manage the connection and provider configuration; everything else is
//! handed to the reasoning agent as a natural-language turn.

use crate::agent::Agent;
use crate::cli::commands::{format_error, help_text, mask_key, Command, CommandType};
use crate::config::settings::{AgentSettings, LlmSettings};
use crate::config::AppState;
use crate::database::DatabasePool;
use crate::error::{QueryMindError, Result};
use crate::llm::providers::ollama::OllamaProvider;
use crate::llm::providers::openai::OpenAiProvider;
use crate::llm::LlmProvider;
use crate::tools::register_database_tools;
use rustyline::completion::Completer;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::Context;
use rustyline::Helper;
use rustyline::{CompletionType, Config, Editor};
use std::sync::Arc;
use tracing::info;

/// QueryMind command completer
struct QueryMindCompleter;

impl Completer for QueryMindCompleter {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        _pos: usize,
        _ctx: &Context<'_>,
    ) -> std::result::Result<(usize, Vec<String>), ReadlineError> {
        let commands = vec![
            "/connect",
            "/config",
            "/use",
            "/model",
            "/providers",
            "/clear",
            "/help",
            "/quit",
            "/exit",
        ];

        if line.starts_with('/') {
            let matches: Vec<String> = commands
                .into_iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|s| s.to_string())
                .collect();
            Ok((0, matches))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Hinter for QueryMindCompleter {
    type Hint = String;
}

impl Highlighter for QueryMindCompleter {}

impl Validator for QueryMindCompleter {}

impl Helper for QueryMindCompleter {}

/// QueryMind REPL
pub struct Repl {
    /// The rustyline editor
    editor: Editor<QueryMindCompleter, DefaultHistory>,
    /// Whether the REPL should continue running
    running: bool,
    /// Provider keys, model overrides and the active connection
    state: AppState,
    /// The reasoning agent (built once a database is connected)
    agent: Option<Agent>,
    /// Model invocation settings from the environment
    llm_settings: LlmSettings,
    /// Agent budgets from the environment
    agent_settings: AgentSettings,
}

impl Repl {
    /// Create a new REPL instance
    pub fn new() -> Result<Self> {
        let config = Config::builder()
            .history_ignore_space(true)
            .completion_type(CompletionType::List)
            .auto_add_history(true)
            .build();

        let mut editor = Editor::<QueryMindCompleter, DefaultHistory>::with_config(config)
            .map_err(|e| {
                QueryMindError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    format!("Failed to initialize editor: {}", e),
                ))
            })?;
        editor.set_helper(Some(QueryMindCompleter));

        let history_path = dirs::home_dir()
            .map(|p| p.join(".querymind").join("history"))
            .unwrap_or_else(|| ".querymind-history".into());
        let _ = editor.load_history(&history_path);

        Ok(Self {
            editor,
            running: true,
            state: AppState::new(),
            agent: None,
            llm_settings: LlmSettings::from_env(),
            agent_settings: AgentSettings::from_env(),
        })
    }

    /// Run the REPL loop
    pub async fn run(&mut self) -> Result<()> {
        self.print_welcome();

        while self.running {
            match self.editor.readline("> ") {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    let _ = self.editor.add_history_entry(line);

                    match Command::parse(line) {
                        Ok(command) => self.handle_command(command).await,
                        Err(e) => println!("{}", format_error(&e)),
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    self.running = false;
                }
                Err(err) => {
                    println!("Error: {:?}", err);
                    self.running = false;
                }
            }
        }

        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("QueryMind v{}", env!("CARGO_PKG_VERSION"));
        println!("Natural-language database agent");
        println!();
        println!("Start with /connect <database_url>, or /help for all commands.");
        println!();
    }

    /// Handle a parsed command
    async fn handle_command(&mut self, command: Command) {
        match command.command_type {
            CommandType::Connect { url } => match self.connect(&url).await {
                Ok(backend) => println!("Connected to {} database", backend),
                Err(e) => println!("{}", format_error(&e)),
            },
            CommandType::Config { provider, key } => {
                let masked = mask_key(&key);
                self.state.set_api_key(provider.clone(), key);
                println!("API key configured for provider: {} ({})", provider, masked);
                self.rebuild_agent_if_connected();
            }
            CommandType::Use { provider } => {
                if provider != "ollama" && provider != "openai" {
                    println!(
                        "Error: Unknown provider '{}'. Available: ollama, openai",
                        provider
                    );
                    return;
                }
                self.state.set_current_provider(provider.clone());
                println!("Switched to provider: {}", provider);
                self.rebuild_agent_if_connected();
            }
            CommandType::Model { provider, model } => {
                self.state.set_model(provider.clone(), model.clone());
                println!("Model for {} set to {}", provider, model);
                self.rebuild_agent_if_connected();
            }
            CommandType::Providers => {
                let current = self
                    .state
                    .get_current_provider()
                    .cloned()
                    .unwrap_or_else(|| "ollama".to_string());
                for provider in ["ollama", "openai"] {
                    let marker = if provider == current { "*" } else { " " };
                    let model = self
                        .state
                        .get_model(provider)
                        .unwrap_or_else(|| "(default)".to_string());
                    println!("{} {:<8} model: {}", marker, provider, model);
                }
            }
            CommandType::Clear => {
                if let Some(agent) = self.agent.as_mut() {
                    agent.clear_memory();
                }
                println!("Conversation memory cleared");
            }
            CommandType::Help => println!("{}", help_text()),
            CommandType::Quit => {
                println!("Goodbye!");
                self.running = false;
            }
            CommandType::Query { text } => {
                let Some(agent) = self.agent.as_mut() else {
                    println!("Not connected. Use /connect <database_url> first.");
                    return;
                };
                match agent.run_turn(&text).await {
                    Ok(response) => println!("{}", response),
                    Err(e) => println!("{}", format_error(&e)),
                }
            }
        }
    }

    /// Open the pool, verify it answers, and build the agent over it
    async fn connect(&mut self, url: &str) -> Result<&'static str> {
        let pool = DatabasePool::from_url(url).await?;
        pool.test_connection().await?;
        let backend = pool.backend().name();
        info!(backend, "database connection established");

        self.state.pool = Some(pool.clone());
        self.agent = Some(self.build_agent(pool)?);
        Ok(backend)
    }

    /// Construct a fresh agent over the given pool. Conversation memory
    /// starts empty.
    fn build_agent(&self, pool: DatabasePool) -> Result<Agent> {
        let provider = self.build_provider()?;
        let registry = Arc::new(register_database_tools(pool));
        let config = self
            .agent_settings
            .agent_config(self.llm_settings.generation_params());
        Ok(Agent::with_config(provider, registry, config))
    }

    /// Build the selected LLM provider from state and settings
    fn build_provider(&self) -> Result<Arc<dyn LlmProvider>> {
        let name = self
            .state
            .get_current_provider()
            .cloned()
            .unwrap_or_else(|| "ollama".to_string());

        match name.as_str() {
            "ollama" => {
                let model = self
                    .state
                    .get_model("ollama")
                    .unwrap_or_else(|| self.llm_settings.ollama_model.clone());
                let provider =
                    OllamaProvider::new(model, Some(self.llm_settings.ollama_base_url.clone()))?
                        .with_timeout(self.llm_settings.request_timeout_secs)?
                        .with_temperature(self.llm_settings.temperature)
                        .with_max_tokens(self.llm_settings.max_tokens);
                Ok(Arc::new(provider))
            }
            "openai" => {
                let key = self
                    .state
                    .get_api_key("openai")
                    .cloned()
                    .or_else(|| std::env::var("OPENAI_API_KEY").ok())
                    .ok_or_else(|| {
                        QueryMindError::LlmProvider(
                            "No API key for openai. Use /config openai <key>".to_string(),
                        )
                    })?;
                let mut provider = OpenAiProvider::new(key, self.state.get_model("openai"))?
                    .with_max_tokens(self.llm_settings.max_tokens);
                if let Ok(endpoint) = std::env::var("OPENAI_API_BASE") {
                    provider = provider.with_endpoint(endpoint);
                }
                Ok(Arc::new(provider))
            }
            other => Err(QueryMindError::LlmProvider(format!(
                "Unknown provider: {}",
                other
            ))),
        }
    }

    /// Rebuild the agent after a provider or model change, keeping the
    /// existing connection. Conversation memory does not survive the swap.
    fn rebuild_agent_if_connected(&mut self) {
        let Some(pool) = self.state.pool.clone() else {
            return;
        };
        match self.build_agent(pool) {
            Ok(agent) => self.agent = Some(agent),
            Err(e) => println!("{}", format_error(&e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repl_creation() {
        let repl = Repl::new();
        assert!(repl.is_ok());
        let repl = repl.unwrap();
        assert!(repl.running);
        assert!(repl.agent.is_none());
    }
}
