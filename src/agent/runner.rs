//! The reasoning-and-dispatch control loop
//!
//! One `Agent` owns one conversation: its memory, its per-turn trace and
//! its budgets. The registry and the model provider are shared, read-only
//! collaborators. Each call to `run_turn` drives the cycle
//! prepare -> invoke -> parse -> (dispatch) until the model produces a
//! final answer or a fatal condition ends the turn:
//!
//! - parse failures and operation failures are absorbed into the trace as
//!   observations so the model can self-correct;
//! - a failed model invocation, an exhausted cycle budget or an expired
//!   wall-clock deadline abort the turn and surface to the caller.
//!
//! Budgets are checked at cycle boundaries only; an in-flight invocation
//! or dispatch is never cancelled mid-call.

use crate::agent::dispatch::dispatch;
use crate::agent::memory::ConversationMemory;
use crate::agent::parser::parse_reasoning;
use crate::agent::prompt::{format_prompt, SYSTEM_PROMPT};
use crate::agent::step::{ReasoningStep, ReasoningTrace};
use crate::error::{Result, QueryMindError};
use crate::llm::{GenerationParams, LlmProvider};
use crate::tools::ToolRegistry;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Per-turn budgets and generation settings
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Maximum reasoning cycles per turn (each cycle is one model invocation)
    pub max_cycles: usize,
    /// Wall-clock budget per turn, checked at cycle boundaries
    pub turn_timeout: Duration,
    /// Generation parameters forwarded to the provider
    pub params: GenerationParams,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_cycles: 10,
            turn_timeout: Duration::from_secs(120),
            params: GenerationParams::default(),
        }
    }
}

/// One conversation's reasoning agent
pub struct Agent {
    /// The language-model capability
    provider: Arc<dyn LlmProvider>,
    /// Fixed operation catalog, shared across conversations
    registry: Arc<ToolRegistry>,
    /// This conversation's append-only history
    memory: ConversationMemory,
    /// Budgets and generation settings
    config: AgentConfig,
}

impl Agent {
    /// Create an agent with default budgets
    pub fn new(provider: Arc<dyn LlmProvider>, registry: Arc<ToolRegistry>) -> Self {
        Self::with_config(provider, registry, AgentConfig::default())
    }

    /// Create an agent with explicit budgets
    pub fn with_config(
        provider: Arc<dyn LlmProvider>,
        registry: Arc<ToolRegistry>,
        config: AgentConfig,
    ) -> Self {
        Self {
            provider,
            registry,
            memory: ConversationMemory::new(),
            config,
        }
    }

    /// The conversation history so far
    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    /// Forget the conversation history (the next turn re-seeds the system
    /// instruction)
    pub fn clear_memory(&mut self) {
        self.memory.clear();
    }

    /// Run one full user turn to completion
    ///
    /// # Arguments
    /// * `input` - The user's natural-language request
    ///
    /// # Returns
    /// The model's final response text, or a turn-fatal error. On a fatal
    /// error the conversation keeps the user turn but no fabricated
    /// assistant response.
    pub async fn run_turn(&mut self, input: &str) -> Result<String> {
        self.memory.push_user(SYSTEM_PROMPT, input);
        let mut trace = ReasoningTrace::new();
        let descriptors = self.registry.descriptors();
        let deadline = Instant::now() + self.config.turn_timeout;
        let mut cycles = 0usize;

        info!(request = input, "starting turn");

        loop {
            if Instant::now() >= deadline {
                warn!(cycles, "turn wall-clock budget expired");
                return Err(QueryMindError::TurnTimeout {
                    seconds: self.config.turn_timeout.as_secs(),
                });
            }
            if cycles >= self.config.max_cycles {
                warn!(cycles, "turn cycle budget exhausted");
                return Err(QueryMindError::BudgetExceeded { cycles });
            }

            // PREPARE_PROMPT
            let prompt = format_prompt(self.memory.turns(), &descriptors, &trace);

            // INVOKE_MODEL: the sole suspension point; failures are fatal
            // for the turn and are never retried here
            let response = self
                .provider
                .chat(&prompt, Some(&self.config.params))
                .await
                .map_err(|e| QueryMindError::ModelInvocation(e.to_string()))?;
            cycles += 1;
            debug!(cycle = cycles, output = %response.content, "model output");

            // PARSE_OUTPUT
            match parse_reasoning(&response.content) {
                Ok(ReasoningStep::Final { response }) => {
                    trace.push(ReasoningStep::Final {
                        response: response.clone(),
                    });
                    self.memory.push_assistant(response.clone());
                    info!(cycles, "turn complete");
                    return Ok(response);
                }
                Ok(ReasoningStep::Action {
                    thought,
                    action,
                    action_input,
                }) => {
                    info!(operation = %action, thought = %thought, "operation requested");
                    trace.push(ReasoningStep::Action {
                        thought,
                        action: action.clone(),
                        action_input: action_input.clone(),
                    });

                    // DISPATCH_OPERATION: every outcome becomes a step
                    let observation = dispatch(&action, &action_input, &self.registry).await;
                    if let ReasoningStep::Observation { observation: text } = &observation {
                        debug!(observation = %text, "observation recorded");
                    }
                    trace.push(observation);
                }
                Ok(observation @ ReasoningStep::Observation { .. }) => {
                    // No operation requested; feed the text back as-is
                    trace.push(observation);
                }
                Err(e) => {
                    // Recoverable: give the model a chance to self-correct
                    warn!(error = %e, "unparseable model output");
                    trace.push(ReasoningStep::Observation {
                        observation: format!("parse error: {}", e),
                    });
                }
            }
        }
    }
}
