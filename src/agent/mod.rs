//! Reasoning agent: conversation memory, the step model, output parsing
//! wiring and the turn control loop

pub mod dispatch;
pub mod memory;
pub mod parser;
pub mod prompt;
pub mod runner;
pub mod step;

pub use memory::ConversationMemory;
pub use runner::{Agent, AgentConfig};
pub use step::{ReasoningStep, ReasoningTrace};
