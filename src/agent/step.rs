//! Reasoning steps and the per-turn trace
//!
//! The step taxonomy is a sum type: a model output parses to exactly one
//! of these, and a step is either terminal (Final) or requires exactly one
//! follow-up cycle.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One step of the reasoning process for the current turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReasoningStep {
    /// The model requested an operation call
    Action {
        /// The model's reasoning leading to the call
        thought: String,
        /// Operation name to invoke
        action: String,
        /// Argument mapping for the operation
        action_input: Map<String, Value>,
    },
    /// A result or note fed back into the next cycle
    Observation {
        /// Observation text
        observation: String,
    },
    /// Terminal: the model judged the task complete
    Final {
        /// The response to hand back to the caller
        response: String,
    },
}

impl ReasoningStep {
    /// True if this step ends the turn
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReasoningStep::Final { .. })
    }
}

/// Ordered reasoning steps for the current user turn only
///
/// Created empty at turn start and discarded once a Final step is reached;
/// only the final response is folded back into conversation memory.
#[derive(Debug, Clone, Default)]
pub struct ReasoningTrace {
    steps: Vec<ReasoningStep>,
}

impl ReasoningTrace {
    /// Create an empty trace
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one step
    pub fn push(&mut self, step: ReasoningStep) {
        self.steps.push(step);
    }

    /// The accumulated steps, oldest first
    pub fn steps(&self) -> &[ReasoningStep] {
        &self.steps
    }

    /// Number of accumulated steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// True if no step has been recorded this turn
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
