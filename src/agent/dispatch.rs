//! Operation dispatcher
//!
//! Given an Action step, look the operation up in the registry, invoke it,
//! and convert every outcome into an Observation step. Dispatch never
//! fails: unknown names, failed outcomes and handler errors all become
//! observations the model can react to on the next cycle. No retries, no
//! idempotency checks.

use crate::agent::step::ReasoningStep;
use crate::tools::ToolRegistry;
use serde_json::{Map, Value};
use tracing::{info, warn};

/// Dispatch one requested operation and produce the observation to feed back
pub async fn dispatch(
    action: &str,
    action_input: &Map<String, Value>,
    registry: &ToolRegistry,
) -> ReasoningStep {
    let tool = match registry.get(action) {
        Some(tool) => tool,
        None => {
            warn!(operation = action, "requested operation does not exist");
            return ReasoningStep::Observation {
                observation: format!(
                    "Operation '{}' does not exist. Available operations: {}",
                    action,
                    registry.names().join(", ")
                ),
            };
        }
    };

    match tool.call(action_input).await {
        Ok(outcome) => {
            info!(
                operation = action,
                success = outcome.success,
                "operation dispatched"
            );
            ReasoningStep::Observation {
                observation: outcome.render(),
            }
        }
        Err(e) => {
            warn!(operation = action, error = %e, "operation handler failed");
            ReasoningStep::Observation {
                observation: format!("Error calling operation '{}': {}", action, e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, QueryMindError};
    use crate::tools::{Tool, ToolOutcome};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Arc;

    struct FixedTool {
        outcome: ToolOutcome,
    }

    #[async_trait]
    impl Tool for FixedTool {
        fn name(&self) -> &str {
            "fixed"
        }
        fn description(&self) -> &str {
            "returns a fixed outcome"
        }
        fn parameters(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }
        async fn call(&self, _args: &Map<String, Value>) -> Result<ToolOutcome> {
            Ok(self.outcome.clone())
        }
    }

    struct FailingTool;

    #[async_trait]
    impl Tool for FailingTool {
        fn name(&self) -> &str {
            "failing"
        }
        fn description(&self) -> &str {
            "always errors"
        }
        fn parameters(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }
        async fn call(&self, _args: &Map<String, Value>) -> Result<ToolOutcome> {
            Err(QueryMindError::Operation("handler blew up".to_string()))
        }
    }

    #[tokio::test]
    async fn test_unknown_operation_becomes_observation() {
        let registry = ToolRegistry::new();
        let step = dispatch("no_such_op", &Map::new(), &registry).await;

        match step {
            ReasoningStep::Observation { observation } => {
                assert!(observation.contains("does not exist"));
            }
            other => panic!("expected observation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_success_outcome_preserved() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(FixedTool {
            outcome: ToolOutcome::ok(json!({"tables": ["customers"]}), "Found 1 table(s)"),
        }));

        let step = dispatch("fixed", &Map::new(), &registry).await;
        match step {
            ReasoningStep::Observation { observation } => {
                assert!(observation.starts_with("[ok]"));
                assert!(observation.contains("customers"));
            }
            other => panic!("expected observation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failed_outcome_preserved() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(FixedTool {
            outcome: ToolOutcome::fail("syntax error near SELEC"),
        }));

        let step = dispatch("fixed", &Map::new(), &registry).await;
        match step {
            ReasoningStep::Observation { observation } => {
                assert!(observation.starts_with("[failed]"));
            }
            other => panic!("expected observation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_handler_error_becomes_observation() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(FailingTool));

        let step = dispatch("failing", &Map::new(), &registry).await;
        match step {
            ReasoningStep::Observation { observation } => {
                assert!(observation.contains("handler blew up"));
            }
            other => panic!("expected observation, got {:?}", other),
        }
    }
}
