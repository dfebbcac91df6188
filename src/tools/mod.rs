//! Tool registry module
//!
//! This module defines the operation registry the agent loop draws from:
//! a fixed catalog of named, invocable operations, each carrying a
//! natural-language description and a parameter schema the model uses to
//! choose among them. The registry is built once at startup and treated as
//! immutable for the process lifetime.

pub mod database;

pub use database::register_database_tools;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Uniform result envelope every operation handler returns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutcome {
    /// Whether the operation succeeded
    pub success: bool,
    /// Structured result payload
    pub payload: Value,
    /// Human/model-readable summary
    pub message: String,
}

impl ToolOutcome {
    /// A successful outcome
    pub fn ok(payload: Value, message: impl Into<String>) -> Self {
        Self {
            success: true,
            payload,
            message: message.into(),
        }
    }

    /// A failed outcome (the operation ran but did not succeed)
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            payload: Value::Null,
            message: message.into(),
        }
    }

    /// Render the outcome as observation text for the reasoning trace
    pub fn render(&self) -> String {
        let status = if self.success { "ok" } else { "failed" };
        if self.payload.is_null() {
            format!("[{}] {}", status, self.message)
        } else {
            format!("[{}] {}\n{}", status, self.message, self.payload)
        }
    }
}

/// Descriptor of a registered operation, as shown to the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Unique operation name
    pub name: String,
    /// Natural-language description
    pub description: String,
    /// Parameter schema (JSON-schema-shaped object)
    pub parameters: Value,
}

/// Trait for invocable operations
///
/// Handlers are stateless single-shot request/response functions: no
/// retries, no idempotency checks, every visible side effect described
/// truthfully in the returned outcome.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique operation name (the key the model calls it by)
    fn name(&self) -> &str;

    /// Natural-language description shown in the operation catalog
    fn description(&self) -> &str;

    /// Parameter schema shown in the operation catalog
    fn parameters(&self) -> Value;

    /// Invoke the operation with the argument mapping from the model
    async fn call(&self, args: &serde_json::Map<String, Value>) -> Result<ToolOutcome>;

    /// Build this tool's catalog descriptor
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }
}

/// Fixed catalog of operations available to the agent
///
/// Backed by a BTreeMap so catalog iteration order is stable, which keeps
/// prompt formatting deterministic.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool under its own name
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Look up a tool by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// Registered operation names, in stable order
    pub fn names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    /// Catalog descriptors for prompt formatting, in stable order
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools.values().map(|t| t.descriptor()).collect()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// True if no tools are registered
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "echoes its input back"
        }

        fn parameters(&self) -> Value {
            json!({"type": "object", "properties": {"text": {"type": "string"}}})
        }

        async fn call(&self, args: &serde_json::Map<String, Value>) -> Result<ToolOutcome> {
            let text = args.get("text").and_then(|v| v.as_str()).unwrap_or("");
            Ok(ToolOutcome::ok(json!({ "echo": text }), "echoed"))
        }
    }

    #[test]
    fn test_registry_lookup() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool));

        assert_eq!(registry.len(), 1);
        assert!(registry.get("echo").is_some());
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_descriptor_order_is_stable() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool));

        let descriptors = registry.descriptors();
        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].name, "echo");
        assert_eq!(registry.names(), vec!["echo".to_string()]);
    }

    #[test]
    fn test_outcome_render() {
        let ok = ToolOutcome::ok(json!({"rows": 3}), "3 rows");
        assert!(ok.render().starts_with("[ok] 3 rows"));

        let fail = ToolOutcome::fail("syntax error");
        assert_eq!(fail.render(), "[failed] syntax error");
    }

    #[tokio::test]
    async fn test_tool_call() {
        let tool = EchoTool;
        let mut args = serde_json::Map::new();
        args.insert("text".to_string(), json!("hi"));
        let outcome = tool.call(&args).await.unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.payload["echo"], "hi");
    }
}
