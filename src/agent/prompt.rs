//! Prompt formatter
//!
//! Pure function from (history, operation catalog, trace) to the exact turn
//! sequence the model sees: a system header carrying the operating
//! instructions, the catalog and a worked example, then the conversation
//! history, then the trace-so-far rendered as alternating assistant and
//! user turns so the model continues reasoning instead of restarting.
//!
//! No side effects, and deterministic for identical inputs: the catalog
//! arrives in the registry's stable order and argument maps serialize with
//! sorted keys.

use crate::agent::step::{ReasoningStep, ReasoningTrace};
use crate::llm::ChatTurn;
use crate::tools::ToolDescriptor;
use serde_json::Value;

/// Base operating instructions seeded into conversation memory
pub const SYSTEM_PROMPT: &str = "\
You are a specialized software engineer assisting users with database operations. \
Your primary goal is to accurately and efficiently fulfill user requests by \
interacting with the database.

Task execution flow:
1. First evaluate if the operation necessitates the table schema. If so, retrieve it immediately.
2. Otherwise, choose and execute the appropriate operation(s) to progress towards completing the request.
3. Continuously assess whether the user's task is fully completed. Do not perform anything aside from the main task.
4. If the task is done, return the final result and terminate. Otherwise, continue using operations.";

/// Render the full prompt for one reasoning cycle
pub fn format_prompt(
    history: &[ChatTurn],
    tools: &[ToolDescriptor],
    trace: &ReasoningTrace,
) -> Vec<ChatTurn> {
    let mut turns = Vec::with_capacity(1 + history.len() + trace.len());
    turns.push(ChatTurn::system(render_header(tools)));
    turns.extend_from_slice(history);
    turns.extend(render_trace(trace));
    turns
}

/// The reasoning-protocol header: catalog plus output-format contract
fn render_header(tools: &[ToolDescriptor]) -> String {
    let mut catalog = String::new();
    for tool in tools {
        catalog.push_str(&format!(
            "- {}: {}\n  parameters: {}\n",
            tool.name,
            tool.description,
            compact_json(&tool.parameters)
        ));
    }

    format!(
        "You solve the user's request step by step, using the operations below when needed.\n\
         \n\
         Available operations:\n\
         {catalog}\
         \n\
         At each step, reply in exactly one of these two forms.\n\
         \n\
         To call an operation:\n\
         Thought: <why this operation moves the task forward>\n\
         Action: <operation name, one of the names above>\n\
         Action Input: <arguments as a JSON object>\n\
         \n\
         To finish:\n\
         Thought: <why the task is complete>\n\
         Answer: <the final response to the user>\n\
         \n\
         Example:\n\
         Thought: I need to see which tables exist before I can answer.\n\
         Action: list_tables\n\
         Action Input: {{}}\n\
         \n\
         Never invent operation names, and never claim an operation ran without an observation for it."
    )
}

/// Render the trace-so-far as chat turns
fn render_trace(trace: &ReasoningTrace) -> Vec<ChatTurn> {
    trace
        .steps()
        .iter()
        .map(|step| match step {
            ReasoningStep::Action {
                thought,
                action,
                action_input,
            } => ChatTurn::assistant(format!(
                "Thought: {}\nAction: {}\nAction Input: {}",
                thought,
                action,
                compact_json(&Value::Object(action_input.clone()))
            )),
            ReasoningStep::Observation { observation } => {
                ChatTurn::user(format!("Observation: {}", observation))
            }
            ReasoningStep::Final { response } => {
                ChatTurn::assistant(format!("Answer: {}", response))
            }
        })
        .collect()
}

/// Single-line JSON rendering with stable key order
fn compact_json(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ChatRole;
    use serde_json::json;

    fn sample_tools() -> Vec<ToolDescriptor> {
        vec![
            ToolDescriptor {
                name: "get_data".to_string(),
                description: "runs a SELECT query".to_string(),
                parameters: json!({"type": "object", "properties": {"query": {"type": "string"}}}),
            },
            ToolDescriptor {
                name: "list_tables".to_string(),
                description: "lists user tables".to_string(),
                parameters: json!({"type": "object", "properties": {}}),
            },
        ]
    }

    fn sample_history() -> Vec<ChatTurn> {
        vec![
            ChatTurn::system(SYSTEM_PROMPT),
            ChatTurn::user("how many customers are there?"),
        ]
    }

    #[test]
    fn test_structure_order() {
        let mut trace = ReasoningTrace::new();
        trace.push(ReasoningStep::Action {
            thought: "count them".into(),
            action: "get_data".into(),
            action_input: [("query".to_string(), json!("SELECT COUNT(*) FROM customers"))]
                .into_iter()
                .collect(),
        });
        trace.push(ReasoningStep::Observation {
            observation: "42".into(),
        });

        let prompt = format_prompt(&sample_history(), &sample_tools(), &trace);

        // header, system seed, user request, action, observation
        assert_eq!(prompt.len(), 5);
        assert_eq!(prompt[0].role, ChatRole::System);
        assert!(prompt[0].content.contains("get_data"));
        assert!(prompt[0].content.contains("list_tables"));
        assert_eq!(prompt[1].role, ChatRole::System);
        assert_eq!(prompt[2].role, ChatRole::User);
        assert_eq!(prompt[3].role, ChatRole::Assistant);
        assert!(prompt[3].content.contains("Action: get_data"));
        assert_eq!(prompt[4].role, ChatRole::User);
        assert_eq!(prompt[4].content, "Observation: 42");
    }

    #[test]
    fn test_deterministic() {
        let mut trace = ReasoningTrace::new();
        trace.push(ReasoningStep::Action {
            thought: "t".into(),
            action: "get_data".into(),
            action_input: [
                ("b".to_string(), json!(2)),
                ("a".to_string(), json!(1)),
            ]
            .into_iter()
            .collect(),
        });

        let first = format_prompt(&sample_history(), &sample_tools(), &trace);
        let second = format_prompt(&sample_history(), &sample_tools(), &trace);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_trace_renders_nothing_extra() {
        let trace = ReasoningTrace::new();
        let prompt = format_prompt(&sample_history(), &sample_tools(), &trace);
        assert_eq!(prompt.len(), 3);
    }
}
