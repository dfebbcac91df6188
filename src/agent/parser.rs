//! Output parser
//!
//! Turns the model's raw text into exactly one reasoning step. The textual
//! protocol is the ReAct form the system prompt asks for:
//!
//! ```text
//! Thought: I need to see the tables first.
//! Action: list_tables
//! Action Input: {}
//! ```
//!
//! or, to finish:
//!
//! ```text
//! Thought: I have everything I need.
//! Answer: There are two tables, customers and orders.
//! ```
//!
//! The `Answer:` marker is authoritative: when present the whole output is
//! a Final step even if an action block also appears. An `Action:` without
//! a parseable JSON-object `Action Input:` is a parse error, distinct from
//! text containing neither marker, which is classified as an inconclusive
//! Observation.

use crate::agent::step::ReasoningStep;
use crate::error::{Result, QueryMindError};
use serde_json::Value;

/// Final-answer marker
const ANSWER_MARKER: &str = "Answer:";
/// Operation-call marker
const ACTION_MARKER: &str = "Action:";
/// Argument-mapping marker
const ACTION_INPUT_MARKER: &str = "Action Input:";
/// Thought marker
const THOUGHT_MARKER: &str = "Thought:";

/// Parse raw model output into exactly one reasoning step
pub fn parse_reasoning(output: &str) -> Result<ReasoningStep> {
    let text = output.trim();

    if let Some(pos) = text.find(ANSWER_MARKER) {
        let response = text[pos + ANSWER_MARKER.len()..].trim();
        return Ok(ReasoningStep::Final {
            response: response.to_string(),
        });
    }

    if let Some(action_pos) = text.find(ACTION_MARKER) {
        let thought = extract_thought(text, action_pos);
        let after_action = &text[action_pos + ACTION_MARKER.len()..];

        let action = after_action
            .lines()
            .next()
            .unwrap_or("")
            .trim()
            .trim_matches('`')
            .to_string();
        if action.is_empty() {
            return Err(QueryMindError::Parse(
                "Action marker present but no operation name given".to_string(),
            ));
        }

        let input_pos = after_action.find(ACTION_INPUT_MARKER).ok_or_else(|| {
            QueryMindError::Parse(format!(
                "Action '{}' given without an Action Input block",
                action
            ))
        })?;
        let input_text = &after_action[input_pos + ACTION_INPUT_MARKER.len()..];
        let action_input = parse_action_input(input_text)?;

        return Ok(ReasoningStep::Action {
            thought,
            action,
            action_input,
        });
    }

    // Neither marker: inconclusive progress, not an error
    Ok(ReasoningStep::Observation {
        observation: text.to_string(),
    })
}

/// Text between the Thought marker and the action block, if any
fn extract_thought(text: &str, action_pos: usize) -> String {
    let before_action = &text[..action_pos];
    match before_action.find(THOUGHT_MARKER) {
        Some(pos) => before_action[pos + THOUGHT_MARKER.len()..].trim().to_string(),
        None => before_action.trim().to_string(),
    }
}

/// Parse the Action Input block into a JSON object
///
/// The block may be fenced (```json ... ```) and may be followed by trailing
/// prose; only the first complete JSON value is consumed.
fn parse_action_input(input_text: &str) -> Result<serde_json::Map<String, Value>> {
    let cleaned = input_text.replace("```json", "").replace("```", "");
    let start = cleaned.find('{').ok_or_else(|| {
        QueryMindError::Parse("Action Input block contains no JSON object".to_string())
    })?;

    let mut stream = serde_json::Deserializer::from_str(&cleaned[start..]).into_iter::<Value>();
    let value = match stream.next() {
        Some(Ok(value)) => value,
        Some(Err(e)) => {
            return Err(QueryMindError::Parse(format!(
                "malformed Action Input JSON: {}",
                e
            )))
        }
        None => {
            return Err(QueryMindError::Parse(
                "Action Input block contains no JSON object".to_string(),
            ))
        }
    };

    match value {
        Value::Object(map) => Ok(map),
        other => Err(QueryMindError::Parse(format!(
            "Action Input must be a JSON object, got: {}",
            other
        ))),
    }
}
