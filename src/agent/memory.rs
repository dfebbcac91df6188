//! Conversation memory
//!
//! An append-only, ordered log of chat turns owned by the control loop.
//! Seeded with the system instruction when the first user turn arrives;
//! never reordered or pruned (eviction is out of scope).

use crate::llm::{ChatRole, ChatTurn};

/// Append-only conversation log for one conversation
#[derive(Debug, Clone, Default)]
pub struct ConversationMemory {
    turns: Vec<ChatTurn>,
}

impl ConversationMemory {
    /// Create an empty memory
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new user request, seeding the system instruction first if
    /// this is the very first turn of the conversation
    pub fn push_user(&mut self, system_prompt: &str, input: impl Into<String>) {
        if self.turns.is_empty() {
            self.turns.push(ChatTurn::system(system_prompt));
        }
        self.turns.push(ChatTurn::user(input));
    }

    /// Record the final assistant response for the current turn
    pub fn push_assistant(&mut self, response: impl Into<String>) {
        self.turns.push(ChatTurn::assistant(response));
    }

    /// The full ordered history
    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    /// Number of recorded turns
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// True if nothing has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Drop everything, including the system seed. The next user turn
    /// re-seeds the system instruction.
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Count of assistant turns (used to verify one response per turn)
    pub fn assistant_turns(&self) -> usize {
        self.turns
            .iter()
            .filter(|t| t.role == ChatRole::Assistant)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_seed_on_first_user_turn() {
        let mut memory = ConversationMemory::new();
        memory.push_user("be helpful", "list the tables");

        assert_eq!(memory.len(), 2);
        assert_eq!(memory.turns()[0].role, ChatRole::System);
        assert_eq!(memory.turns()[0].content, "be helpful");
        assert_eq!(memory.turns()[1].role, ChatRole::User);
    }

    #[test]
    fn test_system_seeded_only_once() {
        let mut memory = ConversationMemory::new();
        memory.push_user("be helpful", "first");
        memory.push_assistant("done");
        memory.push_user("be helpful", "second");

        assert_eq!(memory.len(), 4);
        let system_count = memory
            .turns()
            .iter()
            .filter(|t| t.role == ChatRole::System)
            .count();
        assert_eq!(system_count, 1);
    }

    #[test]
    fn test_clear_reseeds() {
        let mut memory = ConversationMemory::new();
        memory.push_user("be helpful", "first");
        memory.clear();
        assert!(memory.is_empty());

        memory.push_user("be helpful", "again");
        assert_eq!(memory.turns()[0].role, ChatRole::System);
    }
}
