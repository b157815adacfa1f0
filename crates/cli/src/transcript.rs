use chatwire_core::Turn;

/// Opening line shown before the user says anything.
pub const GREETING: &str = "Hello! How can I help you today?";

/// The visible conversation, owned by the REPL.
///
/// Append-only. Failed sends leave the user turn in place with no answer;
/// history sanitization deals with that on the next send.
#[derive(Debug, Clone)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    /// Start a transcript with the assistant greeting.
    pub fn new() -> Self {
        Self {
            turns: vec![Turn::assistant(GREETING)],
        }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Append a user turn and return the turns that preceded it.
    pub fn push_user(&mut self, content: impl Into<String>) -> &[Turn] {
        self.turns.push(Turn::user(content));
        let prior = self.turns.len() - 1;
        &self.turns[..prior]
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.turns.push(Turn::assistant(content));
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}
