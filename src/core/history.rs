//! Conversation history - prior turns available to subsequent prompts
//!
//! Process-lifetime state, reset only on restart (or the panel's Clear
//! action). Append-only: entries reflect chronological turn order and
//! are never mutated after creation.

use crate::llm::Message;
use chrono::{DateTime, Utc};

/// One recorded turn
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub message: Message,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    fn new(message: Message) -> Self {
        Self {
            message,
            timestamp: Utc::now(),
        }
    }
}

/// Ordered sequence of conversation turns
///
/// Owned by whoever drives the orchestrator and injected into it; there
/// is no module-level singleton, so tests control ordering directly.
#[derive(Debug, Default)]
pub struct ConversationHistory {
    entries: Vec<HistoryEntry>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of the turns in LLM message form, oldest first
    pub fn to_messages(&self) -> Vec<Message> {
        self.entries.iter().map(|e| e.message.clone()).collect()
    }

    /// Record a completed exchange: the user turn, then the assistant turn
    pub fn push_exchange(&mut self, prompt: impl Into<String>, response: impl Into<String>) {
        self.entries.push(HistoryEntry::new(Message::user(prompt)));
        self.entries
            .push(HistoryEntry::new(Message::assistant(response)));
    }

    /// Forget everything (panel Clear action)
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
