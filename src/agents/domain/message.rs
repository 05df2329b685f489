//! Message and conversation types

use serde::{Deserialize, Serialize};

/// Message role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User message
    User,
    /// Assistant (LLM) message
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A message in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender
    pub role: Role,
    /// Message content (text)
    pub content: String,
}

impl Message {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

pub(crate) fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// A conversation session containing message history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSession {
    /// Opaque session identifier chosen by the client
    pub session_id: String,
    /// Turns in order, alternating user and assistant
    pub messages: Vec<Message>,
    /// Session creation timestamp (Unix epoch milliseconds)
    pub created_at: u64,
    /// Last activity timestamp (Unix epoch milliseconds)
    pub updated_at: u64,
}

impl ConversationSession {
    /// Create an empty session
    pub fn new(session_id: impl Into<String>) -> Self {
        let now = now_millis();
        Self {
            session_id: session_id.into(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append one completed exchange: the user turn, then the reply.
    pub fn record_exchange(&mut self, input: impl Into<String>, output: impl Into<String>) {
        self.messages.push(Message::user(input));
        self.messages.push(Message::assistant(output));
        self.touch();
    }

    /// Drop the oldest turns so at most `max_turns` remain.
    pub fn retain_last(&mut self, max_turns: usize) {
        if self.messages.len() > max_turns {
            let remove_count = self.messages.len() - max_turns;
            self.messages.drain(0..remove_count);
        }
    }

    /// Mark the session as active now
    pub fn touch(&mut self) {
        self.updated_at = now_millis();
    }

    /// Milliseconds since the last activity
    pub fn idle_millis(&self) -> u64 {
        now_millis().saturating_sub(self.updated_at)
    }

    /// Get the number of messages
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }
}
