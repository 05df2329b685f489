//! Domain types for the booking agent

mod message;
mod response;
mod tool_call;

pub use message::*;
pub use response::*;
pub use tool_call::*;

use async_trait::async_trait;

use super::error::AgentResult;

/// Port for handling one chat turn
#[async_trait]
pub trait AgentPort: Send + Sync {
    /// Answer `text` in the context of `session_id`, recording the exchange
    /// on success.
    async fn handle_message(&self, session_id: &str, text: &str) -> AgentResult<AgentResponse>;

    /// Snapshot of a session's turns, if it exists
    async fn get_session(&self, session_id: &str) -> AgentResult<Option<ConversationSession>>;
}
