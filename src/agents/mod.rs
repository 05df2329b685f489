//! Conversational booking agent
//!
//! ## Architecture
//!
//! - `domain/` - Core types (Message, ConversationSession, AgentResponse)
//! - `llm/` - LLM provider implementations
//! - `core/` - Planner, output parser, prompt and ReAct executor
//! - `memory/` - Session store and idle eviction
//! - `handler` - `AgentPort` implementation used by the chat endpoint

pub mod config;
pub mod core;
pub mod domain;
pub mod error;
pub mod handler;
pub mod llm;
pub mod memory;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use config::*;
pub use domain::*;
pub use error::*;
pub use handler::AgentHandler;
