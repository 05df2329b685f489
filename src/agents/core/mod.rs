//! Reasoning loop for the booking agent
//!
//! - `planner`: decides the next step (LLM-backed ReAct planner)
//! - `output_parser`: reads `Action:` / `Final Answer:` replies
//! - `prompt`: the persona prompt and its rendering
//! - `react`: executor that alternates planner and tools

pub mod output_parser;
pub mod planner;
pub mod prompt;
mod react;

pub use planner::{ConversationalPlanner, LlmPlanner, PlannerDecision};
pub use prompt::DEFAULT_PROMPT_TEMPLATE;
pub use react::{ReActAgent, INVALID_FORMAT_OBSERVATION, ITERATION_LIMIT_OUTPUT};

use crate::agents::domain::Message;
use crate::domain::Tool;

/// Everything a planner sees for one turn
#[derive(Debug, Clone)]
pub struct PlanningContext {
    /// Prior turns of the session, oldest first
    pub history: Vec<Message>,
    /// The new user message
    pub input: String,
    /// Tools the planner may call
    pub tools: Vec<Tool>,
    /// Today's date in the user's offset, `YYYY-MM-DD`
    pub today: String,
    /// Current instant in the user's offset, as a format example
    pub example_instant: String,
}
