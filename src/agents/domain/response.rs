//! Agent response types

use serde::{Deserialize, Serialize};

use super::ToolCallResult;

/// Final response from one agent turn
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentResponse {
    /// Text returned to the user
    pub output: String,
    /// Tool calls made during execution (if any)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallResult>,
    /// Number of reasoning iterations used
    #[serde(default)]
    pub iterations: u32,
    /// The iteration limit ended the turn
    #[serde(default)]
    pub stopped_early: bool,
    /// Execution time in milliseconds
    pub execution_time_ms: u64,
}
