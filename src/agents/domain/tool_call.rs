//! Tool call types for the reasoning loop

use serde::{Deserialize, Serialize};

/// A tool call the model asked for, with the raw text that requested it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Name of the tool being called
    pub tool: String,
    /// Raw action input, passed to the tool verbatim
    pub input: String,
    /// Model output that produced this call, replayed in the scratchpad
    pub log: String,
}

impl ToolInvocation {
    /// Create a new tool invocation
    pub fn new(tool: impl Into<String>, input: impl Into<String>, log: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            input: input.into(),
            log: log.into(),
        }
    }
}

/// One completed iteration: what was asked and what came back
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentStep {
    pub invocation: ToolInvocation,
    pub observation: String,
}

/// Result of executing a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallResult {
    /// Name of the tool that was called
    pub tool_name: String,
    /// Input that was passed
    pub input: String,
    /// Observation returned to the model
    pub output: String,
    /// Execution time in milliseconds
    pub execution_time_ms: u64,
    /// Whether the tool reported success
    pub success: bool,
}
