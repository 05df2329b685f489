//! ReAct executor (Reasoning + Acting)

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use super::planner::{ConversationalPlanner, PlannerDecision};
use super::PlanningContext;
use crate::agents::domain::{AgentResponse, AgentStep, ToolCallResult, ToolInvocation};
use crate::agents::error::{AgentError, AgentResult};
use crate::domain::{ToolOutcome, ToolPort};

pub const ITERATION_LIMIT_OUTPUT: &str = "Agent stopped due to iteration limit or time limit.";
pub const INVALID_FORMAT_OBSERVATION: &str = "Invalid or incomplete response";
const EXCEPTION_TOOL: &str = "_Exception";

/// Runs planner and tools in a loop until the planner answers
pub struct ReActAgent {
    planner: Arc<dyn ConversationalPlanner>,
    tools: Arc<dyn ToolPort>,
    max_iterations: u32,
    handle_parsing_errors: bool,
}

impl ReActAgent {
    /// Create a new ReAct agent
    pub fn new(
        planner: Arc<dyn ConversationalPlanner>,
        tools: Arc<dyn ToolPort>,
        max_iterations: u32,
    ) -> Self {
        Self {
            planner,
            tools,
            max_iterations,
            handle_parsing_errors: true,
        }
    }

    /// Fail the turn on malformed output instead of asking the model again
    pub fn with_parsing_error_handling(mut self, enabled: bool) -> Self {
        self.handle_parsing_errors = enabled;
        self
    }

    /// Run one turn to completion
    pub async fn run(&self, ctx: &PlanningContext) -> AgentResult<AgentResponse> {
        let start_time = Instant::now();
        let known_tools: HashSet<&str> = ctx.tools.iter().map(|t| t.name.as_str()).collect();

        let mut steps: Vec<AgentStep> = Vec::new();
        let mut tool_calls: Vec<ToolCallResult> = Vec::new();

        for iteration in 1..=self.max_iterations {
            let decision = self.planner.next_step(ctx, &steps).await?;

            let (invocation, observation) = match decision {
                PlannerDecision::Finish { output, .. } => {
                    tracing::debug!(iteration, "Agent produced final answer");
                    return Ok(AgentResponse {
                        output,
                        tool_calls,
                        iterations: iteration,
                        stopped_early: false,
                        execution_time_ms: start_time.elapsed().as_millis() as u64,
                    });
                }
                PlannerDecision::Malformed { log, error } => {
                    if !self.handle_parsing_errors {
                        return Err(AgentError::OutputParse(error));
                    }
                    tracing::warn!(iteration, %error, "Model output did not follow the format");
                    (
                        ToolInvocation::new(EXCEPTION_TOOL, INVALID_FORMAT_OBSERVATION, log),
                        INVALID_FORMAT_OBSERVATION.to_string(),
                    )
                }
                PlannerDecision::Invoke(invocation) if !known_tools.contains(invocation.tool.as_str()) => {
                    tracing::warn!(iteration, tool = %invocation.tool, "Model asked for unknown tool");
                    let observation = invalid_tool_observation(&invocation.tool, ctx);
                    (invocation, observation)
                }
                PlannerDecision::Invoke(invocation) => {
                    let observation = self.call_tool(&invocation, iteration, &mut tool_calls).await?;
                    (invocation, observation)
                }
            };

            steps.push(AgentStep {
                invocation,
                observation,
            });
        }

        tracing::warn!(max_iterations = self.max_iterations, "Agent hit iteration limit");
        Ok(AgentResponse {
            output: ITERATION_LIMIT_OUTPUT.to_string(),
            tool_calls,
            iterations: self.max_iterations,
            stopped_early: true,
            execution_time_ms: start_time.elapsed().as_millis() as u64,
        })
    }

    async fn call_tool(
        &self,
        invocation: &ToolInvocation,
        iteration: u32,
        tool_calls: &mut Vec<ToolCallResult>,
    ) -> AgentResult<String> {
        let tool_start = Instant::now();
        let outcome = self
            .tools
            .execute_tool(&invocation.tool, &invocation.input)
            .await
            .map_err(|e| AgentError::ToolExecution(e.to_string()))?;
        let tool_time = tool_start.elapsed().as_millis() as u64;

        tracing::info!(
            iteration,
            tool = %invocation.tool,
            success = outcome.is_success(),
            elapsed_ms = tool_time,
            "Tool call finished"
        );

        let observation = outcome.observation().to_string();
        tool_calls.push(ToolCallResult {
            tool_name: invocation.tool.clone(),
            input: invocation.input.clone(),
            output: observation.clone(),
            execution_time_ms: tool_time,
            success: matches!(outcome, ToolOutcome::Success(_)),
        });

        Ok(observation)
    }
}

fn invalid_tool_observation(requested: &str, ctx: &PlanningContext) -> String {
    let names: Vec<&str> = ctx.tools.iter().map(|t| t.name.as_str()).collect();
    format!(
        "{} is not a valid tool, try one of [{}].",
        requested,
        names.join(", ")
    )
}
