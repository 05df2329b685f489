//! Planners decide the next step of a turn

use async_trait::async_trait;
use std::sync::Arc;

use super::output_parser::{format_scratchpad, parse_output, ParsedOutput, OBSERVATION_STOP};
use super::prompt::render_prompt;
use super::PlanningContext;
use crate::agents::domain::{AgentStep, Message, ToolInvocation};
use crate::agents::error::AgentResult;
use crate::agents::llm::{CompletionRequest, LlmProvider};

/// Outcome of one planning call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannerDecision {
    /// Call a tool and come back with the observation
    Invoke(ToolInvocation),
    /// Answer the user
    Finish { output: String, log: String },
    /// The reply matched neither form
    Malformed { log: String, error: String },
}

/// Given the conversation so far and the steps of the current turn,
/// choose what to do next.
#[async_trait]
pub trait ConversationalPlanner: Send + Sync {
    async fn next_step(
        &self,
        ctx: &PlanningContext,
        steps: &[AgentStep],
    ) -> AgentResult<PlannerDecision>;
}

/// Prompts an LLM with the ReAct template and parses its reply
pub struct LlmPlanner {
    llm: Arc<dyn LlmProvider>,
    template: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl LlmPlanner {
    pub fn new(llm: Arc<dyn LlmProvider>, template: impl Into<String>) -> Self {
        Self {
            llm,
            template: template.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_sampling(mut self, temperature: Option<f32>, max_tokens: Option<u32>) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }
}

#[async_trait]
impl ConversationalPlanner for LlmPlanner {
    async fn next_step(
        &self,
        ctx: &PlanningContext,
        steps: &[AgentStep],
    ) -> AgentResult<PlannerDecision> {
        let prompt = render_prompt(&self.template, ctx, &format_scratchpad(steps))?;

        let request = CompletionRequest {
            messages: vec![Message::user(prompt)],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stop: Some(vec![OBSERVATION_STOP.to_string()]),
            ..Default::default()
        };

        let text = self.llm.complete(request).await?.text;

        Ok(match parse_output(&text) {
            Ok(ParsedOutput::Action { tool, input }) => {
                PlannerDecision::Invoke(ToolInvocation::new(tool, input, text))
            }
            Ok(ParsedOutput::Finish { output }) => PlannerDecision::Finish { output, log: text },
            Err(e) => PlannerDecision::Malformed {
                log: text,
                error: e.message,
            },
        })
    }
}
