//! Test doubles for the reasoning loop

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::agents::core::{ConversationalPlanner, PlannerDecision, PlanningContext};
use crate::agents::domain::{AgentStep, ToolInvocation};
use crate::agents::error::{AgentResult, LlmError};

/// Replays canned decisions and records what it was shown.
#[derive(Default)]
pub struct ScriptedPlanner {
    decisions: Mutex<Vec<PlannerDecision>>,
    pub seen: Mutex<Vec<Vec<AgentStep>>>,
    pub contexts: Mutex<Vec<PlanningContext>>,
    fail: bool,
    delay: Option<Duration>,
}

impl ScriptedPlanner {
    pub fn new(mut decisions: Vec<PlannerDecision>) -> Arc<Self> {
        decisions.reverse();
        Arc::new(Self {
            decisions: Mutex::new(decisions),
            ..Default::default()
        })
    }

    /// Always answers `output`
    pub fn answering(output: &str) -> Arc<Self> {
        Arc::new(Self {
            decisions: Mutex::new((0..64).map(|_| finish(output)).collect()),
            ..Default::default()
        })
    }

    /// Every call fails like an unreachable model
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Default::default()
        })
    }

    /// Answers `output` after sleeping
    pub fn slow(output: &str, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            decisions: Mutex::new((0..64).map(|_| finish(output)).collect()),
            delay: Some(delay),
            ..Default::default()
        })
    }
}

#[async_trait]
impl ConversationalPlanner for ScriptedPlanner {
    async fn next_step(&self, ctx: &PlanningContext, steps: &[AgentStep]) -> AgentResult<PlannerDecision> {
        self.seen.lock().unwrap().push(steps.to_vec());
        self.contexts.lock().unwrap().push(ctx.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail {
            return Err(LlmError::Api {
                status: 503,
                message: "model overloaded".into(),
            }
            .into());
        }

        Ok(self.decisions.lock().unwrap().pop().unwrap_or(PlannerDecision::Malformed {
            log: "...".into(),
            error: "script exhausted".into(),
        }))
    }
}

pub fn invoke(tool: &str, input: &str) -> PlannerDecision {
    PlannerDecision::Invoke(ToolInvocation::new(
        tool,
        input,
        format!("Thought: Do I need to use a tool? Yes\nAction: {tool}\nAction Input: {input}"),
    ))
}

pub fn finish(output: &str) -> PlannerDecision {
    PlannerDecision::Finish {
        output: output.into(),
        log: format!("Thought: Do I need to use a tool? No\nFinal Answer: {output}"),
    }
}
