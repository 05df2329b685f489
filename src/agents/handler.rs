//! Agent handler implementing AgentPort

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{FixedOffset, SecondsFormat, Utc};

use crate::agents::core::{PlanningContext, ReActAgent};
use crate::agents::domain::{AgentPort, AgentResponse, ConversationSession};
use crate::agents::error::{AgentError, AgentResult};
use crate::agents::memory::ConversationStore;
use crate::domain::ToolPort;

/// Handles chat turns: session checkout, context, agent run, bookkeeping
pub struct AgentHandler {
    agent: ReActAgent,
    tools: Arc<dyn ToolPort>,
    store: Arc<dyn ConversationStore>,
    user_offset: FixedOffset,
    timeout: Duration,
    max_turns: Option<usize>,
}

impl AgentHandler {
    /// Create a new agent handler
    pub fn new(
        agent: ReActAgent,
        tools: Arc<dyn ToolPort>,
        store: Arc<dyn ConversationStore>,
        user_offset: FixedOffset,
    ) -> Self {
        Self {
            agent,
            tools,
            store,
            user_offset,
            timeout: Duration::from_secs(120),
            max_turns: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Keep at most `max_turns` turns per session
    pub fn with_max_turns(mut self, max_turns: Option<usize>) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn store(&self) -> Arc<dyn ConversationStore> {
        self.store.clone()
    }

    async fn planning_context(&self, session: &ConversationSession, text: &str) -> AgentResult<PlanningContext> {
        let tools = self
            .tools
            .list_tools()
            .await
            .map_err(|e| AgentError::ToolExecution(e.to_string()))?;

        let now = Utc::now().with_timezone(&self.user_offset);

        Ok(PlanningContext {
            history: session.messages.clone(),
            input: text.to_string(),
            tools,
            today: now.format("%Y-%m-%d").to_string(),
            example_instant: now.to_rfc3339_opts(SecondsFormat::Secs, false),
        })
    }
}

#[async_trait]
impl AgentPort for AgentHandler {
    async fn handle_message(&self, session_id: &str, text: &str) -> AgentResult<AgentResponse> {
        // Held until the exchange is recorded, so one session's turns never interleave.
        let mut session = self.store.checkout(session_id).await?;
        let ctx = self.planning_context(&session, text).await?;

        let response = tokio::time::timeout(self.timeout, self.agent.run(&ctx))
            .await
            .map_err(|_| AgentError::Timeout(self.timeout.as_secs()))??;

        session.record_exchange(text, response.output.clone());
        if let Some(max_turns) = self.max_turns {
            session.retain_last(max_turns);
        }

        tracing::info!(
            session_id,
            iterations = response.iterations,
            tool_calls = response.tool_calls.len(),
            elapsed_ms = response.execution_time_ms,
            "Chat turn completed"
        );

        Ok(response)
    }

    async fn get_session(&self, session_id: &str) -> AgentResult<Option<ConversationSession>> {
        self.store.load(session_id).await
    }
}
