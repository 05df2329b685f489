//! HTTP boundary for the booking conversation
//!
//! `POST /chat` runs one agent turn for a session; `GET /` greets.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::agents::domain::AgentPort;
use crate::agents::error::AgentError;

pub const DEFAULT_SESSION_ID: &str = "default_session";

#[derive(Clone)]
pub struct ChatState {
    pub agent: Arc<dyn AgentPort>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default = "default_session_id")]
    pub session_id: String,
}

fn default_session_id() -> String {
    DEFAULT_SESSION_ID.to_string()
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

/// Failures surfaced to chat clients
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("message must not be empty")]
    EmptyMessage,

    #[error("request body must be a JSON object with a string 'message' field")]
    InvalidRequest(#[source] JsonRejection),

    #[error("rate limit exceeded")]
    RateLimited,

    #[error(transparent)]
    Agent(#[from] AgentError),
}

impl ChatError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ChatError::EmptyMessage => (StatusCode::BAD_REQUEST, "empty_message"),
            ChatError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            ChatError::RateLimited => (StatusCode::TOO_MANY_REQUESTS, "rate_limited"),
            ChatError::Agent(AgentError::Llm(_)) => (StatusCode::BAD_GATEWAY, "model_unavailable"),
            ChatError::Agent(AgentError::OutputParse(_)) => (StatusCode::BAD_GATEWAY, "model_output_invalid"),
            ChatError::Agent(AgentError::Timeout(_)) => (StatusCode::GATEWAY_TIMEOUT, "agent_timeout"),
            ChatError::Agent(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }

    /// Client-facing text; agent detail stays in the logs
    fn public_message(&self) -> String {
        match self {
            ChatError::EmptyMessage | ChatError::InvalidRequest(_) | ChatError::RateLimited => {
                self.to_string()
            }
            ChatError::Agent(AgentError::Llm(_)) => "The language model could not be reached.".to_string(),
            ChatError::Agent(AgentError::OutputParse(_)) => {
                "The language model returned an unreadable reply.".to_string()
            }
            ChatError::Agent(AgentError::Timeout(secs)) => {
                format!("The assistant did not answer within {secs}s.")
            }
            ChatError::Agent(_) => "An internal error occurred.".to_string(),
        }
    }
}

/// `{"error": {"code", "message"}}`
pub fn error_body(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(json!({
            "error": {
                "code": code,
                "message": message,
            }
        })),
    )
        .into_response()
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(code, error = %self, "Chat request failed");
        } else if let ChatError::InvalidRequest(rejection) = &self {
            tracing::debug!(code, error = %rejection.body_text(), "Rejected chat body");
        }
        error_body(status, code, &self.public_message())
    }
}

/// GET /
pub async fn welcome() -> impl IntoResponse {
    Json(json!({ "message": "Welcome to the TailorTalk Agent API!" }))
}

/// POST /chat
pub async fn chat(
    State(state): State<ChatState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ChatError> {
    let Json(request) = payload.map_err(ChatError::InvalidRequest)?;
    if request.message.trim().is_empty() {
        return Err(ChatError::EmptyMessage);
    }

    let session_id = if request.session_id.trim().is_empty() {
        DEFAULT_SESSION_ID
    } else {
        request.session_id.as_str()
    };

    tracing::debug!(session_id, "Chat request received");

    let response = state.agent.handle_message(session_id, &request.message).await?;

    Ok(Json(ChatResponse {
        response: response.output,
    }))
}
