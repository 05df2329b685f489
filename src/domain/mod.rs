use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod booking;
pub mod slot;

pub use booking::{BookingRequest, PayloadError};
pub use slot::{parse_utc_offset, SlotParseError, TimeSlot};

/// A calendar entry as seen by the tools.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CalendarEvent {
    pub id: String,
    pub summary: String,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_link: Option<String>,
}

/// Failures of the calendar gateway.
#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("calendar authentication failed: {0}")]
    Authentication(String),

    #[error("invalid service account credentials: {0}")]
    Credentials(String),

    /// The request never reached the calendar service.
    #[error("could not connect to calendar service: {0}")]
    Connect(String),

    #[error("network error talking to calendar service: {0}")]
    Network(String),

    #[error("calendar request timed out")]
    Timeout,

    #[error("calendar rate limit exceeded")]
    RateLimited,

    #[error("calendar API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("invalid time range: end {end} is not after start {start}")]
    InvalidRange {
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    },

    #[error("could not parse calendar response: {0}")]
    Parse(String),
}

impl CalendarError {
    /// Errors worth retrying for idempotent reads.
    pub fn is_transient(&self) -> bool {
        match self {
            CalendarError::Connect(_)
            | CalendarError::Network(_)
            | CalendarError::Timeout
            | CalendarError::RateLimited => true,
            CalendarError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Errors after which an insert certainly did not happen.
    pub fn is_retry_safe_for_insert(&self) -> bool {
        matches!(self, CalendarError::Connect(_) | CalendarError::RateLimited)
    }
}

impl From<reqwest::Error> for CalendarError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CalendarError::Timeout
        } else if err.is_connect() {
            CalendarError::Connect(err.to_string())
        } else if err.is_decode() {
            CalendarError::Parse(err.to_string())
        } else {
            CalendarError::Network(err.to_string())
        }
    }
}

pub type CalendarResult<T> = Result<T, CalendarError>;

/// Read and write access to a single calendar.
#[async_trait]
pub trait CalendarPort: Send + Sync {
    /// Short backend name for logs and readiness checks.
    fn backend(&self) -> &str;

    /// Events overlapping `[start, end)`, ordered by start time.
    async fn list_events(
        &self,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> CalendarResult<Vec<CalendarEvent>>;

    async fn create_event(
        &self,
        summary: &str,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> CalendarResult<CalendarEvent>;
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Tool {
    pub name: String,
    pub description: String,
}

/// What a tool hands back to the agent. Both variants are shown to the
/// model as the observation text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutcome {
    Success(String),
    Failure(String),
}

impl ToolOutcome {
    pub fn observation(&self) -> &str {
        match self {
            ToolOutcome::Success(text) | ToolOutcome::Failure(text) => text,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ToolOutcome::Success(_))
    }
}

#[async_trait]
pub trait ToolPort: Send + Sync {
    /// Run a tool on the raw action input. `Err` only for an unknown tool
    /// or an internal fault; expected failures come back as
    /// [`ToolOutcome::Failure`].
    async fn execute_tool(&self, name: &str, input: &str) -> anyhow::Result<ToolOutcome>;
    async fn list_tools(&self) -> anyhow::Result<Vec<Tool>>;
}
