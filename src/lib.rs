//! # TailorTalk - conversational booking assistant
//!
//! TailorTalk answers chat messages with a ReAct agent that can check a
//! calendar for free one-hour slots and book appointments in them.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use clap::Parser;
//! use tailortalk::cli::Cli;
//! use tailortalk::config::Settings;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::new_with_cli(&Cli::parse())?;
//!     let calendar = tailortalk::build_calendar(&settings.calendar)?;
//!     let _agent = tailortalk::build_agent(&settings, calendar)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Domain**: time slots, booking payloads, the calendar and tool ports
//! - **Adapters**: Google Calendar, in-memory calendar, calendar tools, HTTP handlers
//! - **Agents**: Gemini provider, ReAct planner and executor, session store
//! - **Config**: layered settings and validation

pub mod adapters;
pub mod agents;
pub mod cli;
pub mod config;
pub mod domain;

use crate::adapters::calendar_tools::CalendarToolHandler;
use crate::adapters::chat_handler::{self, ChatState};
use crate::adapters::google_calendar::{self, GoogleCalendar, RetryPolicy};
use crate::adapters::health_handler::HealthHandler;
use crate::adapters::in_memory_calendar::InMemoryCalendar;
use crate::adapters::service_account::{ServiceAccountKey, ServiceAccountTokenProvider};
use crate::adapters::ui_handler::UIHandler;
use crate::agents::core::{LlmPlanner, ReActAgent, DEFAULT_PROMPT_TEMPLATE};
use crate::agents::domain::AgentPort;
use crate::agents::handler::AgentHandler;
use crate::agents::llm::{create_provider, LlmProvider};
use crate::agents::memory::{ConversationStore, InMemoryStore};
use crate::config::{CalendarBackend, CalendarSettings, Settings};
use crate::domain::{parse_utc_offset, CalendarPort, ToolPort};
use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;

/// Builds the calendar gateway selected by `calendar.backend`.
pub fn build_calendar(settings: &CalendarSettings) -> anyhow::Result<Arc<dyn CalendarPort>> {
    match settings.backend {
        CalendarBackend::Memory => {
            tracing::info!("Using in-memory calendar");
            Ok(Arc::new(InMemoryCalendar::new()))
        }
        CalendarBackend::Google => {
            let date_offset = parse_utc_offset(&settings.default_utc_offset).with_context(|| {
                format!("invalid calendar.default_utc_offset '{}'", settings.default_utc_offset)
            })?;

            let client = reqwest::Client::builder()
                .timeout(Duration::from_secs(settings.timeout_seconds))
                .build()?;

            let key = ServiceAccountKey::from_file(&settings.credentials_file).with_context(|| {
                format!(
                    "failed to load service account credentials from {}",
                    settings.credentials_file.display()
                )
            })?;
            let tokens = ServiceAccountTokenProvider::new(key, settings.token_url.clone(), client.clone())?;

            let base_url = settings
                .base_url
                .clone()
                .unwrap_or_else(|| google_calendar::DEFAULT_BASE_URL.to_string());

            let mut calendar = GoogleCalendar::new(
                client,
                base_url,
                settings.calendar_id.clone(),
                Arc::new(tokens),
                date_offset,
            );
            if settings.retry.enabled {
                calendar = calendar.with_retry(RetryPolicy {
                    initial_interval: Duration::from_millis(settings.retry.initial_interval_ms),
                    max_elapsed: Duration::from_secs(settings.retry.max_elapsed_seconds),
                });
            }

            tracing::info!(calendar_id = %settings.calendar_id, "Using Google Calendar");
            Ok(Arc::new(calendar))
        }
    }
}

/// Builds the chat agent with the configured LLM provider.
pub fn build_agent(settings: &Settings, calendar: Arc<dyn CalendarPort>) -> anyhow::Result<Arc<AgentHandler>> {
    let llm = create_provider(&settings.agent.llm)?;
    build_agent_with_provider(settings, calendar, llm)
}

/// Builds the chat agent around an existing provider.
pub fn build_agent_with_provider(
    settings: &Settings,
    calendar: Arc<dyn CalendarPort>,
    llm: Arc<dyn LlmProvider>,
) -> anyhow::Result<Arc<AgentHandler>> {
    let agent_config = &settings.agent;
    let user_offset = parse_utc_offset(&agent_config.user_utc_offset)
        .with_context(|| format!("invalid agent.user_utc_offset '{}'", agent_config.user_utc_offset))?;

    let tools: Arc<dyn ToolPort> = Arc::new(CalendarToolHandler::new(calendar, user_offset));

    let template = agent_config
        .prompt_template
        .clone()
        .unwrap_or_else(|| DEFAULT_PROMPT_TEMPLATE.to_string());
    let planner = LlmPlanner::new(llm.clone(), template)
        .with_sampling(agent_config.llm.temperature, agent_config.llm.max_tokens);

    let agent = ReActAgent::new(Arc::new(planner), tools.clone(), agent_config.max_iterations)
        .with_parsing_error_handling(agent_config.handle_parsing_errors);

    let store: Arc<dyn ConversationStore> = Arc::new(InMemoryStore::new());

    tracing::info!(
        agent = %agent_config.name,
        provider = llm.name(),
        model = llm.model(),
        max_iterations = agent_config.max_iterations,
        "Agent initialized"
    );

    Ok(Arc::new(
        AgentHandler::new(agent, tools, store, user_offset)
            .with_timeout(Duration::from_secs(agent_config.timeout_seconds))
            .with_max_turns(settings.memory.max_turns),
    ))
}

/// Creates the Axum application router with all endpoints configured.
///
/// Health and UI routes are public; the chat routes sit behind the optional
/// rate limiter.
pub fn create_app(agent: Arc<dyn AgentPort>, health_handler: Arc<HealthHandler>, settings: &Settings) -> Router {
    let public_router = Router::new()
        .route("/health", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.health().await }
            }
        }))
        .route("/health/ready", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.ready().await }
            }
        }))
        .route("/health/live", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.live().await }
            }
        }))
        .route("/ui", get(UIHandler::index))
        .route("/ui/", get(UIHandler::index))
        .route("/ui/*path", get(UIHandler::serve));

    let mut chat_router = Router::new()
        .route("/", get(chat_handler::welcome))
        .route("/chat", post(chat_handler::chat))
        .with_state(ChatState { agent });

    if let Some(rate_limit) = &settings.rate_limit {
        if rate_limit.enabled {
            let limiter = crate::adapters::rate_limit::create_limiter(
                rate_limit.requests_per_second,
                rate_limit.burst_size,
            );

            chat_router = chat_router.layer(axum::middleware::from_fn_with_state(
                limiter,
                crate::adapters::rate_limit::rate_limit_middleware,
            ));
        }
    }

    public_router
        .merge(chat_router)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
}
