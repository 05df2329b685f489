use thiserror::Error;

use crate::agents::config::{AgentConfig, MemoryConfig};
use crate::agents::core::{prompt, PlanningContext};
use crate::config::{CalendarBackend, CalendarSettings, RateLimitConfig, ServerSettings, Settings};
use crate::domain::{parse_utc_offset, Tool};

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

impl ValidationError {
    fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(settings: &Settings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = Self::validate_server(&settings.server) {
            errors.extend(e);
        }

        if let Err(e) = Self::validate_calendar(&settings.calendar) {
            errors.extend(e);
        }

        if let Err(e) = Self::validate_agent(&settings.agent) {
            errors.extend(e);
        }

        if let Err(e) = Self::validate_memory(&settings.memory) {
            errors.extend(e);
        }

        if let Some(rate_limit) = &settings.rate_limit {
            if let Err(e) = Self::validate_rate_limit(rate_limit) {
                errors.extend(e);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_server(server: &ServerSettings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if server.host.trim().is_empty() {
            errors.push(ValidationError::MissingField("server.host".to_string()));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_calendar(calendar: &CalendarSettings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if calendar.backend == CalendarBackend::Google && calendar.calendar_id.trim().is_empty() {
            errors.push(ValidationError::MissingField(
                "calendar.calendar_id (or CALENDAR_ID)".to_string(),
            ));
        }

        if parse_utc_offset(&calendar.default_utc_offset).is_none() {
            errors.push(ValidationError::invalid(
                "calendar.default_utc_offset",
                format!("'{}' is not a UTC offset like +05:30", calendar.default_utc_offset),
            ));
        }

        if calendar.timeout_seconds == 0 {
            errors.push(ValidationError::invalid(
                "calendar.timeout_seconds",
                "Timeout must be greater than 0",
            ));
        }

        if calendar.retry.enabled && calendar.retry.max_elapsed_seconds == 0 {
            errors.push(ValidationError::invalid(
                "calendar.retry.max_elapsed_seconds",
                "Retry budget must be greater than 0 when retries are enabled",
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_agent(agent: &AgentConfig) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if agent.max_iterations == 0 {
            errors.push(ValidationError::invalid(
                "agent.max_iterations",
                "At least one iteration is required",
            ));
        }

        if agent.timeout_seconds == 0 {
            errors.push(ValidationError::invalid(
                "agent.timeout_seconds",
                "Timeout must be greater than 0",
            ));
        }

        if parse_utc_offset(&agent.user_utc_offset).is_none() {
            errors.push(ValidationError::invalid(
                "agent.user_utc_offset",
                format!("'{}' is not a UTC offset like +05:30", agent.user_utc_offset),
            ));
        }

        if agent.llm.model.trim().is_empty() {
            errors.push(ValidationError::MissingField("agent.llm.model".to_string()));
        }

        if let Some(temperature) = agent.llm.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                errors.push(ValidationError::invalid(
                    "agent.llm.temperature",
                    "Temperature must be between 0.0 and 2.0",
                ));
            }
        }

        if let Some(template) = &agent.prompt_template {
            if let Err(e) = Self::render_sample(template) {
                errors.push(ValidationError::invalid("agent.prompt_template", e));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Render a custom template once so syntax errors surface at startup
    fn render_sample(template: &str) -> Result<(), String> {
        let ctx = PlanningContext {
            history: Vec::new(),
            input: "Is 3pm tomorrow free?".to_string(),
            tools: vec![Tool {
                name: "CheckCalendarAvailability".to_string(),
                description: "Checks a slot".to_string(),
            }],
            today: "2025-01-01".to_string(),
            example_instant: "2025-01-01T12:00:00+05:30".to_string(),
        };

        prompt::render_prompt(template, &ctx, "")
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    fn validate_memory(memory: &MemoryConfig) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if memory.session_ttl_seconds == Some(0) {
            errors.push(ValidationError::invalid(
                "memory.session_ttl_seconds",
                "TTL must be greater than 0; omit it to keep sessions forever",
            ));
        }

        if memory.max_turns == Some(0) {
            errors.push(ValidationError::invalid(
                "memory.max_turns",
                "At least one turn must be kept; omit it for unbounded history",
            ));
        }

        if memory.sweep_interval_seconds == 0 {
            errors.push(ValidationError::invalid(
                "memory.sweep_interval_seconds",
                "Sweep interval must be greater than 0",
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_rate_limit(rate_limit: &RateLimitConfig) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if rate_limit.enabled {
            if rate_limit.requests_per_second == 0 {
                errors.push(ValidationError::invalid(
                    "rate_limit.requests_per_second",
                    "Must be greater than 0",
                ));
            }
            if rate_limit.burst_size == 0 {
                errors.push(ValidationError::invalid(
                    "rate_limit.burst_size",
                    "Must be greater than 0",
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
