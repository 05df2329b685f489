use async_trait::async_trait;
use chrono::FixedOffset;
use std::sync::Arc;
use thiserror::Error;

use crate::domain::{
    BookingRequest, CalendarError, CalendarPort, PayloadError, SlotParseError, TimeSlot, Tool,
    ToolOutcome, ToolPort,
};

pub const CHECK_AVAILABILITY: &str = "CheckCalendarAvailability";
pub const BOOK_APPOINTMENT: &str = "BookAppointment";

const CHECK_AVAILABILITY_DESCRIPTION: &str = "Use this to check if a specific time slot is available in the calendar. The input must be a single string representing the date and time in ISO 8601 format.";
const BOOK_APPOINTMENT_DESCRIPTION: &str = "Use this to book a new 1-hour appointment in the calendar. The input must be a JSON-like string containing a 'time' key with the time in ISO 8601 format, and a 'summary' key with the appointment title.";

#[derive(Debug, Error)]
pub enum ToolError {
    #[error(transparent)]
    Slot(#[from] SlotParseError),

    #[error(transparent)]
    Payload(#[from] PayloadError),

    #[error(transparent)]
    Calendar(#[from] CalendarError),
}

/// The availability and booking tools, backed by one calendar.
pub struct CalendarToolHandler {
    calendar: Arc<dyn CalendarPort>,
    naive_offset: FixedOffset,
}

impl CalendarToolHandler {
    /// Times given without an offset are read at `naive_offset`.
    pub fn new(calendar: Arc<dyn CalendarPort>, naive_offset: FixedOffset) -> Self {
        Self {
            calendar,
            naive_offset,
        }
    }

    async fn check_availability(&self, input: &str) -> Result<String, ToolError> {
        let slot = TimeSlot::parse(input, self.naive_offset)?;
        if slot.was_naive() {
            tracing::debug!(input, offset = %self.naive_offset, "Availability check without offset");
        }

        let events = self.calendar.list_events(slot.start(), slot.end()).await?;

        if events.is_empty() {
            return Ok(format!(
                "The 1-hour slot starting at {} is free.",
                slot.clock_label()
            ));
        }

        let conflicts: Vec<String> = events.iter().map(|e| format!("'{}'", e.summary)).collect();
        Ok(format!(
            "The requested time slot is busy. It conflicts with: {}.",
            conflicts.join(", ")
        ))
    }

    async fn book(&self, input: &str) -> Result<String, ToolError> {
        let request = BookingRequest::parse_lenient(input)?;
        let slot = TimeSlot::parse(&request.time, self.naive_offset)?;

        let event = self
            .calendar
            .create_event(&request.summary, slot.start(), slot.end())
            .await?;

        Ok(format!(
            "Success! The appointment '{}' has been booked for {}. Event link: {}",
            request.summary,
            slot.long_label(),
            event.html_link.as_deref().unwrap_or("(no link returned)")
        ))
    }
}

#[async_trait]
impl ToolPort for CalendarToolHandler {
    async fn execute_tool(&self, name: &str, input: &str) -> anyhow::Result<ToolOutcome> {
        let outcome = match name {
            CHECK_AVAILABILITY => match self.check_availability(input).await {
                Ok(text) => ToolOutcome::Success(text),
                Err(e) => ToolOutcome::Failure(format!("An error occurred: {}", e)),
            },
            BOOK_APPOINTMENT => match self.book(input).await {
                Ok(text) => ToolOutcome::Success(text),
                Err(e) => ToolOutcome::Failure(format!("An error occurred while booking: {}", e)),
            },
            _ => return Err(anyhow::anyhow!("Tool not found: {}", name)),
        };

        if let ToolOutcome::Failure(message) = &outcome {
            tracing::warn!(tool = name, %message, "Tool call failed");
        }

        Ok(outcome)
    }

    async fn list_tools(&self) -> anyhow::Result<Vec<Tool>> {
        Ok(vec![
            Tool {
                name: CHECK_AVAILABILITY.to_string(),
                description: CHECK_AVAILABILITY_DESCRIPTION.to_string(),
            },
            Tool {
                name: BOOK_APPOINTMENT.to_string(),
                description: BOOK_APPOINTMENT_DESCRIPTION.to_string(),
            },
        ])
    }
}
