//! Process-local calendar backend used for development and tests.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{CalendarError, CalendarEvent, CalendarPort, CalendarResult};

#[derive(Default)]
pub struct InMemoryCalendar {
    events: Arc<RwLock<Vec<CalendarEvent>>>,
}

impl InMemoryCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calendar pre-populated with `events`.
    pub fn with_events(events: Vec<CalendarEvent>) -> Self {
        Self {
            events: Arc::new(RwLock::new(events)),
        }
    }

    /// Snapshot of every stored event.
    pub async fn events(&self) -> Vec<CalendarEvent> {
        self.events.read().await.clone()
    }
}

fn check_range(start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> CalendarResult<()> {
    if end <= start {
        return Err(CalendarError::InvalidRange { start, end });
    }
    Ok(())
}

#[async_trait]
impl CalendarPort for InMemoryCalendar {
    fn backend(&self) -> &str {
        "memory"
    }

    async fn list_events(
        &self,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> CalendarResult<Vec<CalendarEvent>> {
        check_range(start, end)?;

        let events = self.events.read().await;
        let mut overlapping: Vec<CalendarEvent> = events
            .iter()
            .filter(|e| e.start < end && e.end > start)
            .cloned()
            .collect();
        overlapping.sort_by_key(|e| e.start);

        Ok(overlapping)
    }

    async fn create_event(
        &self,
        summary: &str,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> CalendarResult<CalendarEvent> {
        check_range(start, end)?;

        let id = Uuid::new_v4().to_string();
        let event = CalendarEvent {
            html_link: Some(format!("memory://events/{}", id)),
            id,
            summary: summary.to_string(),
            start,
            end,
        };

        self.events.write().await.push(event.clone());
        tracing::debug!(event_id = %event.id, "Stored in-memory event");

        Ok(event)
    }
}
