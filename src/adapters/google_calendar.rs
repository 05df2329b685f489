//! Google Calendar v3 REST backend.

use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;
use chrono::{DateTime, FixedOffset, NaiveDate};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::service_account::AccessTokenProvider;
use crate::domain::{CalendarError, CalendarEvent, CalendarPort, CalendarResult};

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";
const UNTITLED: &str = "(no title)";

/// Bounded exponential backoff for transient gateway failures.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub initial_interval: Duration,
    pub max_elapsed: Duration,
}

pub struct GoogleCalendar {
    client: reqwest::Client,
    base_url: String,
    calendar_id: String,
    tokens: Arc<dyn AccessTokenProvider>,
    date_offset: FixedOffset,
    retry: Option<RetryPolicy>,
}

#[derive(Debug, Deserialize)]
struct EventList {
    #[serde(default)]
    items: Vec<GoogleEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleEvent {
    id: String,
    summary: Option<String>,
    html_link: Option<String>,
    start: EventTime,
    end: EventTime,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventTime {
    date_time: Option<String>,
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl GoogleCalendar {
    /// `date_offset` places all-day events, which carry no offset, on the
    /// timeline.
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        calendar_id: impl Into<String>,
        tokens: Arc<dyn AccessTokenProvider>,
        date_offset: FixedOffset,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            calendar_id: calendar_id.into(),
            tokens,
            date_offset,
            retry: None,
        }
    }

    pub fn with_retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = Some(policy);
        self
    }

    fn events_url(&self) -> String {
        format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(&self.calendar_id)
        )
    }

    async fn list_once(
        &self,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> CalendarResult<Vec<CalendarEvent>> {
        let token = self.tokens.access_token().await?;
        let time_min = start.to_rfc3339();
        let time_max = end.to_rfc3339();

        let response = self
            .client
            .get(self.events_url())
            .bearer_auth(token.expose_secret())
            .query(&[
                ("timeMin", time_min.as_str()),
                ("timeMax", time_max.as_str()),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
            ])
            .send()
            .await?;

        let list: EventList = check_status(response).await?.json().await?;
        list.items
            .into_iter()
            .map(|event| self.to_domain(event))
            .collect()
    }

    async fn insert_once(
        &self,
        summary: &str,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> CalendarResult<CalendarEvent> {
        let token = self.tokens.access_token().await?;
        let body = json!({
            "summary": summary,
            "start": { "dateTime": start.to_rfc3339() },
            "end": { "dateTime": end.to_rfc3339() },
        });

        let response = self
            .client
            .post(self.events_url())
            .bearer_auth(token.expose_secret())
            .json(&body)
            .send()
            .await?;

        let created: GoogleEvent = check_status(response).await?.json().await?;
        self.to_domain(created)
    }

    fn to_domain(&self, event: GoogleEvent) -> CalendarResult<CalendarEvent> {
        Ok(CalendarEvent {
            start: self.resolve_time(&event.start)?,
            end: self.resolve_time(&event.end)?,
            summary: event.summary.unwrap_or_else(|| UNTITLED.to_string()),
            html_link: event.html_link,
            id: event.id,
        })
    }

    fn resolve_time(&self, time: &EventTime) -> CalendarResult<DateTime<FixedOffset>> {
        if let Some(date_time) = &time.date_time {
            return DateTime::parse_from_rfc3339(date_time)
                .map_err(|e| CalendarError::Parse(format!("bad dateTime '{}': {}", date_time, e)));
        }

        if let Some(date) = &time.date {
            return NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .and_then(|naive| naive.and_local_timezone(self.date_offset).single())
                .ok_or_else(|| CalendarError::Parse(format!("bad date '{}'", date)));
        }

        Err(CalendarError::Parse("event time has neither dateTime nor date".to_string()))
    }

    async fn run<T, F, Fut>(&self, should_retry: fn(&CalendarError) -> bool, mut op: F) -> CalendarResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = CalendarResult<T>>,
    {
        let Some(policy) = self.retry else {
            return op().await;
        };

        let backoff = ExponentialBackoffBuilder::new()
            .with_initial_interval(policy.initial_interval)
            .with_max_elapsed_time(Some(policy.max_elapsed))
            .build();

        backoff::future::retry(backoff, || {
            let attempt = op();
            async move {
                attempt.await.map_err(|e| {
                    if should_retry(&e) {
                        tracing::warn!(error = %e, "Calendar call failed, retrying");
                        backoff::Error::transient(e)
                    } else {
                        backoff::Error::permanent(e)
                    }
                })
            }
        })
        .await
    }
}

async fn check_status(response: reqwest::Response) -> CalendarResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .map(|b| b.error.message)
        .unwrap_or(body);

    Err(match status.as_u16() {
        401 | 403 => CalendarError::Authentication(message),
        429 => CalendarError::RateLimited,
        code => CalendarError::Api {
            status: code,
            message,
        },
    })
}

#[async_trait]
impl CalendarPort for GoogleCalendar {
    fn backend(&self) -> &str {
        "google"
    }

    async fn list_events(
        &self,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> CalendarResult<Vec<CalendarEvent>> {
        if end <= start {
            return Err(CalendarError::InvalidRange { start, end });
        }

        let events = self
            .run(CalendarError::is_transient, || self.list_once(start, end))
            .await?;
        tracing::debug!(count = events.len(), time_min = %start, "Listed calendar events");
        Ok(events)
    }

    async fn create_event(
        &self,
        summary: &str,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> CalendarResult<CalendarEvent> {
        if end <= start {
            return Err(CalendarError::InvalidRange { start, end });
        }

        let event = self
            .run(CalendarError::is_retry_safe_for_insert, || {
                self.insert_once(summary, start, end)
            })
            .await?;
        tracing::info!(event_id = %event.id, "Created calendar event");
        Ok(event)
    }
}
