use super::common;

use chrono::{DateTime, Duration as ChronoDuration, FixedOffset};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use common::fake_google::FakeGoogle;
use common::test_server::{fixture, CALENDAR_ID};
use tailortalk::adapters::google_calendar::{GoogleCalendar, RetryPolicy};
use tailortalk::adapters::service_account::{ServiceAccountKey, ServiceAccountTokenProvider, StaticToken};
use tailortalk::domain::{CalendarError, CalendarPort};

fn ist() -> FixedOffset {
    FixedOffset::east_opt(19800).unwrap()
}

fn at(ts: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(ts).unwrap()
}

fn calendar(google: &FakeGoogle) -> GoogleCalendar {
    let client = reqwest::Client::new();
    let key = ServiceAccountKey::from_file(fixture("service_account.json")).unwrap();
    let tokens = ServiceAccountTokenProvider::new(key, Some(google.token_url()), client.clone()).unwrap();
    GoogleCalendar::new(client, google.base_url.clone(), CALENDAR_ID, Arc::new(tokens), ist())
}

#[tokio::test]
async fn test_list_returns_overlapping_events_in_order() {
    let google = FakeGoogle::start().await;
    google.state.add_event("Late", "2025-07-01T15:45:00+05:30", "2025-07-01T16:15:00+05:30");
    google.state.add_event("Early", "2025-07-01T14:30:00+05:30", "2025-07-01T15:15:00+05:30");
    google.state.add_event("Elsewhere", "2025-07-01T18:00:00+05:30", "2025-07-01T19:00:00+05:30");

    let start = at("2025-07-01T15:00:00+05:30");
    let events = calendar(&google)
        .list_events(start, start + ChronoDuration::hours(1))
        .await
        .unwrap();

    let summaries: Vec<&str> = events.iter().map(|e| e.summary.as_str()).collect();
    assert_eq!(summaries, vec!["Early", "Late"]);
    assert_eq!(events[0].end, at("2025-07-01T15:15:00+05:30"));
}

#[tokio::test]
async fn test_create_event_returns_link_and_reuses_token() {
    let google = FakeGoogle::start().await;
    let calendar = calendar(&google);
    let start = at("2025-07-01T15:00:00+05:30");

    let event = calendar
        .create_event("Fitting", start, start + ChronoDuration::hours(1))
        .await
        .unwrap();
    assert_eq!(event.summary, "Fitting");
    assert_eq!(event.start, start);
    assert_eq!(event.html_link.as_deref(), Some("https://calendar.google.com/event?eid=evt-1"));

    let listed = calendar
        .list_events(start, start + ChronoDuration::hours(1))
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);

    assert_eq!(google.state.token_requests.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_rejected_token_is_authentication_error() {
    let google = FakeGoogle::start().await;
    let calendar = GoogleCalendar::new(
        reqwest::Client::new(),
        google.base_url.clone(),
        CALENDAR_ID,
        Arc::new(StaticToken::new("expired")),
        ist(),
    );

    let start = at("2025-07-01T15:00:00+05:30");
    let err = calendar
        .list_events(start, start + ChronoDuration::hours(1))
        .await
        .unwrap_err();

    assert!(matches!(err, CalendarError::Authentication(ref m) if m == "Invalid Credentials"));
}

#[tokio::test]
async fn test_server_errors_fail_without_retry() {
    let google = FakeGoogle::start().await;
    google.state.failing_lists.store(1, Ordering::SeqCst);

    let start = at("2025-07-01T15:00:00+05:30");
    let err = calendar(&google)
        .list_events(start, start + ChronoDuration::hours(1))
        .await
        .unwrap_err();

    assert!(matches!(err, CalendarError::Api { status: 503, .. }));
}

#[tokio::test]
async fn test_retry_policy_recovers_from_transient_errors() {
    let google = FakeGoogle::start().await;
    google.state.failing_lists.store(2, Ordering::SeqCst);
    google.state.add_event("Standup", "2025-07-01T15:00:00+05:30", "2025-07-01T15:30:00+05:30");

    let calendar = calendar(&google).with_retry(RetryPolicy {
        initial_interval: Duration::from_millis(10),
        max_elapsed: Duration::from_secs(5),
    });

    let start = at("2025-07-01T15:00:00+05:30");
    let events = calendar
        .list_events(start, start + ChronoDuration::hours(1))
        .await
        .unwrap();

    assert_eq!(events.len(), 1);
    assert_eq!(google.state.failing_lists.load(Ordering::SeqCst), 0);
}
