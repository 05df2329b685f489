use super::common;

use chrono::DateTime;
use common::test_server::TestServer;
use serde_json::Value;

const CHECK_3PM: &str = "Thought: Do I need to use a tool? Yes\nAction: CheckCalendarAvailability\nAction Input: 2025-07-01T15:00:00+05:30";

fn final_answer(text: &str) -> String {
    format!("Thought: Do I need to use a tool? No\nFinal Answer: {text}")
}

#[tokio::test]
async fn test_availability_turn_queries_one_hour() {
    let server = TestServer::new().await;
    server
        .google
        .state
        .script(&[CHECK_3PM, &final_answer("Yes, 3 PM on July 1st is free.")]);

    let response = server.chat("s1", "Is 3pm on July 1st free?").await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["response"], "Yes, 3 PM on July 1st is free.");

    let queries = server.google.state.list_queries.lock().unwrap().clone();
    assert_eq!(queries.len(), 1);
    let min = DateTime::parse_from_rfc3339(&queries[0]["timeMin"]).unwrap();
    let max = DateTime::parse_from_rfc3339(&queries[0]["timeMax"]).unwrap();
    assert_eq!(min, DateTime::parse_from_rfc3339("2025-07-01T15:00:00+05:30").unwrap());
    assert_eq!((max - min).num_minutes(), 60);
    assert_eq!(queries[0]["singleEvents"], "true");
    assert_eq!(queries[0]["orderBy"], "startTime");

    let prompts = server.google.state.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[1].contains("Observation: The 1-hour slot starting at 03:00 PM is free."));
}

#[tokio::test]
async fn test_busy_slot_lists_conflicts() {
    let server = TestServer::new().await;
    server
        .google
        .state
        .add_event("Standup", "2025-07-01T15:30:00+05:30", "2025-07-01T16:00:00+05:30");
    server
        .google
        .state
        .script(&[CHECK_3PM, &final_answer("That slot is taken.")]);

    server.chat("s1", "Is 3pm free?").await;

    let prompts = server.google.state.prompts();
    assert!(prompts[1].contains("The requested time slot is busy. It conflicts with: 'Standup'."));
}

#[tokio::test]
async fn test_booking_turn_creates_event() {
    let server = TestServer::new().await;
    server.google.state.script(&[
        "Thought: Do I need to use a tool? Yes\nAction: BookAppointment\nAction Input: {'time': '2025-07-01T15:00:00+05:30', 'summary': 'Fitting'}",
        &final_answer("Your fitting is booked."),
    ]);

    let response = server.chat("s1", "Book a fitting at 3pm on July 1st").await;
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["response"], "Your fitting is booked.");

    let events = server.google.state.events.lock().unwrap().clone();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["summary"], "Fitting");
    let start = DateTime::parse_from_rfc3339(events[0]["start"]["dateTime"].as_str().unwrap()).unwrap();
    let end = DateTime::parse_from_rfc3339(events[0]["end"]["dateTime"].as_str().unwrap()).unwrap();
    assert_eq!((end - start).num_minutes(), 60);

    let prompts = server.google.state.prompts();
    assert!(prompts[1].contains(
        "Success! The appointment 'Fitting' has been booked for Tuesday, July 01 at 03:00 PM. Event link: https://calendar.google.com/event?eid=evt-1"
    ));
}

#[tokio::test]
async fn test_malformed_time_is_reported_to_the_model() {
    let server = TestServer::new().await;
    server.google.state.script(&[
        "Thought: Do I need to use a tool? Yes\nAction: CheckCalendarAvailability\nAction Input: next tuesday-ish",
        &final_answer("Could you give me an exact time?"),
    ]);

    let response = server.chat("s1", "sometime next week?").await;
    assert_eq!(response.status(), 200);

    let prompts = server.google.state.prompts();
    assert!(prompts[1].contains("Observation: An error occurred:"));
    assert!(server.google.state.list_queries.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_history_is_replayed_per_session() {
    let server = TestServer::new().await;
    server.google.state.script(&[
        &final_answer("Hi! When would you like to come in?"),
        &final_answer("Welcome!"),
        &final_answer("Noted, 3pm."),
    ]);

    server.chat("alice", "hello").await;
    server.chat("bob", "hey there").await;
    server.chat("alice", "3pm tomorrow").await;

    let prompts = server.google.state.prompts();
    assert!(prompts[1].contains("New input: hey there"));
    assert!(!prompts[1].contains("Human: hello"));
    assert!(prompts[2].contains("Human: hello\nAI: Hi! When would you like to come in?"));
    assert!(prompts[2].contains("New input: 3pm tomorrow"));
}

#[tokio::test]
async fn test_prompt_requests_observation_stop() {
    let server = TestServer::new().await;
    server.google.state.script(&[&final_answer("Hello!")]);

    server.chat("s1", "hi").await;

    let requests = server.google.state.gemini_requests.lock().unwrap().clone();
    assert_eq!(requests[0]["generationConfig"]["stopSequences"][0], "\nObservation");
    assert_eq!(requests[0]["contents"][0]["role"], "user");
}

#[tokio::test]
async fn test_model_outage_is_bad_gateway_and_not_recorded() {
    let server = TestServer::new().await;
    *server.google.state.gemini_status.lock().unwrap() = Some(503);

    let response = server.chat("s1", "hi").await;
    assert_eq!(response.status(), 502);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], "model_unavailable");

    *server.google.state.gemini_status.lock().unwrap() = None;
    server.google.state.script(&[&final_answer("Hello again!")]);
    server.chat("s1", "hi again").await;

    let prompts = server.google.state.prompts();
    assert!(!prompts.last().unwrap().contains("Human: hi\n"));
}

#[tokio::test]
async fn test_empty_message_is_rejected() {
    let server = TestServer::new().await;

    let response = server.chat("s1", "").await;
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], "empty_message");
    assert!(server.google.state.gemini_requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_welcome_message() {
    let server = TestServer::new().await;

    let body: Value = reqwest::get(server.url("/")).await.unwrap().json().await.unwrap();
    assert_eq!(body["message"], "Welcome to the TailorTalk Agent API!");
}
