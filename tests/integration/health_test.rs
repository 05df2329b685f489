use super::common;

use common::test_server::TestServer;

#[tokio::test]
async fn test_health_endpoint() {
    let server = TestServer::new().await;
    let client = reqwest::Client::new();

    let response = client
        .get(server.url("/health"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert!(body["uptime_seconds"].is_number());
    assert!(body["version"].is_string());
    assert_eq!(body["checks"]["calendar_backend"], "google");
    assert_eq!(body["checks"]["llm_model"], "gemini-2.0-flash");
}

#[tokio::test]
async fn test_health_ready_endpoint() {
    let server = TestServer::new().await;

    let response = reqwest::get(server.url("/health/ready")).await.unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_not_ready_without_calendar_id() {
    let server = TestServer::with_settings(|s| s.calendar.calendar_id.clear()).await;

    let response = reqwest::get(server.url("/health/ready")).await.unwrap();
    assert_eq!(response.status(), 503);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "not_ready");
}

#[tokio::test]
async fn test_health_live_endpoint() {
    let server = TestServer::new().await;

    let response = reqwest::get(server.url("/health/live")).await.unwrap();
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "alive");
}

#[tokio::test]
async fn test_ui_is_served() {
    let server = TestServer::new().await;

    let response = reqwest::get(server.url("/ui")).await.unwrap();
    assert_eq!(response.status(), 200);
    assert!(response.text().await.unwrap().contains("TailorTalk"));

    let script = reqwest::get(server.url("/ui/app.js")).await.unwrap();
    assert_eq!(script.status(), 200);
    assert!(script
        .text()
        .await
        .unwrap()
        .contains("Hello! How can I help you book an appointment today?"));
}
