//! One local server standing in for Google: the OAuth token endpoint,
//! Calendar v3 events, and Gemini `generateContent`.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use chrono::{DateTime, FixedOffset};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const ACCESS_TOKEN: &str = "fake-access-token";
pub const GEMINI_KEY: &str = "test-gemini-key";

#[derive(Default)]
pub struct FakeState {
    pub events: Mutex<Vec<Value>>,
    pub list_queries: Mutex<Vec<HashMap<String, String>>>,
    pub token_requests: AtomicUsize,
    /// Upcoming list calls that answer 503
    pub failing_lists: AtomicUsize,
    pub gemini_replies: Mutex<VecDeque<String>>,
    pub gemini_requests: Mutex<Vec<Value>>,
    /// Status every Gemini call answers with, when set
    pub gemini_status: Mutex<Option<u16>>,
}

impl FakeState {
    /// Queue model replies, oldest first
    pub fn script(&self, replies: &[&str]) {
        self.gemini_replies
            .lock()
            .unwrap()
            .extend(replies.iter().map(|r| r.to_string()));
    }

    /// Prompt text of every Gemini request so far
    pub fn prompts(&self) -> Vec<String> {
        self.gemini_requests
            .lock()
            .unwrap()
            .iter()
            .map(|body| body["contents"][0]["parts"][0]["text"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    pub fn add_event(&self, summary: &str, start: &str, end: &str) {
        let mut events = self.events.lock().unwrap();
        let id = format!("seed-{}", events.len() + 1);
        events.push(json!({
            "id": id,
            "summary": summary,
            "htmlLink": format!("https://calendar.google.com/event?eid={id}"),
            "start": { "dateTime": start },
            "end": { "dateTime": end },
        }));
    }
}

pub struct FakeGoogle {
    pub base_url: String,
    pub state: Arc<FakeState>,
}

impl FakeGoogle {
    pub async fn start() -> Self {
        let state = Arc::new(FakeState::default());

        let app = Router::new()
            .route("/token", post(token))
            .route("/calendars/:calendar_id/events", get(list_events).post(insert_event))
            .route("/models/:action", post(generate_content))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        FakeGoogle {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn token_url(&self) -> String {
        format!("{}/token", self.base_url)
    }
}

fn google_error(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({ "error": { "code": status.as_u16(), "message": message } })),
    )
        .into_response()
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {ACCESS_TOKEN}"))
}

async fn token(State(state): State<Arc<FakeState>>, Form(form): Form<HashMap<String, String>>) -> Response {
    state.token_requests.fetch_add(1, Ordering::SeqCst);

    let grant_ok = form.get("grant_type").map(String::as_str) == Some("urn:ietf:params:oauth:grant-type:jwt-bearer");
    let assertion_ok = form.get("assertion").is_some_and(|a| a.split('.').count() == 3);
    if !grant_ok || !assertion_ok {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "invalid_grant" }))).into_response();
    }

    Json(json!({
        "access_token": ACCESS_TOKEN,
        "expires_in": 3600,
        "token_type": "Bearer",
    }))
    .into_response()
}

fn parse(ts: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(ts).ok()
}

async fn list_events(
    State(state): State<Arc<FakeState>>,
    Path(_calendar_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return google_error(StatusCode::UNAUTHORIZED, "Invalid Credentials");
    }

    if state
        .failing_lists
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
    {
        return google_error(StatusCode::SERVICE_UNAVAILABLE, "Backend Error");
    }

    state.list_queries.lock().unwrap().push(query.clone());

    let (Some(min), Some(max)) = (
        query.get("timeMin").and_then(|t| parse(t)),
        query.get("timeMax").and_then(|t| parse(t)),
    ) else {
        return google_error(StatusCode::BAD_REQUEST, "Missing time bounds");
    };

    let mut items: Vec<Value> = state
        .events
        .lock()
        .unwrap()
        .iter()
        .filter(|e| {
            let start = e["start"]["dateTime"].as_str().and_then(parse);
            let end = e["end"]["dateTime"].as_str().and_then(parse);
            matches!((start, end), (Some(s), Some(en)) if s < max && en > min)
        })
        .cloned()
        .collect();
    items.sort_by_key(|e| e["start"]["dateTime"].as_str().and_then(parse));

    Json(json!({ "kind": "calendar#events", "items": items })).into_response()
}

async fn insert_event(
    State(state): State<Arc<FakeState>>,
    Path(_calendar_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return google_error(StatusCode::UNAUTHORIZED, "Invalid Credentials");
    }

    let mut events = state.events.lock().unwrap();
    let id = format!("evt-{}", events.len() + 1);
    let mut event = body;
    event["id"] = json!(id);
    event["htmlLink"] = json!(format!("https://calendar.google.com/event?eid={id}"));
    events.push(event.clone());

    Json(event).into_response()
}

async fn generate_content(
    State(state): State<Arc<FakeState>>,
    Path(action): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !action.ends_with(":generateContent") {
        return google_error(StatusCode::NOT_FOUND, "Unknown method");
    }

    let key_ok = headers
        .get("x-goog-api-key")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == GEMINI_KEY);
    if !key_ok {
        return google_error(StatusCode::FORBIDDEN, "API key not valid");
    }

    state.gemini_requests.lock().unwrap().push(body);

    if let Some(status) = *state.gemini_status.lock().unwrap() {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return google_error(status, "The model is overloaded");
    }

    let text = state
        .gemini_replies
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| "Thought: Do I need to use a tool? No\nFinal Answer: (script exhausted)".to_string());

    Json(json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP",
        }],
        "usageMetadata": { "promptTokenCount": 100, "candidatesTokenCount": 20, "totalTokenCount": 120 },
    }))
    .into_response()
}
