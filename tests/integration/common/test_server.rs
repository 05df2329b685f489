use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tailortalk::adapters::health_handler::HealthHandler;
use tailortalk::agents::config::{AgentConfig, LlmProviderConfig, MemoryConfig};
use tailortalk::agents::llm::GeminiProvider;
use tailortalk::config::{CalendarBackend, CalendarSettings, ServerSettings, Settings};

use super::fake_google::{FakeGoogle, GEMINI_KEY};

pub const CALENDAR_ID: &str = "team@group.calendar.google.com";

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

/// Settings wired to a fake Google server
pub fn settings_for(google: &FakeGoogle) -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        calendar: CalendarSettings {
            backend: CalendarBackend::Google,
            calendar_id: CALENDAR_ID.to_string(),
            credentials_file: fixture("service_account.json"),
            base_url: Some(google.base_url.clone()),
            token_url: Some(google.token_url()),
            timeout_seconds: 5,
            ..Default::default()
        },
        agent: AgentConfig {
            llm: LlmProviderConfig {
                base_url: Some(google.base_url.clone()),
                timeout_seconds: 5,
                ..Default::default()
            },
            timeout_seconds: 10,
            ..Default::default()
        },
        memory: MemoryConfig::default(),
        rate_limit: None,
    }
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub base_url: String,
    pub google: FakeGoogle,
}

impl TestServer {
    pub async fn new() -> Self {
        Self::with_settings(|_| {}).await
    }

    pub async fn with_settings(customize: impl FnOnce(&mut Settings)) -> Self {
        let google = FakeGoogle::start().await;
        let mut settings = settings_for(&google);
        customize(&mut settings);

        let calendar = tailortalk::build_calendar(&settings.calendar).unwrap();
        let llm = Arc::new(GeminiProvider::with_api_key(&settings.agent.llm, GEMINI_KEY).unwrap());
        let agent = tailortalk::build_agent_with_provider(&settings, calendar, llm).unwrap();

        let settings = Arc::new(settings);
        let health_handler = Arc::new(HealthHandler::new(settings.clone()));
        let app = tailortalk::create_app(agent, health_handler, &settings);

        // Start server on random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        TestServer {
            addr,
            base_url,
            google,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn chat(&self, session_id: &str, message: &str) -> reqwest::Response {
        reqwest::Client::new()
            .post(self.url("/chat"))
            .json(&serde_json::json!({ "message": message, "session_id": session_id }))
            .send()
            .await
            .unwrap()
    }
}
