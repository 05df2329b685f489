use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::agents::config::{AgentConfig, MemoryConfig};
use crate::cli::Cli;

pub mod validator;

pub const ENV_PREFIX: &str = "TAILORTALK";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub calendar: CalendarSettings,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub rate_limit: Option<RateLimitConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub requests_per_second: u32,
    pub burst_size: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CalendarBackend {
    /// Google Calendar v3 with a service account
    #[default]
    Google,
    /// Process-local calendar
    Memory,
}

impl std::fmt::Display for CalendarBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CalendarBackend::Google => write!(f, "google"),
            CalendarBackend::Memory => write!(f, "memory"),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CalendarSettings {
    #[serde(default)]
    pub backend: CalendarBackend,
    #[serde(default)]
    pub calendar_id: String,
    /// Service-account key file
    #[serde(default = "default_credentials_file")]
    pub credentials_file: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,
    #[serde(default = "default_calendar_timeout")]
    pub timeout_seconds: u64,
    /// Offset for all-day events, which carry none
    #[serde(default = "default_utc_offset")]
    pub default_utc_offset: String,
    #[serde(default)]
    pub retry: RetrySettings,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            backend: CalendarBackend::default(),
            calendar_id: String::new(),
            credentials_file: default_credentials_file(),
            base_url: None,
            token_url: None,
            timeout_seconds: default_calendar_timeout(),
            default_utc_offset: default_utc_offset(),
            retry: RetrySettings::default(),
        }
    }
}

fn default_credentials_file() -> PathBuf {
    PathBuf::from("credentials.json")
}

fn default_calendar_timeout() -> u64 {
    30
}

fn default_utc_offset() -> String {
    "+05:30".to_string()
}

/// Backoff for transient calendar failures. Off unless enabled.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RetrySettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_max_elapsed")]
    pub max_elapsed_seconds: u64,
    #[serde(default = "default_initial_interval")]
    pub initial_interval_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            enabled: false,
            max_elapsed_seconds: default_max_elapsed(),
            initial_interval_ms: default_initial_interval(),
        }
    }
}

fn default_max_elapsed() -> u64 {
    10
}

fn default_initial_interval() -> u64 {
    250
}

impl Settings {
    /// Load from the CLI's config file and the process environment, then
    /// apply CLI overrides and validate.
    pub fn new_with_cli(cli: &Cli) -> Result<Self, anyhow::Error> {
        let env: HashMap<String, String> = std::env::vars().collect();
        let mut settings = Self::load(&cli.config, &env)?;

        // CLI > env vars > config file
        settings.apply_cli_overrides(cli);
        settings.validate()?;

        Ok(settings)
    }

    /// Defaults, then the optional TOML file, then `TAILORTALK__*` variables,
    /// then the well-known plain variables.
    pub fn load(config_path: &Path, env: &HashMap<String, String>) -> Result<Self, anyhow::Error> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8000)?
            .add_source(File::from(config_path.to_path_buf()).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .source(Some(env.clone())),
            )
            .build()?;

        let mut settings: Settings = s.try_deserialize()?;
        settings.apply_plain_env(env);

        Ok(settings)
    }

    fn apply_plain_env(&mut self, env: &HashMap<String, String>) {
        let non_empty = |key: &str| env.get(key).filter(|v| !v.trim().is_empty()).cloned();

        if let Some(calendar_id) = non_empty("CALENDAR_ID") {
            self.calendar.calendar_id = calendar_id;
        }
        if let Some(path) = non_empty("GOOGLE_APPLICATION_CREDENTIALS") {
            self.calendar.credentials_file = PathBuf::from(path);
        }
    }

    /// Apply CLI argument overrides to settings
    fn apply_cli_overrides(&mut self, cli: &Cli) {
        if let Some(host) = &cli.host {
            self.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.server.port = port;
        }
        if let Some(backend) = cli.calendar_backend {
            self.calendar.backend = backend;
        }
        if let Some(calendar_id) = &cli.calendar_id {
            self.calendar.calendar_id = calendar_id.clone();
        }
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        validator::ConfigValidator::validate(self).map_err(|errors| {
            let error_messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            anyhow::anyhow!(
                "Configuration validation failed:\n{}",
                error_messages.join("\n")
            )
        })
    }
}
