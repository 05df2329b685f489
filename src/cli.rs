use clap::Parser;
use std::path::PathBuf;

use crate::config::CalendarBackend;

/// TailorTalk - conversational appointment booking over a chat API
#[derive(Parser, Debug, Clone)]
#[command(name = "tailortalk", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "TAILORTALK_CONFIG", default_value = "tailortalk.toml")]
    pub config: PathBuf,

    /// Server host address
    #[arg(long, env = "TAILORTALK_HOST")]
    pub host: Option<String>,

    /// Server port
    #[arg(long, env = "TAILORTALK_PORT")]
    pub port: Option<u16>,

    /// Calendar backend to use
    #[arg(long, value_enum)]
    pub calendar_backend: Option<CalendarBackend>,

    /// Calendar to read and book on
    #[arg(long)]
    pub calendar_id: Option<String>,
}
