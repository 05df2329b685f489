use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tailortalk::adapters::health_handler::HealthHandler;
use tailortalk::agents::memory::spawn_sweeper;
use tailortalk::cli::Cli;
use tailortalk::config::Settings;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tailortalk=debug")),
        )
        .init();

    let cli = Cli::parse();
    let settings = Settings::new_with_cli(&cli)?;
    let host = settings.server.host.clone();
    let port = settings.server.port;

    info!("Starting TailorTalk on {}:{}", host, port);

    let calendar = tailortalk::build_calendar(&settings.calendar)?;
    let agent = tailortalk::build_agent(&settings, calendar)?;

    let _sweeper = settings.memory.session_ttl_seconds.map(|ttl| {
        info!(ttl_seconds = ttl, "Idle session eviction enabled");
        spawn_sweeper(
            agent.store(),
            Duration::from_secs(ttl),
            Duration::from_secs(settings.memory.sweep_interval_seconds),
        )
    });

    let settings = Arc::new(settings);
    let health_handler = Arc::new(HealthHandler::new(settings.clone()));
    let app = tailortalk::create_app(agent, health_handler, &settings);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
