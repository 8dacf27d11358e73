use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use boardpulse_ai::build_generator;
use boardpulse_board::TrelloClient;
use boardpulse_server::agent::{AgentError, ReportAgent};
use boardpulse_server::app;
use boardpulse_server::config::ServerConfig;
use boardpulse_server::state::AppState;

#[allow(clippy::print_stderr)]
fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  boardpulse-server [config.toml]    Start the server (default: config/server.toml)");
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("boardpulse=info".parse()?))
        .init();

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(|s| s.as_str()) {
        Some("--help") | Some("-h") => {
            print_usage();
            Ok(())
        }
        other => run_server(other.unwrap_or("config/server.toml")).await,
    }
}

async fn run_server(config_path: &str) -> Result<()> {
    let config = ServerConfig::load(config_path)?;

    tracing::info!(
        config = %config_path,
        http_port = config.http_port,
        data_dir = %config.data_dir,
        provider = %config.ai.provider,
        "boardpulse-server starting"
    );

    let boards = TrelloClient::new(
        config.trello.credentials.clone(),
        Some(config.trello.base_url.clone()),
        Some(config.trello.timeout_secs),
    )
    .context("Failed to build Trello client")?;
    let generator = build_generator(&config.ai).context("Failed to build AI provider")?;

    let agent = Arc::new(
        ReportAgent::new(
            Arc::new(boards),
            generator,
            config.reports_dir(),
            config.schedule.report_schedule(),
            Duration::from_secs(config.schedule.tick_secs),
        )
        .context("Failed to initialize report agent")?,
    );

    if config.schedule.autostart {
        agent.start().await?;
    } else {
        tracing::info!("Report agent autostart disabled");
    }

    let http_addr: SocketAddr = format!("0.0.0.0:{}", config.http_port).parse()?;
    let state = AppState::new(agent.clone(), config);
    let app = app::build_http_app(state);
    let http_listener = tokio::net::TcpListener::bind(http_addr)
        .await
        .with_context(|| format!("Failed to bind {http_addr}"))?;

    tracing::info!(http = %http_addr, "Server started");

    if let Err(e) = axum::serve(http_listener, app)
        .with_graceful_shutdown(async {
            signal::ctrl_c().await.ok();
            tracing::info!("Shutting down gracefully");
        })
        .await
    {
        tracing::error!(error = %e, "HTTP server error");
    }

    match agent.stop().await {
        Ok(()) | Err(AgentError::NotRunning) => {}
        Err(e) => tracing::error!(error = %e, "Failed to stop report agent"),
    }
    tracing::info!("Server stopped");

    Ok(())
}
