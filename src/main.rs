use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use clubroom::{AppConfig, AppState, InMemoryStore, SessionRegistry, build_router};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "clubroom")]
#[command(about = "Form submission endpoints for the club admin tool")]
struct Cli {
    /// Overrides APP_HOST.
    #[arg(long)]
    host: Option<String>,
    /// Overrides APP_PORT.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = AppConfig::from_env()
        .context("failed to load application configuration")?
        .with_overrides(cli.host, cli.port);

    let sessions = SessionRegistry::from_seed(&config.sessions)
        .context("CLUBROOM_SESSIONS is malformed")?;
    if sessions.is_empty().await {
        warn!("no sessions configured; every submission will be rejected as unauthenticated");
    }

    let state = AppState::new(Arc::new(InMemoryStore::new()), Arc::new(sessions));
    let app = build_router(state);

    let addr = config.address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(address = %addr, "clubroom started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("clubroom=debug,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "unable to install Ctrl+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "unable to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
