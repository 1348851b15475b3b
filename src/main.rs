use anyhow::Context;
use tracing_subscriber::EnvFilter;

use healthcare_api::config::{self, Environment};
use healthcare_api::database::DatabaseManager;
use healthcare_api::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    // Subscriber first so warnings raised while loading config are not lost
    let default_filter = match Environment::from_env() {
        Environment::Development => "info,tower_http=debug",
        _ => "info",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();

    let config = config::config();
    tracing::info!("Starting Healthcare API in {:?} mode", config.environment);
    config.validate().context("refusing to start")?;

    let store = DatabaseManager::connect(&config.database)
        .await
        .context("failed to initialize record store")?;

    let state = AppState::new(store, config.clone());

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Healthcare API listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
