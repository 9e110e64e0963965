use anyhow::Context;
use quotex_signal::{config::AppConfig, routes, services, state::AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    tracing::info!(
        pairs = ?config.market.pairs,
        policy = ?config.indicators.policy,
        macd_source = ?config.indicators.macd_source,
        "Configuration loaded"
    );

    let state = AppState::new(config);

    // Spawn pair watcher
    let polling_state = state.clone();
    tokio::spawn(async move {
        services::watch_service::start_signal_polling(polling_state).await;
    });

    let app = routes::router(state.clone());

    let addr = state.config.bind_addr.clone();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
