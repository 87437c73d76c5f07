use anyhow::Context;
use tokio::net::TcpListener;

use askpage::config::AppConfig;
use askpage::logging;
use askpage::server;
use askpage::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("Invalid configuration")?;
    logging::init(&config.log_dir);

    let state = AppState::initialize(config)
        .await
        .context("Failed to initialize application state")?;

    let bind_addr = state.config.bind_addr();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;
    tracing::info!("Listening on {}", addr);

    let app = server::router::router(state);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
