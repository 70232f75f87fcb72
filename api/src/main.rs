mod config;
mod error;
mod query;
mod routes;
mod staging;
mod state;
mod summarize;
mod train;
mod upload_form;
mod vectors;

#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize environment variables and logging
    config::load_dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().context("failed to load configuration")?;
    let port = config.port;

    let state = AppState::new(config)?;
    log::info!("Application state initialized");

    let app = routes::build_router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("failed to bind port {port}"))?;
    log::info!("Server running on port {}", listener.local_addr()?.port());

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
