use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vivah_common::cdn::CloudinaryClient;
use vivah_server::config::AppConfig;
use vivah_server::database::init_db;
use vivah_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    if config.cdn.cloud_name.is_empty() {
        tracing::warn!("cdn.cloud_name is not set; CDN deletes will fail");
    }

    let db = init_db(&config.database)
        .await
        .context("Failed to connect to the database")?;

    let http = reqwest::Client::new();
    let cdn = Arc::new(CloudinaryClient::new(config.cdn.clone(), &http));

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server.host/server.port")?;

    let state = AppState::new(db, config, cdn)?;
    let app = vivah_server::build_router(state);

    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
