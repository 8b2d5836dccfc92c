use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ganado_server::backend::{create_router, initialize_backend};
use ganado_server::config::{AppConfig, DEFAULT_SECRET_KEY};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging; RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;
    if config.secret_key == DEFAULT_SECRET_KEY {
        warn!("Using the default secret key; set GANADO_SECRET_KEY in production");
    }

    let app_state = initialize_backend(&config).await?;
    let app = create_router(app_state, &config.static_dir);

    let addr = config.socket_addr()?;
    info!("Starting server on {}", addr);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
