mod admin;
mod backend;
mod config;
mod errors;
mod lookup;
mod models;
mod receipt;
mod routes;
mod state;
mod storage;
mod tracker;
mod util;
mod wizard;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::FileStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting intake portal v{}", env!("CARGO_PKG_VERSION"));
    info!("Portal mode: {:?}, backend {}", config.mode, config.api_base_url);

    // Local key/value store
    let store = FileStore::open(&config.data_dir)
        .await
        .with_context(|| format!("Failed to open local store in {}", config.data_dir.display()))?;

    let state = AppState::new(&config, Arc::new(store));
    info!("Receipts will be written to {}", state.receipts.dir().display());

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
