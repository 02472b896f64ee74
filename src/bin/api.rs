//! Wardrobe API Server
//!
//! Run with: cargo run --bin wardrobe-api
//!
//! # Configuration
//!
//! Read from the first config file found (see `wardrobe config init`):
//! `~/.config/wardrobe/config.toml`, `/etc/wardrobe/config.toml`,
//! `./config.toml`. Environment variables override file values:
//! - `WARDROBE_DATA_DIR`: Data directory
//! - `WARDROBE_API_HOST` / `WARDROBE_API_PORT`: Bind address (default: 0.0.0.0:8090)
//! - `WARDROBE_CORS_ORIGINS`: Comma-separated allowed origins
//! - `WARDROBE_REVIVAL_DAYS` / `WARDROBE_SCORE_WINDOW_DAYS`: Gamification tunables
//! - `WARDROBE_LOG_LEVEL` / `WARDROBE_LOG_FORMAT`: Logging (`pretty` or `json`)
//! - `RUST_LOG`: Takes precedence over the configured log level

use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use wardrobe::api::{serve, ApiConfig, AppState};
use wardrobe::config::{Config, LoggingConfig};
use wardrobe::storage::{DocumentStore, Repository, StorageConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load_default();
    init_tracing(&config.logging);

    tracing::info!("Starting Wardrobe API server v{}", env!("CARGO_PKG_VERSION"));

    config.validate().context("Invalid configuration")?;

    let storage_config = StorageConfig::new(config.storage.data_path());
    tracing::info!("Data directory: {:?}", storage_config.data_dir);

    let store = DocumentStore::open(&storage_config).context("Failed to open document store")?;
    let repo = Repository::new(Arc::new(store));

    let api_config = ApiConfig::from(&config.api);
    let state = AppState::new(repo, config.gamification.clone(), api_config.clone());

    serve(state, &api_config).await.context("Server error")?;

    tracing::info!("Wardrobe API server stopped");
    Ok(())
}

/// Install the global subscriber: `RUST_LOG` wins over the configured level
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "wardrobe={level},tower_http={level}",
            level = logging.level
        ))
    });

    let registry = tracing_subscriber::registry().with(filter);
    if logging.is_json() {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
