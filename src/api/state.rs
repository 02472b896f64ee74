//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use crate::gamification::{GamificationEngine, GamificationSettings};
use crate::storage::Repository;
use crate::websocket::{ConnectionHub, HubConfig};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Typed document access
    pub repo: Repository,
    /// XP, badges, challenges and score
    pub engine: Arc<GamificationEngine>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
    /// WebSocket connection hub for toast notifications
    pub ws_hub: Arc<ConnectionHub>,
    /// Serializes each user's item read-modify-write sequences
    pub user_locks: Arc<UserLocks>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(repo: Repository, settings: GamificationSettings, config: ApiConfig) -> Self {
        Self::with_ws_config(repo, settings, config, HubConfig::default())
    }

    /// Create AppState with custom WebSocket hub configuration
    pub fn with_ws_config(
        repo: Repository,
        settings: GamificationSettings,
        config: ApiConfig,
        hub_config: HubConfig,
    ) -> Self {
        Self {
            engine: Arc::new(GamificationEngine::new(repo.clone(), settings)),
            repo,
            config: Arc::new(config),
            start_time: Instant::now(),
            ws_hub: Arc::new(ConnectionHub::new(hub_config)),
            user_locks: Arc::new(UserLocks::default()),
        }
    }

    /// Gamification tunables in effect
    pub fn settings(&self) -> &GamificationSettings {
        self.engine.settings()
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Get WebSocket connection count
    pub async fn ws_connection_count(&self) -> usize {
        self.ws_hub.connection_count().await
    }

    /// Hold the user's write lock; item loads, limit checks and saves made
    /// while it is held cannot interleave with another request of the same user
    pub async fn lock_user(&self, user_id: &str) -> OwnedMutexGuard<()> {
        self.user_locks.lock(user_id).await
    }
}

/// One async mutex per user id, created on first use
#[derive(Default)]
pub struct UserLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl UserLocks {
    pub async fn lock(&self, user_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            Arc::clone(locks.entry(user_id.to_string()).or_default())
        };
        lock.lock_owned().await
    }
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Request timeout
    pub request_timeout: Duration,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
    /// Allowed CORS origins, empty for any
    pub cors_origins: Vec<String>,
    /// Shared secret the billing provider sends on subscription sync;
    /// sync is refused when unset
    pub billing_secret: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8090,
            request_timeout: Duration::from_secs(30),
            max_body_size: 5 * 1024 * 1024, // 5MB
            cors_origins: Vec::new(),
            billing_secret: None,
        }
    }
}

impl ApiConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl From<&crate::config::ApiConfig> for ApiConfig {
    fn from(cfg: &crate::config::ApiConfig) -> Self {
        Self {
            host: cfg.host.clone(),
            port: cfg.port,
            request_timeout: Duration::from_secs(cfg.request_timeout_secs),
            max_body_size: cfg.max_body_bytes,
            cors_origins: cfg.cors_origins.clone(),
            billing_secret: cfg
                .billing_secret
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        }
    }
}
