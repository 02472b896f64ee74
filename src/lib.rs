//! # Wardrobe
//!
//! Wardrobe tracking backend: catalog the clothes you own, log what you
//! wear, and turn that history into analytics and a game.
//!
//! ## Features
//!
//! - **Catalog**: items with category, color, price and tags, CSV import/export
//! - **Wear log**: single wears and whole outfits, with validation warnings
//! - **Analytics**: cost-per-wear, category breakdowns, neglected items
//! - **Gamification**: XP and levels, streaks, badges, challenges and the
//!   Global Wardrobe Score
//! - **Real-time**: WebSocket notifications for level-ups and badges
//!
//! ## Modules
//!
//! - [`wardrobe`]: Domain model (items, outfits, profiles, subscriptions)
//! - [`storage`]: SQLite-backed document store and typed repository
//! - [`gamification`]: XP, badges, challenges and scoring
//! - [`analytics`]: Dashboard aggregations
//! - [`api`]: REST API server with Axum
//! - [`client`]: HTTP client used by the CLI
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wardrobe::api::{serve, ApiConfig, AppState};
//! use wardrobe::gamification::GamificationSettings;
//! use wardrobe::storage::{DocumentStore, Repository, StorageConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = DocumentStore::open(&StorageConfig::new("./data"))?;
//!     let repo = Repository::new(Arc::new(store));
//!
//!     let config = ApiConfig::default();
//!     let state = AppState::new(repo, GamificationSettings::default(), config.clone());
//!
//!     serve(state, &config).await?;
//!     Ok(())
//! }
//! ```

pub mod analytics;
pub mod api;
pub mod client;
pub mod config;
pub mod gamification;
pub mod storage;
pub mod wardrobe;
pub mod websocket;

// Re-export top-level types for convenience
pub use wardrobe::{
    ItemCategory, OutfitEntry, OutfitWarning, Subscription, Tier, TierLimits, UserProfile,
    Validation, WardrobeItem, WearEvent,
};

pub use storage::{DocumentStore, Repository, StorageConfig, StorageError, StorageResult};

pub use gamification::{
    Activity, GamificationEngine, GamificationError, GamificationOutcome, GamificationSettings,
    GamificationState, GlobalWardrobeScore,
};

pub use analytics::{build_dashboard, Dashboard};

pub use api::{build_router, serve, ApiConfig, ApiError, AppState};

pub use client::{ClientConfig, ClientError, ErrorBucket, WardrobeClient};

pub use websocket::{ConnectionHub, HubConfig, ServerMessage, WsEvent};

pub use config::{Config, ConfigError, LoggingConfig};
