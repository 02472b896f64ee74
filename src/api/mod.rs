//! Wardrobe REST API
//!
//! HTTP API layer for the wardrobe service, built with Axum. Every
//! `/api/v1` route except the WebSocket requires an `X-User-Id` header.
//!
//! # Endpoints
//!
//! ## Profile
//! - `GET /api/v1/profile` - Current profile with completeness
//! - `PUT /api/v1/profile` - Partial update
//! - `GET /api/v1/subscription` - Tier and limits
//! - `PUT /api/v1/subscription` - Billing sync (needs `X-Billing-Secret`)
//!
//! ## Items
//! - `GET /api/v1/items` - List (`category`, `color`, `tag`, `include_archived`, `sort`)
//! - `POST /api/v1/items` - Create
//! - `GET /api/v1/items/:id` - Get
//! - `PATCH /api/v1/items/:id` - Update
//! - `DELETE /api/v1/items/:id` - Delete
//! - `POST /api/v1/items/:id/wear` - Log a wear
//! - `POST /api/v1/items/import` - CSV import
//!
//! ## Outfits
//! - `GET /api/v1/outfits` - History
//! - `POST /api/v1/outfits` - Log an outfit
//!
//! ## Analytics
//! - `GET /api/v1/analytics` - Dashboard
//! - `GET /api/v1/analytics/cpw` - Cost-per-wear table
//!
//! ## Gamification
//! - `GET /api/v1/gamification` - XP, level, streak, badges
//! - `GET /api/v1/gamification/score` - Global Wardrobe Score
//! - `GET /api/v1/badges` - Badge catalog
//! - `GET /api/v1/challenges` - Challenge catalog
//! - `POST /api/v1/challenges/:id/join` - Enroll
//!
//! ## Export
//! - `GET /api/v1/export?format=json|csv` - Data export
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! ## WebSocket
//! - `GET /api/v1/ws` - Toast notifications
//!
//! # Example
//!
//! ```rust,ignore
//! use wardrobe::api::{serve, ApiConfig, AppState};
//! use wardrobe::gamification::GamificationSettings;
//! use wardrobe::storage::{DocumentStore, Repository, StorageConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = DocumentStore::open(&StorageConfig::new("./data"))?;
//!     let repo = Repository::new(Arc::new(store));
//!     let config = ApiConfig::default();
//!
//!     let state = AppState::new(repo, GamificationSettings::default(), config.clone());
//!     serve(state, &config).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use auth::{BillingProvider, CurrentUser};
pub use error::{ApiError, ApiResult, ErrorBody, ErrorResponse};
pub use state::{ApiConfig, AppState};

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::websocket::websocket_handler;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Profile routes
        .route(
            "/profile",
            get(routes::profile::get_profile).put(routes::profile::update_profile),
        )
        .route(
            "/subscription",
            get(routes::profile::get_subscription).put(routes::profile::update_subscription),
        )
        // Item routes
        .route(
            "/items",
            get(routes::items::list_items).post(routes::items::create_item),
        )
        .route("/items/import", post(routes::items::import_items))
        .route(
            "/items/:id",
            get(routes::items::get_item)
                .patch(routes::items::update_item)
                .delete(routes::items::delete_item),
        )
        .route("/items/:id/wear", post(routes::items::wear_item))
        // Outfit routes
        .route(
            "/outfits",
            get(routes::outfits::list_outfits).post(routes::outfits::create_outfit),
        )
        // Analytics routes
        .route("/analytics", get(routes::analytics::dashboard))
        .route("/analytics/cpw", get(routes::analytics::cpw))
        // Gamification routes
        .route("/gamification", get(routes::gamification::summary))
        .route("/gamification/score", get(routes::gamification::score))
        .route("/badges", get(routes::gamification::list_badges))
        .route("/challenges", get(routes::gamification::list_challenges))
        .route(
            "/challenges/:id/join",
            post(routes::gamification::join_challenge),
        )
        // Export routes
        .route("/export", get(routes::export::export_data))
        // WebSocket route
        .route("/ws", get(websocket_handler));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let cors = cors_layer(&state.config.cors_origins);
    let max_body = state.config.max_body_size;
    let timeout = state.config.request_timeout;

    // Create shared state
    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(DefaultBodyLimit::max(max_body))
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

/// Permissive when no origins are configured
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Wardrobe API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Wardrobe API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gamification::GamificationSettings;
    use crate::storage::Repository;
    use crate::wardrobe::{ItemCategory, WardrobeItem};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::Response,
    };
    use chrono::{Duration, Utc};
    use serde_json::Value;
    use tower::util::ServiceExt;

    const BILLING_SECRET: &str = "test-billing-secret";

    fn create_test_app() -> (Router, Repository) {
        let repo = Repository::in_memory().unwrap();
        let config = ApiConfig {
            billing_secret: Some(BILLING_SECRET.to_string()),
            ..Default::default()
        };
        let state = AppState::new(repo.clone(), GamificationSettings::default(), config);
        (build_router(state), repo)
    }

    async fn sync_subscription(app: &Router, user: &str, secret: Option<&str>, body: &str) -> Response {
        let mut builder = Request::builder()
            .method("PUT")
            .uri("/api/v1/subscription")
            .header("X-User-Id", user)
            .header("Content-Type", "application/json");
        if let Some(secret) = secret {
            builder = builder.header("X-Billing-Secret", secret);
        }
        app.clone()
            .oneshot(builder.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap()
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        user: Option<&str>,
        body: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header("X-User-Id", user);
        }
        let body = match body {
            Some(json) => {
                builder = builder.header("Content-Type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        app.clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn create_item(app: &Router, user: &str, name: &str) -> String {
        let body = format!(r#"{{"name": "{}", "category": "top", "purchase_price": 30}}"#, name);
        let response = send(app, "POST", "/api/v1/items", Some(user), Some(&body)).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let json = json_body(response).await;
        json["item"]["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let (app, _repo) = create_test_app();

        for uri in ["/health/live", "/health/ready", "/health"] {
            let response = send(&app, "GET", uri, None, None).await;
            assert_eq!(response.status(), StatusCode::OK, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_missing_user_is_unauthorized() {
        let (app, _repo) = create_test_app();

        let response = send(&app, "GET", "/api/v1/items", None, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "UNAUTHORIZED");
        assert!(json["request_id"].is_string());
    }

    #[tokio::test]
    async fn test_create_and_list_items() {
        let (app, _repo) = create_test_app();

        let body = r##"{"name": " Linen Shirt ", "category": "top", "color": "#FFFFFF"}"##;
        let response = send(&app, "POST", "/api/v1/items", Some("u1"), Some(body)).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let json = json_body(response).await;
        assert_eq!(json["item"]["name"], "Linen Shirt");
        assert_eq!(json["item"]["color"], "#ffffff");
        assert_eq!(json["gamification"]["xp_gained"], 10);

        let response = send(&app, "GET", "/api/v1/items", Some("u1"), None).await;
        let json = json_body(response).await;
        assert_eq!(json["total"], 1);

        // Another user sees nothing
        let response = send(&app, "GET", "/api/v1/items", Some("u2"), None).await;
        assert_eq!(json_body(response).await["total"], 0);
    }

    #[tokio::test]
    async fn test_invalid_item_rejected() {
        let (app, _repo) = create_test_app();

        let body = r#"{"name": "   ", "category": "top"}"#;
        let response = send(&app, "POST", "/api/v1/items", Some("u1"), Some(body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_other_users_item_forbidden() {
        let (app, _repo) = create_test_app();
        let id = create_item(&app, "u1", "Tee").await;

        let uri = format!("/api/v1/items/{}", id);
        let response = send(&app, "GET", &uri, Some("u2"), None).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = send(&app, "DELETE", &uri, Some("u2"), None).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = send(&app, "GET", "/api/v1/items/missing", Some("u1"), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = send(&app, "DELETE", &uri, Some("u1"), None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_free_tier_item_limit() {
        let (app, repo) = create_test_app();
        for i in 0..50 {
            let mut item = WardrobeItem::new("u1", format!("Item {}", i), ItemCategory::Top);
            item.archived = i % 2 == 0;
            repo.save_item(&item).await.unwrap();
        }

        let body = r#"{"name": "One too many", "category": "top"}"#;
        let response = send(&app, "POST", "/api/v1/items", Some("u1"), Some(body)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_wear_logging() {
        let (app, _repo) = create_test_app();
        let id = create_item(&app, "u1", "Tee").await;
        let uri = format!("/api/v1/items/{}/wear", id);

        let response = send(&app, "POST", &uri, Some("u1"), Some("{}")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["item"]["wear_count"], 1);
        assert_eq!(json["item"]["cost_per_wear"], 30.0);
        assert_eq!(json["wear"]["revived"], false);

        let future = r#"{"worn_at": "2999-01-01T00:00:00Z"}"#;
        let response = send(&app, "POST", &uri, Some("u1"), Some(future)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_outfit_requires_own_items() {
        let (app, _repo) = create_test_app();
        let mine = create_item(&app, "u1", "Tee").await;
        let theirs = create_item(&app, "u2", "Jeans").await;

        let body = format!(r#"{{"item_ids": ["{}", "{}"]}}"#, mine, theirs);
        let response = send(&app, "POST", "/api/v1/outfits", Some("u1"), Some(&body)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let body = format!(
            r#"{{"item_ids": ["{}"], "warnings": ["Light layers", {{"type": "weather", "message": "Rain"}}]}}"#,
            mine
        );
        let response = send(&app, "POST", "/api/v1/outfits", Some("u1"), Some(&body)).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let json = json_body(response).await;
        assert_eq!(json["outfit"]["warning_text"][1], "weather: Rain");

        let response = send(&app, "GET", "/api/v1/outfits", Some("u1"), None).await;
        assert_eq!(json_body(response).await["total"], 1);
    }

    #[tokio::test]
    async fn test_challenge_join_rules() {
        let (app, _repo) = create_test_app();

        let response = send(&app, "POST", "/api/v1/challenges/nope/join", Some("u1"), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let uri = "/api/v1/challenges/outfit-diary/join";
        let response = send(&app, "POST", uri, Some("u1"), None).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = send(&app, "POST", uri, Some("u1"), None).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);

        // Free tier allows one active challenge
        let response = send(&app, "POST", "/api/v1/challenges/mix-it-up/join", Some("u1"), None).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_export_requires_paid_tier() {
        let (app, _repo) = create_test_app();
        create_item(&app, "u1", "Tee").await;

        let response = send(&app, "GET", "/api/v1/export?format=csv", Some("u1"), None).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let body = r#"{"tier": "premium", "status": "active"}"#;
        let response = sync_subscription(&app, "u1", Some(BILLING_SECRET), body).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["limits"]["max_items"], 500);

        let response = send(&app, "GET", "/api/v1/export?format=csv", Some("u1"), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["content-type"].to_str().unwrap(),
            "text/csv"
        );
    }

    #[tokio::test]
    async fn test_user_cannot_self_upgrade() {
        let (app, _repo) = create_test_app();
        let body = r#"{"tier": "pro", "status": "active"}"#;

        let response = sync_subscription(&app, "u1", None, body).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let response = sync_subscription(&app, "u1", Some("guessed"), body).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = send(&app, "GET", "/api/v1/subscription", Some("u1"), None).await;
        assert_eq!(json_body(response).await["tier"], "free");

        let response = send(&app, "GET", "/api/v1/export?format=csv", Some("u1"), None).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_wears_all_counted() {
        let (app, repo) = create_test_app();
        let id = create_item(&app, "u1", "Tee").await;
        let uri = format!("/api/v1/items/{}/wear", id);

        let handles: Vec<_> = (0..40)
            .map(|_| {
                let app = app.clone();
                let uri = uri.clone();
                tokio::spawn(async move { send(&app, "POST", &uri, Some("u1"), Some("{}")).await.status() })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap(), StatusCode::OK);
        }

        let item = repo.item(&id).await.unwrap().unwrap();
        assert_eq!(item.wear_count, 40);
        assert_eq!(repo.wears("u1").await.unwrap().len(), 40);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_respect_item_limit() {
        let (app, repo) = create_test_app();
        for i in 0..45 {
            let item = WardrobeItem::new("u1", format!("Item {}", i), ItemCategory::Top);
            repo.save_item(&item).await.unwrap();
        }

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let app = app.clone();
                tokio::spawn(async move {
                    let body = format!(r#"{{"name": "Rush {}", "category": "top"}}"#, i);
                    send(&app, "POST", "/api/v1/items", Some("u1"), Some(&body)).await.status()
                })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap() == StatusCode::CREATED {
                created += 1;
            }
        }
        assert_eq!(created, 5);
        assert_eq!(repo.count_items("u1").await.unwrap(), 50);
    }

    #[tokio::test]
    async fn test_slightly_future_wear_counts_for_challenge() {
        let (app, _repo) = create_test_app();
        let id = create_item(&app, "u1", "Tee").await;

        let response = send(&app, "POST", "/api/v1/challenges/mix-it-up/join", Some("u1"), None).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let ahead = (Utc::now() + Duration::seconds(60)).to_rfc3339();
        let body = format!(r#"{{"worn_at": "{}"}}"#, ahead);
        let uri = format!("/api/v1/items/{}/wear", id);
        let response = send(&app, "POST", &uri, Some("u1"), Some(&body)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(&app, "GET", "/api/v1/challenges", Some("u1"), None).await;
        let json = json_body(response).await;
        let mix = json
            .as_array()
            .unwrap()
            .iter()
            .find(|c| c["id"] == "mix-it-up")
            .unwrap();
        assert_eq!(mix["enrollment"]["progress"], 1);
    }

    #[tokio::test]
    async fn test_profile_completion_bonus() {
        let (app, _repo) = create_test_app();

        let body = r#"{
            "display_name": "Sam",
            "avatar_url": "https://img.example/sam.png",
            "bio": "Minimalist",
            "location": "Lisbon",
            "body_type": "athletic",
            "preferences": {"style": ["casual"]},
            "measurements": {"height_cm": 172}
        }"#;
        let response = send(&app, "PUT", "/api/v1/profile", Some("u1"), Some(body)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["completeness"], 1.0);
        assert_eq!(json["gamification"]["xp_gained"], 50);

        // Awarded once
        let response = send(&app, "PUT", "/api/v1/profile", Some("u1"), Some(body)).await;
        assert_eq!(json_body(response).await["gamification"]["xp_gained"], 0);
    }

    #[tokio::test]
    async fn test_score_and_dashboard() {
        let (app, _repo) = create_test_app();
        create_item(&app, "u1", "Tee").await;

        let response = send(&app, "GET", "/api/v1/gamification/score", Some("u1"), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert!(json["score"].is_number());
        assert!(json["grade"].is_string());

        let response = send(&app, "GET", "/api/v1/analytics", Some("u1"), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["total_items"], 1);

        let response = send(&app, "GET", "/api/v1/badges", Some("u1"), None).await;
        let json = json_body(response).await;
        assert!(json
            .as_array()
            .unwrap()
            .iter()
            .any(|b| b["id"] == "first_item" && b["earned"] == true));
    }
}
