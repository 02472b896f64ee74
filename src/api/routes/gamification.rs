//! Gamification Routes
//!
//! - GET /api/v1/gamification - XP, level, streak, counters and badges
//! - GET /api/v1/gamification/score - Global Wardrobe Score
//! - GET /api/v1/badges - Badge catalog with earned flags
//! - GET /api/v1/challenges - Challenge catalog with enrollments
//! - POST /api/v1/challenges/:id/join - Enroll in a challenge

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use std::sync::Arc;

use crate::api::auth::CurrentUser;
use crate::api::dto::{BadgeView, GamificationResponse};
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::gamification::{badges, ChallengeView, Enrollment, GlobalWardrobeScore};
use crate::websocket::{ToastLevel, WsEvent};

/// GET /api/v1/gamification
pub async fn summary(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> ApiResult<Json<GamificationResponse>> {
    let gamification = state.engine.state(user.id()).await?;
    let today = Utc::now().date_naive();
    Ok(Json(GamificationResponse::new(gamification, today)))
}

/// GET /api/v1/gamification/score
pub async fn score(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> ApiResult<Json<GlobalWardrobeScore>> {
    let score = state.engine.score(user.id(), Utc::now()).await?;
    tracing::debug!(user_id = %user.id(), score = score.score, grade = %score.grade, "Score computed");
    Ok(Json(score))
}

/// GET /api/v1/badges
pub async fn list_badges(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<BadgeView>>> {
    let gamification = state.engine.state(user.id()).await?;
    Ok(Json(
        badges::catalog()
            .iter()
            .map(|b| BadgeView::new(b, &gamification))
            .collect(),
    ))
}

/// GET /api/v1/challenges
pub async fn list_challenges(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<ChallengeView>>> {
    Ok(Json(state.engine.challenges(user.id(), Utc::now()).await?))
}

/// POST /api/v1/challenges/:id/join
///
/// The number of concurrently active challenges depends on the tier.
pub async fn join_challenge(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<(StatusCode, Json<Enrollment>)> {
    let limits = state.repo.subscription(user.id()).await?.limits();
    let enrollment = state
        .engine
        .join_challenge(user.id(), &id, &limits, Utc::now())
        .await?;

    state.ws_hub.publish(WsEvent::toast(
        user.id(),
        ToastLevel::Info,
        format!("Challenge started. Ends {}", enrollment.ends_at.format("%b %-d")),
    ));

    tracing::info!(user_id = %user.id(), challenge_id = %id, "Joined challenge");
    Ok((StatusCode::CREATED, Json(enrollment)))
}
