//! Profile and Subscription Routes
//!
//! - GET /api/v1/profile - Current user's profile
//! - PUT /api/v1/profile - Partial profile update
//! - GET /api/v1/subscription - Tier and limits in effect
//! - PUT /api/v1/subscription - Sync from the payments platform

use axum::{extract::State, Json};
use chrono::Utc;
use std::sync::Arc;

use super::notify;
use crate::api::auth::{BillingProvider, CurrentUser};
use crate::api::dto::{ProfileResponse, SubscriptionResponse, SubscriptionUpdate};
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::gamification::Activity;
use crate::wardrobe::{ProfilePatch, Subscription, UserProfile};

/// GET /api/v1/profile
///
/// A user who never saved a profile gets an empty one.
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> ApiResult<Json<ProfileResponse>> {
    let profile = state
        .repo
        .profile(user.id())
        .await?
        .unwrap_or_else(|| UserProfile::new(user.id()));

    Ok(Json(ProfileResponse::new(profile)))
}

/// PUT /api/v1/profile
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(patch): Json<ProfilePatch>,
) -> ApiResult<Json<ProfileResponse>> {
    let mut profile = state
        .repo
        .profile(user.id())
        .await?
        .unwrap_or_else(|| UserProfile::new(user.id()));

    profile.apply_patch(patch)?;
    state.repo.save_profile(&profile).await?;

    let outcome = state
        .engine
        .record(
            user.id(),
            Activity::ProfileUpdated {
                complete: profile.is_complete(),
            },
            Utc::now(),
        )
        .await?;
    notify(&state, user.id(), "profile_completed", &outcome);

    tracing::info!(user_id = %user.id(), completeness = profile.completeness(), "Profile updated");

    let mut response = ProfileResponse::new(profile);
    response.gamification = Some(outcome);
    Ok(Json(response))
}

/// GET /api/v1/subscription
pub async fn get_subscription(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> ApiResult<Json<SubscriptionResponse>> {
    let subscription = state.repo.subscription(user.id()).await?;
    Ok(Json(subscription.into()))
}

/// PUT /api/v1/subscription
///
/// Mirrors the tier and status reported by the payments platform. Only the
/// billing provider may call it; see [`BillingProvider`].
pub async fn update_subscription(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    _provider: BillingProvider,
    Json(update): Json<SubscriptionUpdate>,
) -> ApiResult<Json<SubscriptionResponse>> {
    let mut subscription = Subscription::free(user.id());
    subscription.tier = update.tier;
    subscription.status = update.status;
    subscription.current_period_end = update.current_period_end;
    subscription.provider_customer_id = update.provider_customer_id;
    subscription.updated_at = Utc::now();

    state.repo.save_subscription(&subscription).await?;

    tracing::info!(
        user_id = %user.id(),
        tier = %subscription.tier,
        status = ?subscription.status,
        "Subscription synced"
    );

    Ok(Json(subscription.into()))
}
