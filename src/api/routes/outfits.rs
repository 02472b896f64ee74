//! Outfit Routes
//!
//! - GET /api/v1/outfits - Outfit history, newest first
//! - POST /api/v1/outfits - Log an outfit (records a wear per item)

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use std::sync::Arc;

use super::items::{load_owned, resolve_worn_at};
use super::notify;
use crate::api::auth::CurrentUser;
use crate::api::dto::{
    CreateOutfitRequest, OutfitCreatedResponse, OutfitListResponse, OutfitQuery, OutfitResponse,
};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::gamification::{detect_revival, Activity, WornItem};
use crate::wardrobe::WearEvent;

/// GET /api/v1/outfits
pub async fn list_outfits(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Query(query): Query<OutfitQuery>,
) -> ApiResult<Json<OutfitListResponse>> {
    let mut outfits = state.repo.outfits(user.id()).await?;
    outfits.sort_by(|a, b| b.worn_at.cmp(&a.worn_at));
    let total = outfits.len();

    if let Some(limit) = query.limit {
        outfits.truncate(limit);
    }

    Ok(Json(OutfitListResponse {
        outfits: outfits.into_iter().map(OutfitResponse::from).collect(),
        total,
    }))
}

/// POST /api/v1/outfits
pub async fn create_outfit(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(req): Json<CreateOutfitRequest>,
) -> ApiResult<(StatusCode, Json<OutfitCreatedResponse>)> {
    let now = Utc::now();
    let worn_at = resolve_worn_at(req.worn_at, now)?;

    let _guard = state.lock_user(user.id()).await;

    let entry = req.into_entry(user.id(), worn_at);
    entry.validate()?;

    // Resolve every item before writing anything
    let mut items = Vec::with_capacity(entry.item_ids.len());
    for id in &entry.item_ids {
        let item = load_owned(&state, &user, id).await?;
        if item.archived {
            return Err(ApiError::Validation(format!(
                "Archived item '{}' cannot be worn",
                item.name
            )));
        }
        items.push(item);
    }

    let threshold = state.settings().revival_threshold_days;
    let mut worn = Vec::with_capacity(items.len());
    for mut item in items {
        let revived = detect_revival(&item, worn_at, threshold);
        item.record_wear(worn_at);
        state.repo.save_item(&item).await?;

        let mut wear = WearEvent::new(user.id(), &item.id, worn_at).outfit(&entry.id);
        wear.revived = revived;
        state.repo.save_wear(&wear).await?;

        worn.push(WornItem {
            item_id: item.id,
            revived,
        });
    }

    state.repo.save_outfit(&entry).await?;

    let outcome = state
        .engine
        .record(
            user.id(),
            Activity::OutfitLogged {
                outfit_id: entry.id.clone(),
                worn_at,
                items: worn,
            },
            now,
        )
        .await?;
    notify(&state, user.id(), "outfit_logged", &outcome);

    tracing::info!(
        user_id = %user.id(),
        outfit_id = %entry.id,
        items = entry.item_ids.len(),
        "Outfit logged"
    );

    Ok((
        StatusCode::CREATED,
        Json(OutfitCreatedResponse {
            outfit: entry.into(),
            gamification: outcome,
        }),
    ))
}
