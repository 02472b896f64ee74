//! Item Routes
//!
//! - GET /api/v1/items - List items with filters and sorting
//! - POST /api/v1/items - Add an item (tier item limit applies)
//! - GET /api/v1/items/:id - Get one item
//! - PATCH /api/v1/items/:id - Partial update
//! - DELETE /api/v1/items/:id - Delete an item (wear history is kept)
//! - POST /api/v1/items/:id/wear - Log a wear
//! - POST /api/v1/items/import - Bulk CSV import (paid tiers)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Duration, Utc};
use std::cmp::Ordering;
use std::sync::Arc;

use super::notify;
use crate::api::auth::CurrentUser;
use crate::api::dto::{
    CreateItemRequest, ImportResponse, ItemActionResponse, ItemListResponse, ItemQuery,
    ItemResponse, ItemSort, WearRequest, WearResponse,
};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::gamification::{detect_revival, Activity, GamificationOutcome};
use crate::wardrobe::{
    normalize_color, ItemCsvImporter, ItemPatch, TierLimits, WardrobeItem, WearEvent,
};

/// Clock skew tolerated on client-supplied wear times
const FUTURE_TOLERANCE_SECS: i64 = 300;

/// GET /api/v1/items
pub async fn list_items(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Query(query): Query<ItemQuery>,
) -> ApiResult<Json<ItemListResponse>> {
    let now = Utc::now();
    let mut items = filter_items(state.repo.items(user.id()).await?, &query);
    sort_items(&mut items, query.sort);

    let items: Vec<ItemResponse> = items
        .into_iter()
        .map(|item| ItemResponse::new(item, now))
        .collect();

    Ok(Json(ItemListResponse {
        total: items.len(),
        items,
    }))
}

fn filter_items(items: Vec<WardrobeItem>, query: &ItemQuery) -> Vec<WardrobeItem> {
    let color = query.color.as_deref().and_then(normalize_color);

    items
        .into_iter()
        .filter(|i| query.include_archived || !i.archived)
        .filter(|i| query.category.map_or(true, |c| i.category == c))
        .filter(|i| match &color {
            Some(wanted) => i
                .color
                .as_deref()
                .and_then(normalize_color)
                .map_or(false, |c| c.eq_ignore_ascii_case(wanted)),
            None => true,
        })
        .filter(|i| query.tag.as_deref().map_or(true, |t| i.has_tag(t.trim())))
        .collect()
}

fn sort_items(items: &mut [WardrobeItem], sort: ItemSort) {
    match sort {
        ItemSort::Recent => items.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        ItemSort::MostWorn => items.sort_by(|a, b| {
            b.wear_count
                .cmp(&a.wear_count)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        }),
        ItemSort::LeastWorn => items.sort_by(|a, b| {
            a.wear_count
                .cmp(&b.wear_count)
                .then_with(|| a.last_worn_at.cmp(&b.last_worn_at))
        }),
        ItemSort::Cpw => items.sort_by(|a, b| match (a.cost_per_wear(), b.cost_per_wear()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }),
        ItemSort::Name => items.sort_by_key(|i| i.name.to_lowercase()),
    }
}

/// Load an item and check the caller owns it
pub(crate) async fn load_owned(state: &AppState, user: &CurrentUser, id: &str) -> ApiResult<WardrobeItem> {
    let item = state
        .repo
        .item(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Item {} not found", id)))?;
    user.ensure_owns(&item.owner_id, "Item")?;
    Ok(item)
}

fn item_limit_error(limits: &TierLimits) -> ApiError {
    ApiError::Forbidden(format!(
        "Your plan allows {} items. Upgrade to add more.",
        limits.max_items.unwrap_or_default()
    ))
}

/// POST /api/v1/items
pub async fn create_item(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(req): Json<CreateItemRequest>,
) -> ApiResult<(StatusCode, Json<ItemActionResponse>)> {
    let _guard = state.lock_user(user.id()).await;
    let limits = state.repo.subscription(user.id()).await?.limits();
    // Archived items still count toward the limit
    let count = state.repo.count_items(user.id()).await?;
    if !limits.allows_items(count) {
        return Err(item_limit_error(&limits));
    }

    let mut item = req.into_item(user.id());
    item.sanitize()?;
    state.repo.save_item(&item).await?;

    let now = Utc::now();
    let outcome = state
        .engine
        .record(
            user.id(),
            Activity::ItemAdded {
                item_id: item.id.clone(),
            },
            now,
        )
        .await?;
    notify(&state, user.id(), "item_added", &outcome);

    tracing::info!(user_id = %user.id(), item_id = %item.id, category = %item.category, "Item created");

    Ok((
        StatusCode::CREATED,
        Json(ItemActionResponse {
            item: ItemResponse::new(item, now),
            gamification: outcome,
        }),
    ))
}

/// GET /api/v1/items/:id
pub async fn get_item(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ItemResponse>> {
    let item = load_owned(&state, &user, &id).await?;
    Ok(Json(ItemResponse::new(item, Utc::now())))
}

/// PATCH /api/v1/items/:id
pub async fn update_item(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(patch): Json<ItemPatch>,
) -> ApiResult<Json<ItemResponse>> {
    let _guard = state.lock_user(user.id()).await;
    let mut item = load_owned(&state, &user, &id).await?;
    item.apply_patch(patch)?;
    state.repo.save_item(&item).await?;

    tracing::debug!(user_id = %user.id(), item_id = %id, "Item updated");
    Ok(Json(ItemResponse::new(item, Utc::now())))
}

/// DELETE /api/v1/items/:id
pub async fn delete_item(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let _guard = state.lock_user(user.id()).await;
    load_owned(&state, &user, &id).await?;
    state.repo.delete_item(&id).await?;

    tracing::info!(user_id = %user.id(), item_id = %id, "Item deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Resolve a client-supplied wear time. Times past the clock-skew tolerance
/// are rejected; those within it are clamped to `now`.
pub(crate) fn resolve_worn_at(
    worn_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> ApiResult<DateTime<Utc>> {
    let worn_at = worn_at.unwrap_or(now);
    if worn_at > now + Duration::seconds(FUTURE_TOLERANCE_SECS) {
        return Err(ApiError::Validation(
            "worn_at cannot be in the future".to_string(),
        ));
    }
    Ok(worn_at.min(now))
}

/// POST /api/v1/items/:id/wear
pub async fn wear_item(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<WearRequest>,
) -> ApiResult<Json<WearResponse>> {
    let now = Utc::now();
    let worn_at = resolve_worn_at(req.worn_at, now)?;

    let _guard = state.lock_user(user.id()).await;

    let mut item = load_owned(&state, &user, &id).await?;
    if item.archived {
        return Err(ApiError::Validation(
            "Archived items cannot be worn".to_string(),
        ));
    }

    let revived = detect_revival(&item, worn_at, state.settings().revival_threshold_days);
    item.record_wear(worn_at);
    state.repo.save_item(&item).await?;

    let mut wear = WearEvent::new(user.id(), &item.id, worn_at);
    wear.revived = revived;
    state.repo.save_wear(&wear).await?;

    let outcome = state
        .engine
        .record(
            user.id(),
            Activity::WearLogged {
                item_id: item.id.clone(),
                worn_at,
                revived,
            },
            now,
        )
        .await?;
    notify(&state, user.id(), if revived { "item_revived" } else { "wear_logged" }, &outcome);

    tracing::info!(user_id = %user.id(), item_id = %item.id, revived, "Wear logged");

    Ok(Json(WearResponse {
        wear,
        item: ItemResponse::new(item, now),
        gamification: outcome,
    }))
}

/// POST /api/v1/items/import
///
/// Body is a CSV document. Valid rows are stored until the tier item limit
/// is reached; the rest are reported as skipped.
pub async fn import_items(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    body: String,
) -> ApiResult<Json<ImportResponse>> {
    let _guard = state.lock_user(user.id()).await;
    let limits = state.repo.subscription(user.id()).await?.limits();
    if !limits.export {
        return Err(ApiError::Forbidden(
            "CSV import requires a paid plan".to_string(),
        ));
    }

    let parsed = ItemCsvImporter::new(user.id())
        .import(body.as_bytes())
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let mut count = state.repo.count_items(user.id()).await?;
    let mut imported = 0;
    let mut skipped = 0;
    let mut outcome: Option<GamificationOutcome> = None;
    let now = Utc::now();

    for item in parsed.items {
        if !limits.allows_items(count) {
            skipped += 1;
            continue;
        }
        state.repo.save_item(&item).await?;
        count += 1;
        imported += 1;

        let earned = state
            .engine
            .record(user.id(), Activity::ItemAdded { item_id: item.id }, now)
            .await?;
        outcome = Some(match outcome {
            Some(so_far) => so_far.merge(earned),
            None => earned,
        });
    }

    if let Some(outcome) = &outcome {
        notify(&state, user.id(), "items_imported", outcome);
    }

    tracing::info!(
        user_id = %user.id(),
        imported,
        skipped,
        failed = parsed.rows_failed,
        "Item import finished"
    );

    Ok(Json(ImportResponse {
        imported,
        skipped,
        failed: parsed.rows_failed,
        errors: parsed.errors,
        gamification: outcome,
    }))
}
