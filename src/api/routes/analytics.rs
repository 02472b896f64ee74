//! Analytics Routes
//!
//! - GET /api/v1/analytics - Wardrobe dashboard
//! - GET /api/v1/analytics/cpw - Cost-per-wear table

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::analytics::{average_cpw, build_dashboard, cpw_table, CpwRow, Dashboard};
use crate::api::auth::CurrentUser;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::gamification::MAX_WINDOW_DAYS;

/// Dashboard query parameters
#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsParams {
    /// Utilization window, defaults to the configured score window
    #[serde(default)]
    pub window_days: Option<i64>,
}

/// CPW table response
#[derive(Debug, Serialize)]
pub struct CpwResponse {
    pub rows: Vec<CpwRow>,
    pub average_cpw: Option<f64>,
}

/// GET /api/v1/analytics
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Query(params): Query<AnalyticsParams>,
) -> ApiResult<Json<Dashboard>> {
    let settings = state.settings();
    let window_days = params.window_days.unwrap_or(settings.score_window_days);
    if !(1..=MAX_WINDOW_DAYS).contains(&window_days) {
        return Err(ApiError::Validation(format!(
            "window_days must be between 1 and {}, got {}",
            MAX_WINDOW_DAYS, window_days
        )));
    }

    let items = state.repo.items(user.id()).await?;
    let wears = state.repo.wears(user.id()).await?;

    let dashboard = build_dashboard(
        &items,
        &wears,
        window_days,
        settings.neglected_days,
        Utc::now(),
    );

    tracing::debug!(
        user_id = %user.id(),
        items = dashboard.total_items,
        utilization = dashboard.utilization_pct,
        "Dashboard built"
    );

    Ok(Json(dashboard))
}

/// GET /api/v1/analytics/cpw
pub async fn cpw(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> ApiResult<Json<CpwResponse>> {
    let items = state.repo.items(user.id()).await?;
    let rows = cpw_table(&items);

    Ok(Json(CpwResponse {
        average_cpw: average_cpw(&rows),
        rows,
    }))
}
