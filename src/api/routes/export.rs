//! Export Routes
//!
//! Data export for backup and analysis (paid tiers).
//!
//! - GET /api/v1/export?format=json - Items, wears, outfits and gamification
//! - GET /api/v1/export?format=csv - Items only, spreadsheet friendly

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use std::sync::Arc;

use crate::api::auth::CurrentUser;
use crate::api::dto::{ExportDocument, ExportFormat, ExportParams};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::wardrobe::items_to_csv;

/// GET /api/v1/export
pub async fn export_data(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Query(params): Query<ExportParams>,
) -> ApiResult<Response> {
    let limits = state.repo.subscription(user.id()).await?.limits();
    if !limits.export {
        return Err(ApiError::Forbidden(
            "Data export requires a paid plan".to_string(),
        ));
    }

    let now = Utc::now();
    let items = state.repo.items(user.id()).await?;

    let (content_type, extension, body) = match params.format {
        ExportFormat::Csv => {
            let csv = items_to_csv(&items).map_err(|e| ApiError::Internal(e.to_string()))?;
            ("text/csv", "csv", csv)
        }
        ExportFormat::Json => {
            let document = ExportDocument {
                user_id: user.id().to_string(),
                exported_at: now,
                items,
                wears: state.repo.wears(user.id()).await?,
                outfits: state.repo.outfits(user.id()).await?,
                gamification: state.engine.state(user.id()).await?,
            };
            let json = serde_json::to_string_pretty(&document)
                .map_err(|e| ApiError::Internal(format!("Failed to serialize export: {}", e)))?;
            ("application/json", "json", json)
        }
    };

    let filename = format!("wardrobe_export_{}.{}", now.format("%Y%m%d_%H%M%S"), extension);
    tracing::info!(user_id = %user.id(), format = extension, "Export generated");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        Body::from(body),
    )
        .into_response())
}
