//! Site settings route handlers.

use axum::{Json, extract::State};

use crate::db::settings;
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::{PublicSettings, Settings, SettingsPatch};
use crate::response::ApiResponse;
use crate::state::AppState;

/// Public configuration: the safe subset for unauthenticated clients.
pub async fn public_config(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<PublicSettings>>> {
    let settings = settings::get(state.pool()).await?;
    Ok(Json(ApiResponse::ok(PublicSettings::from(settings))))
}

/// Full settings read (admin).
pub async fn admin_get(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Settings>>> {
    let settings = settings::get(state.pool()).await?;
    Ok(Json(ApiResponse::ok(settings)))
}

/// Typed partial update (admin). Only fields present in the body change.
pub async fn admin_update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(patch): Json<SettingsPatch>,
) -> Result<Json<ApiResponse<Settings>>> {
    let updated = settings::update(state.pool(), patch).await?;
    tracing::info!(admin = %admin.id, "Settings updated");
    Ok(Json(ApiResponse::ok_with_message(
        updated,
        "Settings updated",
    )))
}
