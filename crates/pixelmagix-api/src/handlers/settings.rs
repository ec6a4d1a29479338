//! Settings handlers.

use axum::Json;
use axum::extract::{Path, State};

use crate::dto::request::UpdateSettingRequest;
use crate::dto::response::{ApiResponse, SettingResponse};
use crate::error::ApiResult;
use crate::state::AppState;

/// GET /api/settings
pub async fn list_settings(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<SettingResponse>>>> {
    let settings = state.setting_service.list().await?;
    Ok(Json(ApiResponse::ok(
        settings.into_iter().map(SettingResponse::from).collect(),
    )))
}

/// GET /api/settings/{key}
pub async fn get_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Json<ApiResponse<SettingResponse>>> {
    let setting = state.setting_service.get(&key).await?;
    Ok(Json(ApiResponse::ok(setting.into())))
}

/// PUT /api/settings/{key}
pub async fn update_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<UpdateSettingRequest>,
) -> ApiResult<Json<ApiResponse<SettingResponse>>> {
    let setting = state
        .setting_service
        .set(&key, &req.value, req.description.as_deref())
        .await?;
    Ok(Json(ApiResponse::ok(setting.into())))
}
