//! Plugin lifecycle and introspection handlers.

use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use bytes::Bytes;
use serde_json::{Map, Value};

use pixelmagix_core::error::AppError;
use pixelmagix_entity::plugin::{Plugin, PluginWithHooks};
use pixelmagix_plugin::PluginDescriptor;
use pixelmagix_plugin::hooks::HookBinding;

use crate::dto::request::UpdatePluginConfigRequest;
use crate::dto::response::{ApiResponse, MessageResponse, PluginResponse};
use crate::error::ApiResult;
use crate::state::AppState;

/// Name of the multipart field carrying the package.
const PACKAGE_FIELD: &str = "file";

async fn with_load_state(state: &AppState, plugin: PluginWithHooks) -> PluginResponse {
    let is_loaded = state.plugins.is_loaded(&plugin.plugin.slug).await;
    PluginResponse { plugin, is_loaded }
}

/// GET /api/plugins
pub async fn list_plugins(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<PluginResponse>>>> {
    let plugins = state.plugins.list().await?;
    let mut out = Vec::with_capacity(plugins.len());
    for plugin in plugins {
        out.push(with_load_state(&state, plugin).await);
    }
    Ok(Json(ApiResponse::ok(out)))
}

/// GET /api/plugins/{slug}
pub async fn get_plugin(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<ApiResponse<PluginResponse>>> {
    let plugin = state.plugins.get(&slug).await?;
    Ok(Json(ApiResponse::ok(with_load_state(&state, plugin).await)))
}

/// POST /api/plugins
///
/// Installs from a descriptor body. The plugin is loaded on activation.
pub async fn install_plugin(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<ApiResponse<PluginResponse>>)> {
    let descriptor = PluginDescriptor::from_json(&body)?;
    let created = state.plugins.install(descriptor).await?;
    let response = with_load_state(&state, created).await;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(response))))
}

/// POST /api/plugins/upload (multipart zip package)
pub async fn upload_plugin(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<ApiResponse<PluginResponse>>)> {
    let mut package: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?
    {
        if field.name() == Some(PACKAGE_FIELD) {
            package = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| AppError::validation(format!("Failed to read package: {e}")))?,
            );
        }
    }

    let package = package
        .ok_or_else(|| AppError::validation(format!("Missing '{PACKAGE_FIELD}' field")))?;
    let created = state.plugins.install_archive(package.to_vec()).await?;
    let response = with_load_state(&state, created).await;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(response))))
}

/// DELETE /api/plugins/{slug}
pub async fn uninstall_plugin(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    state.plugins.uninstall(&slug).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(format!(
        "Plugin '{slug}' uninstalled"
    )))))
}

/// POST /api/plugins/{slug}/activate
pub async fn activate_plugin(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<ApiResponse<Plugin>>> {
    let plugin = state.plugins.activate(&slug).await?;
    Ok(Json(ApiResponse::ok(plugin)))
}

/// POST /api/plugins/{slug}/deactivate
pub async fn deactivate_plugin(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<ApiResponse<Plugin>>> {
    let plugin = state.plugins.deactivate(&slug).await?;
    Ok(Json(ApiResponse::ok(plugin)))
}

/// PUT /api/plugins/{slug}/config
pub async fn update_plugin_config(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(req): Json<UpdatePluginConfigRequest>,
) -> ApiResult<Json<ApiResponse<Plugin>>> {
    let plugin = state.plugins.update_config(&slug, req.config).await?;
    Ok(Json(ApiResponse::ok(plugin)))
}

/// GET /api/plugins/hooks/{event}
pub async fn hooks_for_event(
    State(state): State<AppState>,
    Path(event): Path<String>,
) -> Json<ApiResponse<Vec<HookBinding>>> {
    Json(ApiResponse::ok(state.plugins.hooks_for(&event).await))
}

/// GET /api/plugins/editor-blocks
pub async fn editor_blocks(State(state): State<AppState>) -> Json<ApiResponse<Vec<Value>>> {
    Json(ApiResponse::ok(state.plugins.editor_blocks().await))
}

/// GET /api/plugins/frontend-components
pub async fn frontend_components(
    State(state): State<AppState>,
) -> Json<ApiResponse<Map<String, Value>>> {
    Json(ApiResponse::ok(state.plugins.frontend_components().await))
}
