//! Asset upload, listing, download and delete handlers.

use axum::Json;
use axum::body::Body;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use tokio_util::io::ReaderStream;

use pixelmagix_core::error::AppError;
use pixelmagix_entity::asset::Asset;
use pixelmagix_service::UploadAsset;

use crate::dto::request::AssetListQuery;
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiResult;
use crate::state::AppState;

/// Name of the multipart field carrying the file.
const FILE_FIELD: &str = "file";

/// GET /api/assets?file_type=image
pub async fn list_assets(
    State(state): State<AppState>,
    Query(query): Query<AssetListQuery>,
) -> ApiResult<Json<ApiResponse<Vec<Asset>>>> {
    let assets = state.asset_service.list(query.file_type).await?;
    Ok(Json(ApiResponse::ok(assets)))
}

/// GET /api/assets/{id}
pub async fn get_asset(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ApiResponse<Asset>>> {
    let asset = state.asset_service.get(id).await?;
    Ok(Json(ApiResponse::ok(asset)))
}

/// POST /api/assets (multipart)
pub async fn upload_asset(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<ApiResponse<Asset>>)> {
    let mut upload: Option<UploadAsset> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::validation(format!("Failed to read file: {e}")))?;
        upload = Some(UploadAsset {
            file_name,
            content_type,
            data,
        });
    }

    let upload =
        upload.ok_or_else(|| AppError::validation(format!("Missing '{FILE_FIELD}' field")))?;
    let asset = state.asset_service.upload(upload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(asset))))
}

/// GET /api/assets/{id}/file
pub async fn download_asset(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Response> {
    let (asset, file) = state.asset_service.open(id).await?;
    let body = Body::from_stream(ReaderStream::new(file));

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, asset.mime_type.as_str())
        .header(
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{}\"", asset.name.replace('"', "")),
        )
        .header(header::CONTENT_LENGTH, asset.size)
        .body(body)
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))?;

    Ok(response)
}

/// DELETE /api/assets/{id}
pub async fn delete_asset(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    state.asset_service.delete(id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Asset deleted"))))
}
