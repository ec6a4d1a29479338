//! Page CRUD, render and export handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use serde_json::Value;

use pixelmagix_entity::page::{Page, PageWithSections};
use pixelmagix_service::page::service::parse_input;
use pixelmagix_service::{ExportResult, ListPagesQuery};

use crate::dto::request::ExportQuery;
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiResult;
use crate::state::AppState;

/// GET /api/pages?skip=&limit=&published_only=
pub async fn list_pages(
    State(state): State<AppState>,
    Query(query): Query<ListPagesQuery>,
) -> ApiResult<Json<ApiResponse<Vec<Page>>>> {
    let pages = state.page_service.list(&query).await?;
    Ok(Json(ApiResponse::ok(pages)))
}

/// GET /api/pages/{id}
pub async fn get_page(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ApiResponse<PageWithSections>>> {
    let page = state.page_service.get(id).await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/pages/by-slug/{slug}
pub async fn get_page_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<ApiResponse<PageWithSections>>> {
    let page = state.page_service.get_by_slug(&slug).await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// POST /api/pages
pub async fn create_page(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> ApiResult<(StatusCode, Json<ApiResponse<PageWithSections>>)> {
    let input = parse_input(body)?;
    let page = state.page_service.create(input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(page))))
}

/// PUT /api/pages/{id}
pub async fn update_page(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> ApiResult<Json<ApiResponse<PageWithSections>>> {
    let input = parse_input(body)?;
    let page = state.page_service.update(id, input).await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// DELETE /api/pages/{id}
pub async fn delete_page(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    state.page_service.delete(id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Page deleted"))))
}

/// GET /api/pages/{id}/render
pub async fn render_page(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Html<String>> {
    let html = state.page_service.render(id).await?;
    Ok(Html(html))
}

/// POST /api/pages/{id}/export?archive=true
pub async fn export_page(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<ExportQuery>,
) -> ApiResult<Json<ApiResponse<ExportResult>>> {
    let result = state.export_service.export(id, query.archive).await?;
    Ok(Json(ApiResponse::ok(result)))
}
