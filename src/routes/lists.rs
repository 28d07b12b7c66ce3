//! List endpoints: create a list with its template, read it back with items.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::domain::{FieldSpec, List};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateListRequest {
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub template_fields: Vec<FieldSpec>,
}

/// POST /api/lists
pub async fn create_list(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateListRequest>,
) -> Result<impl IntoResponse, AppError> {
    let title = payload.title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }

    List::validate_fields(&payload.template_fields)?;

    let description = payload
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());

    let list = List::new(title.to_string(), description, payload.template_fields);
    let created = state.list_repo.create(&list).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": created })),
    ))
}

/// GET /api/lists
pub async fn get_lists(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let lists = state.list_repo.list_all().await?;

    Ok(Json(json!({ "success": true, "data": lists })))
}

/// GET /api/lists/{id}
pub async fn get_list(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let list = state
        .list_repo
        .find_with_items(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("List not found".to_string()))?;

    Ok(Json(json!({ "success": true, "data": list })))
}
