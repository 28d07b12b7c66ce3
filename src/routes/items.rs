//! Item endpoints: append, voting, stats, positioning, ranking and activity.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::domain::{Item, VoteType};
use crate::error::AppError;
use crate::repository::{ItemPositioningOperations, VoteRankingOperations};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct AddItemRequest {
    pub content: Map<String, Value>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    #[serde(default)]
    pub vote_type: Option<VoteType>,
    pub voter_id: Option<String>,
}

#[derive(Deserialize)]
pub struct SetPositionRequest {
    pub position: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    pub items_order: Vec<String>,
}

#[derive(Deserialize)]
pub struct TopVotedParams {
    pub limit: Option<i64>,
}

#[derive(Deserialize)]
pub struct ActivityParams {
    pub hours: Option<i64>,
}

/// POST /api/lists/{id}/items
pub async fn add_item(
    Path(list_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AddItemRequest>,
) -> Result<impl IntoResponse, AppError> {
    let list = state
        .list_repo
        .find_by_id(&list_id)
        .await?
        .ok_or_else(|| AppError::NotFound("List not found".to_string()))?;

    let missing = list.missing_required_fields(&payload.content);
    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    let item = Item::new(list_id, payload.content);
    let created = state.item_repo.create(&item).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": created })),
    ))
}

/// POST /api/items/{id}/vote
///
/// The body is optional; a missing voter id falls back to a generated
/// pseudonymous identifier, a missing vote type defaults to a like.
pub async fn cast_vote(
    Path(item_id): Path<String>,
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let payload = parse_vote_body(&body)?;

    let voter_id = voter_or_fallback(payload.voter_id);
    let vote_type = payload.vote_type.unwrap_or_default();

    let vote = state.vote_repo.cast(&item_id, &voter_id, vote_type).await?;
    let stats = state.vote_repo.stats_for(&item_id).await?;

    Ok(Json(json!({
        "success": true,
        "data": { "vote": vote, "stats": stats },
    })))
}

/// DELETE /api/items/{id}/vote
pub async fn retract_vote(
    Path(item_id): Path<String>,
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let payload = parse_vote_body(&body)?;
    let voter_id = voter_or_fallback(payload.voter_id);

    let removed = state.vote_repo.retract(&item_id, &voter_id).await?;
    if !removed {
        return Err(AppError::NotFound("Vote not found".to_string()));
    }

    let stats = state.vote_repo.stats_for(&item_id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Vote removed successfully",
        "data": { "stats": stats },
    })))
}

/// POST /api/items/{id}/like
///
/// Legacy shortcut. Funnels through the ledger with a one-off anonymous
/// voter, so the like counter stays consistent with the vote stats.
pub async fn like_item(
    Path(item_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let voter_id = anonymous_voter_id();
    state
        .vote_repo
        .cast(&item_id, &voter_id, VoteType::Like)
        .await?;

    let item = state
        .item_repo
        .find_by_id(&item_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Item not found".to_string()))?;
    let stats = state.vote_repo.stats_for(&item_id).await?;

    Ok(Json(json!({
        "success": true,
        "likes": item.likes_count,
        "data": { "item": item, "stats": stats },
    })))
}

/// GET /api/items/{id}/stats
pub async fn item_stats(
    Path(item_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let stats = state.vote_repo.stats_for(&item_id).await?;
    let recent_votes = state.vote_repo.find_by_item(&item_id, 10).await?;

    Ok(Json(json!({
        "success": true,
        "data": { "stats": stats, "recent_votes": recent_votes },
    })))
}

/// PATCH /api/items/{id}/position
pub async fn set_position(
    Path(item_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SetPositionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.position < 1 {
        return Err(AppError::Validation(
            "Position must be a positive number".to_string(),
        ));
    }

    let item = state
        .item_repo
        .set_position(&item_id, payload.position)
        .await?;

    Ok(Json(json!({ "success": true, "data": item })))
}

/// PUT /api/lists/{id}/items/reorder
pub async fn reorder_items(
    Path(list_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ReorderRequest>,
) -> Result<impl IntoResponse, AppError> {
    state
        .list_repo
        .find_by_id(&list_id)
        .await?
        .ok_or_else(|| AppError::NotFound("List not found".to_string()))?;

    state
        .item_repo
        .reorder(&list_id, &payload.items_order)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Items reordered successfully",
    })))
}

/// GET /api/lists/{id}/top-voted
pub async fn top_voted(
    Path(list_id): Path<String>,
    Query(params): Query<TopVotedParams>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let limit = params.limit.unwrap_or(10);
    if limit < 1 {
        return Err(AppError::Validation(
            "Limit must be a positive number".to_string(),
        ));
    }

    let ranked = state.vote_repo.top_voted(&list_id, limit).await?;

    Ok(Json(json!({ "success": true, "data": ranked })))
}

/// GET /api/lists/{id}/voting-activity
pub async fn voting_activity(
    Path(list_id): Path<String>,
    Query(params): Query<ActivityParams>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let hours = params.hours.unwrap_or(24);
    if hours < 1 {
        return Err(AppError::Validation(
            "Hours must be a positive number".to_string(),
        ));
    }

    let activity = state.vote_repo.voting_activity(&list_id, hours).await?;

    Ok(Json(json!({ "success": true, "data": activity })))
}

/// DELETE /api/items/{id}
pub async fn delete_item(
    Path(item_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let removed = state.item_repo.delete(&item_id).await?;
    if !removed {
        return Err(AppError::NotFound("Item not found".to_string()));
    }

    Ok(Json(json!({ "success": true })))
}

/// Vote bodies may be absent entirely; malformed JSON is still rejected.
fn parse_vote_body(body: &Bytes) -> Result<VoteRequest, AppError> {
    if body.is_empty() {
        return Ok(VoteRequest::default());
    }

    serde_json::from_slice(body).map_err(|_| AppError::Validation("Malformed payload".to_string()))
}

fn voter_or_fallback(voter_id: Option<String>) -> String {
    voter_id
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(anonymous_voter_id)
}

fn anonymous_voter_id() -> String {
    format!("anon-{}", Uuid::new_v4())
}
