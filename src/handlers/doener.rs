use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::dtos::doener::{
    CommentRequest, CreateDoenerRequest, RateRequest, UpdateDoenerRequest,
};
use crate::error::AppError;
use crate::models::doener::Shop;
use crate::state::AppState;

pub async fn list_doener(
    State(AppState { store, .. }): State<AppState>,
) -> Result<Json<Vec<Shop>>, AppError> {
    let shops = store.list().await?;
    Ok(Json(shops))
}

pub async fn create_doener(
    State(AppState { store, .. }): State<AppState>,
    Json(req): Json<CreateDoenerRequest>,
) -> Result<(StatusCode, Json<Shop>), AppError> {
    let new = req.into_new_shop()?;
    let shop = store.create(new).await?;
    tracing::info!(id = shop.id, name = %shop.name, "shop created");
    Ok((StatusCode::CREATED, Json(shop)))
}

pub async fn update_doener(
    State(AppState { store, .. }): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateDoenerRequest>,
) -> Result<Json<Shop>, AppError> {
    let patch = req.into_patch()?;
    let shop = store.update(id, patch).await?;
    Ok(Json(shop))
}

// Delete is idempotent at the HTTP layer: a miss is indistinguishable from
// success for the caller.
pub async fn delete_doener(
    State(AppState { store, .. }): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let removed = store.delete(id).await?;
    if !removed {
        tracing::debug!(id, "delete hit no record");
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn rate_doener(
    State(AppState { store, .. }): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<RateRequest>,
) -> Result<Json<Shop>, AppError> {
    let stars = req.stars()?;
    let shop = store.add_rating(id, stars).await?;
    Ok(Json(shop))
}

pub async fn add_comment(
    State(AppState { store, .. }): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<CommentRequest>,
) -> Result<Json<Shop>, AppError> {
    let comment = req.into_comment()?;
    let shop = store.add_comment(id, comment).await?;
    Ok(Json(shop))
}

pub async fn delete_comment(
    State(AppState { store, .. }): State<AppState>,
    Path((id, comment_id)): Path<(i64, Uuid)>,
) -> Result<Json<Shop>, AppError> {
    let shop = store.remove_comment(id, comment_id).await?;
    Ok(Json(shop))
}
