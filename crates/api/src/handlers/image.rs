//! Handlers for the `/images` resource and `/datasets/{id}/images`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use labelhub_core::entities::{CreateImage, Image, UpdateImage};
use labelhub_core::types::EntityId;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/datasets/{id}/images
pub async fn list_by_dataset(
    State(state): State<AppState>,
    user: AuthUser,
    Path(dataset_id): Path<EntityId>,
) -> AppResult<Json<DataResponse<Vec<Image>>>> {
    let images = state
        .gateway
        .list_images(Some(&user.identity), &dataset_id)
        .await?;
    Ok(Json(DataResponse { data: images }))
}

/// POST /api/v1/datasets/{id}/images
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Path(dataset_id): Path<EntityId>,
    Json(input): Json<CreateImage>,
) -> AppResult<(StatusCode, Json<DataResponse<Image>>)> {
    let image = state
        .gateway
        .create_image(Some(&user.identity), &dataset_id, &input)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: image })))
}

/// GET /api/v1/images/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<EntityId>,
) -> AppResult<Json<DataResponse<Image>>> {
    let image = state.gateway.get_image(Some(&user.identity), &id).await?;
    Ok(Json(DataResponse { data: image }))
}

/// PUT /api/v1/images/{id}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<EntityId>,
    Json(input): Json<UpdateImage>,
) -> AppResult<Json<DataResponse<Image>>> {
    let image = state
        .gateway
        .update_image(Some(&user.identity), &id, &input)
        .await?;
    Ok(Json(DataResponse { data: image }))
}

/// DELETE /api/v1/images/{id}
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<EntityId>,
) -> AppResult<StatusCode> {
    state.gateway.delete_image(Some(&user.identity), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
