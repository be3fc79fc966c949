//! Handlers for the `/annotations` resource and `/images/{id}/annotations`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use labelhub_core::entities::{Annotation, CreateAnnotation, UpdateAnnotation};
use labelhub_core::types::EntityId;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/images/{id}/annotations
pub async fn list_by_image(
    State(state): State<AppState>,
    user: AuthUser,
    Path(image_id): Path<EntityId>,
) -> AppResult<Json<DataResponse<Vec<Annotation>>>> {
    let annotations = state
        .gateway
        .list_annotations(Some(&user.identity), &image_id)
        .await?;
    Ok(Json(DataResponse { data: annotations }))
}

/// POST /api/v1/images/{id}/annotations
///
/// The author is always the caller.
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Path(image_id): Path<EntityId>,
    Json(input): Json<CreateAnnotation>,
) -> AppResult<(StatusCode, Json<DataResponse<Annotation>>)> {
    let annotation = state
        .gateway
        .create_annotation(Some(&user.identity), &image_id, &input)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: annotation })))
}

/// GET /api/v1/annotations/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<EntityId>,
) -> AppResult<Json<DataResponse<Annotation>>> {
    let annotation = state
        .gateway
        .get_annotation(Some(&user.identity), &id)
        .await?;
    Ok(Json(DataResponse { data: annotation }))
}

/// PUT /api/v1/annotations/{id}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<EntityId>,
    Json(input): Json<UpdateAnnotation>,
) -> AppResult<Json<DataResponse<Annotation>>> {
    let annotation = state
        .gateway
        .update_annotation(Some(&user.identity), &id, &input)
        .await?;
    Ok(Json(DataResponse { data: annotation }))
}

/// DELETE /api/v1/annotations/{id}
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<EntityId>,
) -> AppResult<StatusCode> {
    state
        .gateway
        .delete_annotation(Some(&user.identity), &id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
